//! The resumable batch transfer engine. One [`DeployTask`] instance covers
//! one set of invocations against a single cached remote session; the durable
//! state (epoch, per-file transfer times) lives in the catalog, so a crashed
//! or interrupted process resumes cleanly on the next invocation.

use std::time::Duration;

use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::DeploySettings;
use crate::epoch;
use crate::notify::DeployObserver;
use crate::session::{SessionManager, Transport};
use crate::util::formatted_datetime;

/// Pause applied after every upload attempt (including failed ones) when
/// throttling is enabled, bounding the request rate against the remote
/// server.
const THROTTLE_PAUSE: Duration = Duration::from_secs(1);

pub struct DeployTask {
    settings: DeploySettings,
    catalog: Catalog,
    session: SessionManager,
    observer: Box<dyn DeployObserver>,
}

impl DeployTask {
    pub fn new(
        settings: DeploySettings,
        catalog: Catalog,
        transport: Box<dyn Transport>,
        observer: Box<dyn DeployObserver>,
    ) -> Self {
        Self { settings, catalog, session: SessionManager::new(transport), observer }
    }

    /// One invocation of the transfer task. Returns `true` when the caller
    /// should stop invoking: either every eligible file has been transferred
    /// since the epoch began (epoch cleared, finished event fired), or the
    /// session could not be established (terminal, epoch left in place).
    /// `false` means progress remains and the caller should invoke again.
    pub fn step(&mut self) -> Result<bool> {
        let epoch = epoch::get_or_create_epoch(&self.catalog)?;

        if self.session.acquire().is_none() {
            self.observer.status("Could not authenticate with SFTP. Stopping SFTP upload.");
            return Ok(true);
        }

        let (processed, total) = self.transfer_batch(&epoch)?;

        if processed >= total {
            self.observer
                .status(&format!("Uploaded {} of {} pages/files", processed, total));
            epoch::clear_epoch(&self.catalog)?;
            self.observer.finished(&self.settings.site_root);
            return Ok(true);
        }
        Ok(false)
    }

    /// Transfer up to one batch of pending files, oldest path first. The
    /// returned `(processed, total)` pair is computed *before* the batch
    /// runs, so it reflects the progress of prior invocations only; this
    /// batch's work becomes visible in the next invocation's counts.
    fn transfer_batch(&mut self, epoch: &str) -> Result<(u64, u64)> {
        let batch = self.catalog.select_pending(epoch, self.settings.batch_size)?;
        let pending = self.catalog.count_pending(epoch)?;
        let total = self.catalog.count_total()?;
        let processed = total.saturating_sub(pending);
        tracing::debug!("total files: {}; files pending: {}", total, pending);

        if processed != 0 {
            // skipped on the very first batch so users never see "0 of N"
            self.observer
                .status(&format!("Uploading {} of {} pages/files", processed, total));
        }

        let Some(uploader) = self.session.acquire() else {
            return Ok((processed, total));
        };

        for record in batch {
            let local_path = self.settings.site_root.join(&record.file_path);

            // A directory or a vanished local file is recorded as transferred
            // anyway: an artifact the generator never produced must not wedge
            // the run.
            if local_path.is_file() {
                let remote_path = format!("{}{}", self.settings.folder, record.file_path);
                let uploaded = uploader.put(&remote_path, &local_path);

                if self.settings.throttle {
                    std::thread::sleep(THROTTLE_PAUSE);
                }

                if !uploaded {
                    // timestamp untouched: the record stays eligible and is
                    // retried on a later invocation
                    tracing::debug!("upload failed, deferred: {}", record.file_path);
                    continue;
                }
            } else {
                tracing::debug!("no local file, recording as transferred: {}", record.file_path);
            }

            self.observer.file_transferred(&record.file_path);
            self.catalog.mark_transferred(&record.file_path, &formatted_datetime())?;
        }

        Ok((processed, total))
    }
}
