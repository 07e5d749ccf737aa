use std::path::Path;

use indicatif::ProgressBar;
use owo_colors::OwoColorize;

/// Sinks for the engine's externally visible events. One status line per
/// invocation at most, one `file_transferred` per successful (or vacuously
/// skipped) file, and `finished` exactly once per completed run.
pub trait DeployObserver {
    fn status(&self, message: &str);
    fn file_transferred(&self, file_path: &str);
    fn finished(&self, site_root: &Path);
}

/// Plain stdout observer for single-step invocations.
pub struct ConsoleObserver;

impl DeployObserver for ConsoleObserver {
    fn status(&self, message: &str) {
        tracing::info!("{}", message);
        println!("{}", message);
    }

    fn file_transferred(&self, file_path: &str) {
        tracing::debug!("transferred {}", file_path);
    }

    fn finished(&self, site_root: &Path) {
        tracing::info!("transfer finished for {}", site_root.display());
        println!("{} Transfer finished: {}", "✅".green(), site_root.display());
    }
}

/// Observer feeding an indicatif bar for the in-process `push` driver. The
/// bar's length and starting position are set by the caller; each transferred
/// file advances it by one.
pub struct ProgressObserver {
    pb: ProgressBar,
}

impl ProgressObserver {
    pub fn new(pb: ProgressBar) -> Self {
        Self { pb }
    }
}

impl DeployObserver for ProgressObserver {
    fn status(&self, message: &str) {
        tracing::info!("{}", message);
        self.pb.println(message.to_string());
    }

    fn file_transferred(&self, file_path: &str) {
        tracing::debug!("transferred {}", file_path);
        self.pb.inc(1);
    }

    fn finished(&self, site_root: &Path) {
        tracing::info!("transfer finished for {}", site_root.display());
        self.pb.println(format!("{} Transfer finished: {}", "✅".green(), site_root.display()));
    }
}
