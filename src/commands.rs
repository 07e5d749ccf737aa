use anyhow::{Context, Result};
use cli_table::{Cell, Style, Table, format::Justify, print_stdout};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use walkdir::WalkDir;

use crate::catalog::Catalog;
use crate::config::{Config, DeploySettings};
use crate::deploy::DeployTask;
use crate::epoch;
use crate::notify::{ConsoleObserver, ProgressObserver};
use crate::session::SftpTransport;
use crate::util::normalize_rel_path;

/// Walk the site root and record every regular file's relative path in the
/// catalog. Existing records keep their transfer state; nothing is pruned,
/// since a record whose file vanished is absorbed by the engine as a vacuous
/// transfer.
pub fn handle_scan(config: &Config) -> Result<()> {
    if config.site_root.as_os_str().is_empty() {
        eprintln!("site root is not configured; run `spush set --site-root <dir>`");
        return Ok(());
    }
    if !config.site_root.is_dir() {
        eprintln!("site root is not a directory: {}", config.site_root.display());
        return Ok(());
    }

    let catalog = Catalog::open(&config.catalog_db_path)?;
    let mut seen = 0u64;
    let mut added = 0u64;
    for entry in WalkDir::new(&config.site_root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(&config.site_root)
            .with_context(|| format!("cannot relativize {}", entry.path().display()))?;
        let rel = normalize_rel_path(&rel.to_string_lossy());
        if rel.is_empty() {
            continue;
        }
        seen += 1;
        if catalog.upsert_path(&rel)? {
            added += 1;
        }
    }
    println!(
        "Recorded {} files ({} new) from {}",
        seen,
        added.green(),
        config.site_root.display()
    );
    Ok(())
}

/// One core invocation, for external schedulers (cron and friends). Prints
/// whether the run is over so the scheduler side can stop re-invoking.
pub fn handle_step(config: &Config) -> Result<()> {
    let mut task = build_task(config)?;
    let done = task.step()?;
    if done {
        println!("Run complete; nothing left to upload.");
    } else {
        println!("Batch done, more files pending; invoke `spush step` again.");
    }
    Ok(())
}

/// Drive the task in-process until it reports done, with a progress bar fed
/// by transferred-file events.
pub fn handle_push(config: &Config) -> Result<()> {
    let settings = DeploySettings::from_config(config)?;

    let catalog = Catalog::open(&config.catalog_db_path)?;
    let total = catalog.count_total()?;
    if total == 0 {
        eprintln!("Catalog is empty; run `spush scan` first.");
        return Ok(());
    }
    let run_epoch = epoch::get_or_create_epoch(&catalog)?;
    let already_done = total.saturating_sub(catalog.count_pending(&run_epoch)?);

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    )
    .context("invalid progress bar template")?
    .progress_chars("=> ");
    let pb = ProgressBar::new(total);
    pb.set_style(style);
    pb.set_position(already_done);

    let transport = SftpTransport::new(settings.clone());
    let mut task = DeployTask::new(
        settings,
        catalog,
        Box::new(transport),
        Box::new(ProgressObserver::new(pb.clone())),
    );
    loop {
        if task.step()? {
            break;
        }
    }
    pb.finish_and_clear();
    Ok(())
}

pub fn handle_status(config: &Config) -> Result<()> {
    let catalog = Catalog::open(&config.catalog_db_path)?;
    let total = catalog.count_total()?;
    let never = catalog.count_never_transferred()?;
    let run_epoch = epoch::current_epoch(&catalog)?;

    let (run_display, pending_display) = match &run_epoch {
        Some(e) => (e.clone(), catalog.count_pending(e)?.to_string()),
        None => ("-".to_string(), "-".to_string()),
    };

    let table = vec![vec![
        total.cell().justify(Justify::Right),
        never.cell().justify(Justify::Right),
        pending_display.cell().justify(Justify::Right),
        run_display.cell(),
    ]]
    .table()
    .title(vec![
        "Total files".cell().bold(true),
        "Never transferred".cell().bold(true),
        "Pending this run".cell().bold(true),
        "Run epoch".cell().bold(true),
    ]);
    print_stdout(table).context("cannot print status table")?;

    match run_epoch {
        Some(_) => println!("{}", "A run is in progress; `spush push` resumes it.".yellow()),
        None => println!("{}", "No run in progress.".green()),
    }
    Ok(())
}

pub fn handle_reset(config: &Config, transfers: bool) -> Result<()> {
    let catalog = Catalog::open(&config.catalog_db_path)?;
    match epoch::current_epoch(&catalog)? {
        Some(e) => {
            epoch::clear_epoch(&catalog)?;
            println!("✅ Cleared run epoch {}", e);
        }
        None => println!("No run in progress."),
    }
    if transfers {
        catalog.clear_transfer_state()?;
        println!("✅ Cleared per-file transfer state; the next run re-uploads everything.");
    }
    Ok(())
}

/// Arguments for `handle_set` grouped to avoid too-many-arguments lint.
pub struct SetArgs {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub port: Option<u16>,
    pub folder: Option<String>,
    pub site_root: Option<std::path::PathBuf>,
    pub batch_size: Option<usize>,
    pub throttle: Option<bool>,
}

pub fn handle_set(config: &Config, args: SetArgs) -> Result<()> {
    let mut cfg = config.clone();
    if let Some(h) = args.host {
        cfg.sftp_host = h;
    }
    if let Some(u) = args.user {
        cfg.sftp_user = u;
    }
    if let Some(p) = args.password {
        cfg.sftp_pass = p;
    }
    if let Some(p) = args.port {
        cfg.sftp_port = p;
    }
    if let Some(f) = args.folder {
        cfg.sftp_folder = f;
    }
    if let Some(s) = args.site_root {
        cfg.site_root = s;
    }
    if let Some(b) = args.batch_size {
        cfg.batch_size = b;
    }
    if let Some(t) = args.throttle {
        cfg.throttle = Some(t);
    }
    cfg.save()?;
    println!("✅ Configuration updated");
    Ok(())
}

fn build_task(config: &Config) -> Result<DeployTask> {
    let settings = DeploySettings::from_config(config)?;
    let catalog = Catalog::open(&config.catalog_db_path)?;
    let transport = SftpTransport::new(settings.clone());
    Ok(DeployTask::new(settings, catalog, Box::new(transport), Box::new(ConsoleObserver)))
}
