use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(
        short,
        long,
        global = true,
        help = "Write verbose diagnostic logs to the app log directory"
    )]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[clap(about = "Scan the site root and record generated files", display_order = 1)]
    Scan {},
    #[clap(about = "Upload pending files until the run completes", display_order = 2)]
    Push {},
    #[clap(
        about = "Run exactly one upload batch (for external schedulers)",
        display_order = 3
    )]
    Step {},
    #[clap(about = "Show catalog totals and run progress", name = "st", display_order = 4)]
    Status {},
    #[clap(
        about = "Abandon the current run; optionally forget past transfers",
        display_order = 5
    )]
    Reset {
        #[clap(long, help = "Also clear every file's last-transferred time")]
        transfers: bool,
    },
    #[clap(about = "Configure sitepush", display_order = 6)]
    Set {
        #[clap(long, help = "SFTP host, optionally prefixed with sftp://", display_order = 1)]
        host: Option<String>,
        #[clap(long, help = "SFTP user", display_order = 2)]
        user: Option<String>,
        #[clap(long, help = "SFTP password", display_order = 3)]
        password: Option<String>,
        #[clap(long, help = "SFTP port (0 = default 22)", display_order = 4)]
        port: Option<u16>,
        #[clap(long, help = "Remote folder to upload into", display_order = 5)]
        folder: Option<String>,
        #[clap(long, help = "Local directory holding the generated site", display_order = 6)]
        site_root: Option<PathBuf>,
        #[clap(long, help = "Files uploaded per batch (0 = default 250)", display_order = 7)]
        batch_size: Option<usize>,
        #[clap(
            long,
            help = "Pause between uploads to spare the remote server (true/false)",
            display_order = 8
        )]
        throttle: Option<bool>,
    },
}
