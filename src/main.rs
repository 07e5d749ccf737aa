use clap::Parser;

use sitepush::cli::{Cli, Commands};
use sitepush::commands;
use sitepush::config::{self, Config};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = sitepush::util::try_enable_ansi_on_windows();

    // keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = if cli.verbose {
        Some(sitepush::util::init_verbose_logging(&config::log_dir()?)?)
    } else {
        None
    };

    let config = Config::init()?;

    match cli.command {
        Commands::Scan {} => commands::handle_scan(&config),
        Commands::Push {} => commands::handle_push(&config),
        Commands::Step {} => commands::handle_step(&config),
        Commands::Status {} => commands::handle_status(&config),
        Commands::Reset { transfers } => commands::handle_reset(&config, transfers),
        Commands::Set { host, user, password, port, folder, site_root, batch_size, throttle } => {
            let args = commands::SetArgs {
                host,
                user,
                password,
                port,
                folder,
                site_root,
                batch_size,
                throttle,
            };
            commands::handle_set(&config, args)
        }
    }
}
