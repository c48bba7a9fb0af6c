use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod commands;
mod http;

use commands::{cli, exec, http_server};
use vox_core::api::{AppConfig, CliError, LoggingConfig};
use vox_core::config::{expand_path, load_default, load_from};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = cli::Args::parse();

    let mut cfg = match &args.config {
        Some(path) => load_from(path)?,
        None => load_default()?,
    };
    if let Some(workdir) = &args.workdir {
        cfg.workdir = workdir.clone();
    }

    let guard = init_tracing(&cfg.logging);

    let code = dispatch(args.command.unwrap_or(cli::Commands::Repl), &cfg).await?;
    // Flush the file appender before exiting.
    drop(guard);
    std::process::exit(code);
}

async fn dispatch(cmd: cli::Commands, cfg: &AppConfig) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::Exec(a) => exec::handle_exec(a, cfg).await,
        cli::Commands::Check(a) => exec::handle_check(a, cfg),
        cli::Commands::Parse(a) => exec::handle_parse(a),
        cli::Commands::Serve(a) => http_server::handle_http_server(a, cfg).await,
        cli::Commands::Repl => exec::handle_repl(cfg).await,
    }
}

/// stderr logging filtered by `RUST_LOG` (falling back to the configured level),
/// plus a daily-rolling file when `logging.dir` is set.
fn init_tracing(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    match &cfg.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(expand_path(dir), "vox.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
