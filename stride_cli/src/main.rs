mod cli;
mod error_fmt;
mod motion;
mod sim;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use stride_core::error::{Report, StrideError};

use crate::cli::{COMMAND, Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = COMMAND.set(cli.cmd.name());
    if let Err(e) = color_eyre::install() {
        eprintln!("warning: failed to install color-eyre: {e}");
    }

    let code = match real_main(&cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                println!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    flush_file_log();
    std::process::exit(code);
}

/// `process::exit` skips destructors, so drop the file writer guard by hand.
fn flush_file_log() {
    if let Ok(mut guard) = FILE_GUARD.lock() {
        drop(guard.take());
    }
}

fn real_main(cli: &Cli) -> eyre::Result<()> {
    // Curves need no config or backend.
    if let Commands::Curve { name, samples } = &cli.cmd {
        init_tracing(cli, None);
        return motion::print_curve(name, *samples, cli.json);
    }

    let cfg = load_config(&cli.config)?;
    init_tracing(cli, Some(&cfg.logging));
    tracing::debug!(config = %cli.config.display(), ids = ?cfg.axes.ids, "config loaded");
    let shutdown = install_shutdown_handler();

    match &cli.cmd {
        Commands::Home { axis } => motion::home(&cfg, *axis, cli.json).map(|_| ()),
        Commands::Run {
            waypoints,
            max_run_ms,
        } => motion::run_script(
            &cfg,
            waypoints.as_deref(),
            *max_run_ms,
            shutdown,
            cli.json,
        )
        .map(|_| ()),
        Commands::Park => motion::park(&cfg, shutdown, cli.json),
        Commands::SelfCheck => motion::self_check(&cfg, cli.json),
        Commands::Curve { .. } => Ok(()),
    }
}

fn load_config(path: &Path) -> eyre::Result<stride_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = stride_config::load_toml(&text).map_err(|e| {
        Report::new(StrideError::Config(format!("{}: {e}", path.display())))
    })?;
    cfg.validate()
        .map_err(|e| Report::new(StrideError::Config(e.to_string())))?;
    Ok(cfg)
}

fn install_shutdown_handler() -> Arc<AtomicBool> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    }) {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
    }
    shutdown
}

/// Console logging to stderr (level from --log-level, overridden by RUST_LOG) plus an optional
/// JSON file sink from `[logging]`.
fn init_tracing(cli: &Cli, logging: Option<&stride_config::Logging>) {
    use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str()));
    let console = if cli.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    };
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![console];

    if let Some(log) = logging
        && let Some(file) = log.file.as_deref()
    {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "stride.log".into(), |n| n.to_os_string());
        let appender = match log.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        if let Ok(mut slot) = FILE_GUARD.lock() {
            *slot = Some(guard);
        }
        let level = log.level.as_deref().unwrap_or("info");
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(level))
                .boxed(),
        );
    }

    let _ = tracing_subscriber::registry().with(layers).try_init();
}
