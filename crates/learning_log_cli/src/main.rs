//! Learning Log server entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the database.
//! - Serve the web router until Ctrl+C or SIGTERM.
//!
//! # Invariants
//! - Startup failures exit with a non-zero status and a message on stderr.

mod config;

use config::{Config, ConfigError};
use learning_log_core::db::{open_db, DbError};
use learning_log_core::{core_version, init_logging, LoggingError};
use learning_log_web::{router, AppState};
use log::{error, info};
use std::fmt::{Display, Formatter};
use std::process::ExitCode;
use tokio::net::TcpListener;
use tokio::signal;

#[derive(Debug)]
enum StartupError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Io(std::io::Error),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Logging(err) => write!(f, "logging error: {err}"),
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Io(err) => write!(f, "server error: {err}"),
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<LoggingError> for StartupError {
    fn from(err: LoggingError) -> Self {
        Self::Logging(err)
    }
}

impl From<DbError> for StartupError {
    fn from(err: DbError) -> Self {
        Self::Db(err)
    }
}

impl From<std::io::Error> for StartupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=cli status=error error={err}");
            eprintln!("learning_log: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::load()?;
    init_logging(&config.log_level, &config.log_dir.to_string_lossy())?;
    config.log_defaults();
    info!(
        "event=server_start module=cli status=start version={} bind={} db={} search_case={}",
        core_version(),
        config.bind,
        config.db_path.display(),
        config.search_case
    );

    let conn = open_db(&config.db_path)?;
    let app = router(AppState::new(conn, config.search_case));

    let listener = TcpListener::bind(config.bind).await?;
    info!(
        "event=server_listen module=cli status=ok addr={}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=cli status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("event=signal_install module=cli status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
        info!("event=shutdown module=cli status=start signal=ctrl_c");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown module=cli status=start signal=terminate");
            }
            Err(err) => {
                error!("event=signal_install module=cli status=error signal=terminate error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
