//! Alarm server entry point.
//!
//! # Responsibility
//! - Wire the scheduling core to its collaborators in a fixed order:
//!   config, logging, database, repository guard, bootstrap, scheduler,
//!   HTTP.
//! - Shut down cooperatively: stop serving, join the scheduler thread,
//!   then drop the database handle.

mod config;
mod routes;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info};
use tokio::net::TcpListener;

use chime_core::db::{open_db, DbError};
use chime_core::{
    init_logging, load_alarms, start_scheduler, AlarmQueue, AlarmService, LogNotifier, RepoError,
    SqliteAlarmRepository, SystemClock,
};

use crate::config::ServerConfig;
use crate::routes::{build_router, AppState};

#[derive(Debug)]
enum ServerError {
    Logging(String),
    Db(DbError),
    Storage(RepoError),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Db(err) => write!(f, "database unavailable: {err}"),
            Self::Storage(err) => write!(f, "alarm storage unusable: {err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(_) => None,
            Self::Db(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for ServerError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::from_env();
    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Startup failures may predate logger init, so print as well.
            error!("event=server_start module=server status=error error={err}");
            eprintln!("fatal: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), ServerError> {
    init_logging(&config.log_level, &config.log_dir.to_string_lossy())
        .map_err(ServerError::Logging)?;

    let conn = open_db(&config.db_path)?;
    let repo = SqliteAlarmRepository::try_new(conn)?;
    let queue = Arc::new(AlarmQueue::new());

    // A half-loaded schedule would silently skip alarms, so a failed read
    // here ends the process instead of serving.
    load_alarms(&repo, &queue, &SystemClock)?;

    let scheduler = start_scheduler(Arc::clone(&queue), repo.clone(), LogNotifier, SystemClock)?;

    let state = Arc::new(AppState {
        service: AlarmService::new(repo, queue),
    });

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "event=server_start module=server status=ok addr={}",
        config.bind_addr
    );
    println!("chime-server listening on http://{}", config.bind_addr);

    let serve_result = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    scheduler.stop();
    info!("event=server_stop module=server status=ok");

    serve_result.map_err(ServerError::Io)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        error!("event=server_stop module=server status=error error_code=signal_unavailable");
    }
}
