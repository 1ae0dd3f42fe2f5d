mod auth;
mod config;
mod http;
mod logger;
mod state;
mod store;

use std::path::PathBuf;

use clap::Parser;
use hyper::StatusCode;
use thiserror::Error;
use tokio::sync::watch;

use crate::config::Config;
use crate::state::State;

#[derive(Debug, Parser)]
#[command(name = "leagues-server")]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = Config::from_file(&args.config).await?.with_environment();
    logger::init(config.loglevel);

    log::info!("Using config: {:?}", config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::task::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Shutting down");
                let _ = shutdown_tx.send(true);
            }
            Err(err) => log::error!("Failed to listen for shutdown signal: {}", err),
        }
    });

    let state = State::new(config, shutdown_rx).await?;

    let prefix = &state.config.database.prefix;
    let tables = [
        format!(
            "CREATE TABLE IF NOT EXISTS {}players (player_id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY, first_name TEXT NOT NULL, last_name TEXT NOT NULL, gender TEXT NOT NULL, address TEXT NOT NULL)",
            prefix
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {}games (game_code BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY, game_name TEXT NOT NULL, game_description TEXT NOT NULL)",
            prefix
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {}teams (team_id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY, team_name TEXT NOT NULL, created_by_player_id BIGINT UNSIGNED NOT NULL, date_created DATETIME NOT NULL)",
            prefix
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {}matches (match_id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY, game_code BIGINT UNSIGNED NOT NULL, team_1_id BIGINT UNSIGNED NOT NULL, team_2_id BIGINT UNSIGNED NOT NULL, match_date DATETIME NOT NULL, result TEXT NOT NULL)",
            prefix
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {}leagues (league_id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY, league_name TEXT NOT NULL, country TEXT NOT NULL)",
            prefix
        ),
    ];

    for table in &tables {
        sqlx::query(table).execute(&state.store.pool).await?;
    }

    let bind = state.config.bind.clone();
    http::bind(bind, state).await?;

    Ok(())
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] sqlx::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Hyper(#[from] hyper::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid token")]
    InvalidToken,
    #[error("not found")]
    NotFound,
    #[error("bad request")]
    BadRequest,
    #[error(transparent)]
    StatusCodeError(#[from] StatusCodeError),
}

/// An error response with a fixed status code and a message for the client.
///
/// Unlike the other [`enum@Error`] variants a `StatusCodeError` is always
/// rendered as a JSON body of the form `{"code": .., "message": ".."}`.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct StatusCodeError {
    pub code: StatusCode,
    pub message: String,
}

impl StatusCodeError {
    pub fn new<T>(code: StatusCode, message: T) -> Self
    where
        T: ToString,
    {
        Self {
            code,
            message: message.to_string(),
        }
    }

    /// Replaces the default message.
    pub fn message<T>(mut self, message: T) -> Self
    where
        T: ToString,
    {
        self.message = message.to_string();
        self
    }

    pub fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request")
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden")
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    }

    pub fn length_required() -> Self {
        Self::new(StatusCode::LENGTH_REQUIRED, "Length Required")
    }

    pub fn payload_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
    }

    pub fn request_timeout() -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT, "Request Timeout")
    }

    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }
}
