//! Runtime configuration
//!
//! The first positional argument picks the mode (`demo`) or the bind
//! address. Admission policy comes from the environment:
//! - `CHAT_UNIQUE_NAMES`: `1`, `true` or `yes` refuses duplicate screen names
//! - `CHAT_MAX_SESSIONS`: positive session limit

use thiserror::Error;

use crate::room::RoomConfig;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

pub const UNIQUE_NAMES_VAR: &str = "CHAT_UNIQUE_NAMES";
pub const MAX_SESSIONS_VAR: &str = "CHAT_MAX_SESSIONS";

/// What the binary should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Serve the WebSocket gateway on this address
    Serve { addr: String },
    /// Run the single-client demo and exit
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub room: RoomConfig,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidMaxSessions { var: &'static str, value: String },
}

impl Config {
    /// Read configuration from the process arguments and environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::parse(std::env::args().nth(1), |var| std::env::var(var).ok())
    }

    /// Build configuration from the first argument and an env lookup
    pub fn parse<F>(arg: Option<String>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match arg {
            Some(arg) if arg == "demo" => Mode::Demo,
            Some(addr) => Mode::Serve { addr },
            None => Mode::Serve {
                addr: DEFAULT_ADDR.to_string(),
            },
        };

        let unique_screen_names = env(UNIQUE_NAMES_VAR)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let max_sessions = match env(MAX_SESSIONS_VAR) {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(ConfigError::InvalidMaxSessions {
                        var: MAX_SESSIONS_VAR,
                        value,
                    })
                }
            },
            None => None,
        };

        Ok(Self {
            mode,
            room: RoomConfig {
                unique_screen_names,
                max_sessions,
            },
        })
    }
}
