use std::{env, path::PathBuf, time::Duration};

use crate::error::{Error, Result};

const DEFAULT_DATABASE_PATH: &str = "notes.db";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path = lookup("NOTES_DB_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH), PathBuf::from);

        let request_timeout = match lookup("NOTES_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    Error::Config(format!(
                        "failed to parse NOTES_REQUEST_TIMEOUT_SECS '{raw}': {e}"
                    ))
                })?;
                if secs == 0 {
                    return Err(Error::Config(
                        "NOTES_REQUEST_TIMEOUT_SECS must be positive".to_string(),
                    ));
                }
                secs
            }
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            database_path,
            request_timeout: Duration::from_secs(request_timeout),
        })
    }
}
