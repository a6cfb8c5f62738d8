//! Remote score API
//!
//! `GET {base}/scores/{board}` returns the ledger as a JSON array of entries;
//! `POST` with the same array replaces it. Blocking calls, so callers keep
//! them off the tick thread.

use std::thread;
use std::time::Duration;

use super::{Board, ScoreStore, StoreError};
use crate::highscores::ScoreEntry;

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounded retry with a fixed delay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds or the retries run out
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Result<T, StoreError>,
    {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "{} failed ({}), retry {}/{}",
                        what,
                        e,
                        attempt,
                        self.max_retries
                    );
                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                }
                Err(e) => {
                    log::error!("{} failed after {} attempts: {}", what, attempt + 1, e);
                    return Err(e);
                }
            }
        }
    }
}

pub struct RemoteStore {
    url: String,
    client: reqwest::blocking::Client,
    retry: RetryPolicy,
}

impl RemoteStore {
    pub fn new(base_url: &str, board: Board, retry: RetryPolicy) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("keyscale/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: format!("{}/scores/{}", base_url.trim_end_matches('/'), board.as_str()),
            client,
            retry,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(StoreError::Status(status.as_u16()))
    }
}

impl ScoreStore for RemoteStore {
    fn name(&self) -> String {
        self.url.clone()
    }

    fn load(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        self.retry.run(&format!("GET {}", self.url), || {
            let response = check_status(self.client.get(&self.url).send()?)?;
            Ok(response.json::<Vec<ScoreEntry>>()?)
        })
    }

    fn save(&self, entries: &[ScoreEntry]) -> Result<(), StoreError> {
        self.retry.run(&format!("POST {}", self.url), || {
            check_status(self.client.post(&self.url).json(entries).send()?)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn instant(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_retry_until_success() {
        let calls = Cell::new(0);
        let result = instant(3).run("op", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(StoreError::Status(503))
            } else {
                Ok(calls.get())
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_retry_gives_up() {
        let calls = Cell::new(0);
        let result: Result<(), _> = instant(2).run("op", || {
            calls.set(calls.get() + 1);
            Err(StoreError::Status(500))
        });
        assert!(matches!(result, Err(StoreError::Status(500))));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_url_layout() {
        let store = RemoteStore::new("https://example.test/api/", Board::Game, instant(0)).unwrap();
        assert_eq!(store.url(), "https://example.test/api/scores/game");
    }

    #[test]
    fn test_unreachable_server_errors() {
        let store = RemoteStore::new("http://127.0.0.1:9", Board::Cli, instant(0)).unwrap();
        assert!(store.load().is_err());
        assert!(store.save(&[ScoreEntry::new("a", 1)]).is_err());
    }
}
