use std::time::{Duration, SystemTimeError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("no free UDP port in range {start}-{end}")]
    NoFreePort { start: u16, end: u16 },

    #[error("network I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("system clock is set before the unix epoch")]
    Clock(#[from] SystemTimeError),

    #[error("server did not become ready within {0:?}")]
    StartupTimeout(Duration),

    #[error("server thread panicked")]
    ThreadPanicked,
}
