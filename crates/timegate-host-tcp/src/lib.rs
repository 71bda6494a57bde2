//! TCP session host for timegated
//!
//! A newline-delimited protocol over TCP. A session opens with a single
//! handshake line:
//!
//! ```text
//! HELLO <uuid> <display-name>
//! ```
//!
//! The server answers `OK` (session admitted) or `DENY <message>` followed by
//! connection close. An admitted session may later receive `KICK <message>`
//! before the server closes it. Messages are single-line; embedded newlines
//! are escaped as `\n`.

mod server;

pub use server::*;

use thiserror::Error;

/// TCP host errors
#[derive(Debug, Error)]
pub enum TcpHostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server not started")]
    NotStarted,
}

pub type TcpHostResult<T> = Result<T, TcpHostError>;
