use crate::notify::Notifier;
use crate::transport::Payload;
use std::fmt;
use thiserror::Error;

/// Status the server uses to reject a move (out of bounds, game over).
pub const ILLEGAL_MOVE_STATUS: u16 = 400;

/// Why an action did not update the session.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Failure {
    #[error("illegal move (status {status})")]
    IllegalMove { status: u16 },
    #[error("server returned {status}")]
    Server { status: u16, body: Option<String> },
    #[error("no response: {reason}")]
    Transport { reason: String },
    #[error("undecodable response: {reason}")]
    Decode { reason: String },
}

impl Failure {
    /// Classify a failed call that is not a move.
    pub fn from_status(status: Option<u16>, body: Option<&Payload>) -> Self {
        let body = body.and_then(Payload::as_text);
        match status {
            Some(status) => Failure::Server { status, body },
            None => Failure::Transport {
                reason: body.unwrap_or_default(),
            },
        }
    }

    /// Classify a failed move submission. A 400 is the server's regular
    /// answer to an illegal move rather than an error.
    pub fn from_move_status(status: Option<u16>, body: Option<&Payload>) -> Self {
        match status {
            Some(ILLEGAL_MOVE_STATUS) => Failure::IllegalMove {
                status: ILLEGAL_MOVE_STATUS,
            },
            status => Failure::from_status(status, body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Failure::IllegalMove { status } | Failure::Server { status, .. } => Some(*status),
            Failure::Transport { .. } | Failure::Decode { .. } => None,
        }
    }
}

/// A response whose (successful) status differs from the documented one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMismatch {
    pub operation: &'static str,
    pub expected: u16,
    pub actual: u16,
}

impl fmt::Display for StatusMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ERROR: Incorrect HTTP status returned for [{}]; expected {} but server returned {}",
            self.operation, self.expected, self.actual
        )
    }
}

/// Alert through `notifier` when `actual` is not the status documented for
/// `operation`. Never aborts the caller.
pub fn check_status<N: Notifier + ?Sized>(
    notifier: &N,
    operation: &'static str,
    expected: u16,
    actual: u16,
) -> Option<StatusMismatch> {
    if actual == expected {
        return None;
    }
    let mismatch = StatusMismatch {
        operation,
        expected,
        actual,
    };
    notifier.alert(&mismatch.to_string());
    Some(mismatch)
}
