use thiserror::Error;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Failure modes for a single key lookup against a backend.
///
/// Failures are isolated per (bot, key) pair: a lookup error suppresses one
/// reply and never aborts the rest of the message.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The key is well-formed but the backend has no record for it.
    #[error("{0} not found")]
    NotFound(String),
    /// The key's type prefix is not in the table map. Treated as not-found.
    #[error("unrecognized record type {0}")]
    UnknownTicketType(String),
    /// Transport failure or an unexpected backend status.
    #[error("backend error: {0}")]
    Backend(String),
}

impl LookupError {
    /// Whether the failure means "no such record" rather than a backend fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::UnknownTicketType(_))
    }
}

/// A bot's match pattern did not compile. The bot is skipped at load time.
#[derive(Debug, Error)]
#[error("invalid match pattern {pattern:?}: {source}")]
pub struct InvalidPatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// A control-command argument outside the accepted token set.
#[derive(Debug, Error)]
#[error("invalid boolean value {0}")]
pub struct InvalidArgumentError(pub String);
