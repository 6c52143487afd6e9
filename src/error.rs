use std::fmt::{Display, Formatter};

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, DynError>;

/// Failure of a remote call against the user API.
///
/// `NotFound` and `Validation` are HTTP errors distinguished only by status
/// code; everything else non-2xx lands in `Http`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (unreachable host, reset, ...).
    #[error("network error: {0}")]
    Transport(String),

    #[error("not found (HTTP 404): {0}")]
    NotFound(String),

    /// The server rejected the payload (4xx other than 404).
    #[error("rejected by server (HTTP {status}): {body}")]
    Validation { status: u16, body: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// A 2xx response whose body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn transport<E: Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }

    /// Transport failure described by `err` and its whole `source()` chain,
    /// so the root cause (refused connection, DNS failure) is kept.
    pub fn transport_chain(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        Self::Transport(message)
    }

    pub fn decode<E: Display>(err: E) -> Self {
        Self::Decode(err.to_string())
    }

    /// Classify a non-2xx status.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            404 => Self::NotFound(body),
            400..=499 => Self::Validation { status, body },
            _ => Self::Http { status, body },
        }
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Validation { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

#[derive(Debug)]
pub struct WithContextError {
    pub context: String,
    pub source: DynError,
}

impl Display for WithContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl std::error::Error for WithContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            Box::new(WithContextError {
                context: f(),
                source: e.into(),
            }) as DynError
        })
    }
}
