use thiserror::Error;

/// Library error type for pipeline operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A GPU object could not be allocated or updated. Recoverable: the
    /// affected tick is skipped and the pipeline keeps running.
    #[error("gpu resource error: {0}")]
    Resource(String),

    /// A programming-contract violation (zero-step animation target, missing
    /// bypass kernel at startup). Checked eagerly; fatal if it ever fires.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The presentation surface had no drawable this tick. Expected transient
    /// condition; the tick is skipped silently.
    #[error("presentation surface unavailable")]
    SurfaceUnavailable,

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}
