use std::fmt;

/// Failures of engine operations. Sample decoding and config loading
/// return their own [`DecodeError`] and [`ConfigError`].
#[derive(Debug)]
pub enum Error {
    Service(ServiceError),
    /// The scheduler thread could not be spawned or was lost to a panic.
    Scheduler(String),
    /// Audio device setup failed (only produced with the `device` feature).
    Device(String),
}

/// Raw audio bytes could not be turned into a PCM buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    Unsupported(String),
    Corrupt(String),
    Empty,
}

/// The external text-to-pattern service failed or answered nonsense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Unavailable(String),
    Malformed(String),
}

#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read (path, cause).
    Read(String, std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Service(e) => write!(f, "pattern service error: {e}"),
            Error::Scheduler(msg) => write!(f, "scheduler error: {msg}"),
            Error::Device(msg) => write!(f, "audio device error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Service(e) => Some(e),
            Error::Scheduler(_) | Error::Device(_) => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Unsupported(what) => write!(f, "unsupported audio format: {what}"),
            DecodeError::Corrupt(what) => write!(f, "corrupt audio data: {what}"),
            DecodeError::Empty => write!(f, "audio data contains no samples"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Unavailable(msg) => write!(f, "service unavailable: {msg}"),
            ServiceError::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(path, e) => write!(f, "cannot read {path}: {e}"),
            ConfigError::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<ServiceError> for Error {
    fn from(e: ServiceError) -> Self {
        Error::Service(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}
