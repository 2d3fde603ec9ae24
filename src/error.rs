use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core and the network loader.
///
/// Invalid parameters and malformed input are fatal at construction
/// or load time; the simulators themselves do not produce recoverable
/// runtime errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Malformed or internally inconsistent contact network input.
    #[error("malformed network: {0}")]
    MalformedNetwork(String),

    /// Propagated I/O errors from network loading.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidParam("beta must be finite and > 0".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("beta"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let e: Error = io.into();
        assert!(matches!(e, Error::Io(_)));
    }
}
