//! Unified error type for the Phalanx meta-crate.
//!
//! The simulation itself never fails: an exhausted pool, a foreign kill
//! or a missing ball are ordinary outcomes. What can fail is getting a
//! match set up, which is what this type covers.

/// Errors raised while loading or checking a match configuration.
#[derive(Debug, thiserror::Error)]
pub enum PhalanxError {
    /// The configuration file could not be read.
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON or does not match the schema.
    #[error("parsing config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but describes an unplayable arena.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "match.json");
        let phalanx_err: PhalanxError = err.into();
        assert!(matches!(phalanx_err, PhalanxError::Io(_)));
        assert!(phalanx_err.to_string().contains("match.json"));
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let phalanx_err: PhalanxError = err.into();
        assert!(matches!(phalanx_err, PhalanxError::Parse(_)));
    }

    #[test]
    fn test_invalid_config_message() {
        let err = PhalanxError::InvalidConfig("gates overlap".into());
        assert_eq!(err.to_string(), "invalid config: gates overlap");
    }
}
