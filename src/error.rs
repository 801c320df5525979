use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring a stub or loading its configuration.
#[derive(Error, Debug)]
pub enum StubError {
    /// A setter received a value outside its accepted domain.
    #[error("{0}")]
    InvalidArgument(String),

    /// The stub configuration file could not be parsed.
    #[error("invalid stub configuration: {0}")]
    Config(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_displays_message_verbatim() {
        let err = StubError::InvalidArgument("bad key".to_string());
        assert_eq!(err.to_string(), "bad key");
    }

    #[test]
    fn config_error_is_prefixed() {
        let err = StubError::Config("expected a table".to_string());
        assert_eq!(
            err.to_string(),
            "invalid stub configuration: expected a table"
        );
    }

    #[test]
    fn io_error_names_the_path() {
        let err = StubError::Io {
            path: PathBuf::from("box.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "failed to read box.toml: missing");
    }
}
