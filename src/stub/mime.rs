use std::fmt;

use serde::Deserialize;

use super::export;

/// How the archive runtime serves a file extension over the web.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum MimeType {
    /// Run the file through the PHP interpreter (`Phar::PHP`).
    Php,
    /// Serve syntax-highlighted source (`Phar::PHPS`).
    Phps,
    /// Serve with an explicit `Content-Type`.
    Type(String),
}

impl MimeType {
    /// Runtime code for `Phar::PHP`.
    pub const PHP_CODE: i64 = 0;
    /// Runtime code for `Phar::PHPS`.
    pub const PHPS_CODE: i64 = 1;

    pub(crate) fn export(&self) -> String {
        match self {
            MimeType::Php => Self::PHP_CODE.to_string(),
            MimeType::Phps => Self::PHPS_CODE.to_string(),
            MimeType::Type(content_type) => export::string(content_type),
        }
    }
}

impl From<String> for MimeType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "php" => MimeType::Php,
            "phps" => MimeType::Phps,
            _ => MimeType::Type(value),
        }
    }
}

impl From<&str> for MimeType {
    fn from(value: &str) -> Self {
        MimeType::from(value.to_string())
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MimeType::Php => f.write_str("php"),
            MimeType::Phps => f.write_str("phps"),
            MimeType::Type(content_type) => f.write_str(content_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_constants_export_as_codes() {
        assert_eq!(MimeType::Php.export(), "0");
        assert_eq!(MimeType::Phps.export(), "1");
    }

    #[test]
    fn content_types_export_quoted() {
        assert_eq!(MimeType::from("text/html").export(), "'text/html'");
    }

    #[test]
    fn parse_is_case_insensitive_for_constants() {
        assert_eq!(MimeType::from("PHPS"), MimeType::Phps);
        assert_eq!(MimeType::from("php"), MimeType::Php);
        assert_eq!(
            MimeType::from("Image/PNG"),
            MimeType::Type("Image/PNG".to_string())
        );
    }
}
