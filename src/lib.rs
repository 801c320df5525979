//! Bootstrap stub generation for self-executing PHP archives.

pub mod compactor;
pub mod error;
pub mod project_config;
pub mod stub;

pub use error::{Result, StubError};
pub use stub::{ExtractCode, MimeType, StubConfiguration, StubGenerator};
