//! Bootstrap stub generation for self-executing PHP archives.
//!
//! A stub is the script the PHP runtime executes before any archived file is
//! touched. It registers the archive (optionally as a web front controller),
//! and can carry a self-extraction fallback for runtimes built without the
//! phar extension. Everything after [`HALT_MARKER`] is payload.

mod export;
mod extract;
mod generator;
mod mime;


pub use extract::ExtractCode;
pub use generator::{
    StubConfiguration, StubGenerator, DEFAULT_BANNER, DEFAULT_SHEBANG, HALT_MARKER,
    MUNG_WHITELIST, OPEN_TAG,
};
pub use mime::MimeType;
