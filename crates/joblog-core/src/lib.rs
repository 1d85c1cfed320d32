//! Log model building, caching and presentation for joblog.

mod builder;
mod cache;
mod error;
mod presentation;
mod provider;
mod scanner;
mod source;

pub use builder::{build, parse_log, LogBuilder};
pub use cache::LogCache;
pub use error::{FetchError, JoblogError};
pub use presentation::{resolve_decorations, FoldRange, LogDecorations, LogPresenter, StyledRange};
pub use provider::{LogDocumentProvider, LogSource, EXPIRED_MESSAGE};
pub use scanner::{scan, Scanner, Token};
pub use source::DirectoryLogSource;

/// Result type for joblog operations.
pub type Result<T> = std::result::Result<T, JoblogError>;
