pub mod backend;
pub mod config_file;
pub mod job;
pub mod paths;
pub mod text;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use config_file::ConfigFile;
pub use job::{ExtractError, ExtractionJob, Outcome, extract_to_file, run, write_text};
pub use paths::{PathOverrides, ResolvedPaths};
pub use text::TextOptions;
