//! Output formatter implementations

pub mod concise;
pub mod github;
pub mod json;
pub mod text;

pub use concise::ConciseFormatter;
pub use github::GitHubFormatter;
pub use json::{JsonFormatter, format_all_diagnostics_as_json};
pub use text::TextFormatter;
