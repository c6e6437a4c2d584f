//! Compile-check the C++ snippets embedded in Markdown documents.
//!
//! Fenced code blocks tagged with the target language are staged to temporary
//! source files, compiled with an external MSVC-style compiler, and the
//! compiler's output is mapped back to positions in the Markdown source.
//!
//! ```no_run
//! use snipcheck_lib::snippets::{CollectingSink, SnippetCheckConfig, SnippetChecker};
//! use std::path::Path;
//!
//! let checker = SnippetChecker::new(SnippetCheckConfig::default(), Path::new("."));
//! let mut sink = CollectingSink::new();
//! checker.check_file(Path::new("README.md"), &mut sink)?;
//! for (document, diagnostics) in sink.iter() {
//!     for d in diagnostics {
//!         println!("{document}:{}:{}: {}", d.line(), d.column(), d.message);
//!     }
//! }
//! # Ok::<(), snipcheck_lib::snippets::SnippetError>(())
//! ```

pub mod config;
pub mod discovery;
pub mod document;
pub mod exit_codes;
pub mod output;
pub mod snippets;
pub mod utils;

pub use document::{Document, Position, TextDocument};
pub use snippets::{CheckSummary, Diagnostic, SnippetChecker, SnippetError};
