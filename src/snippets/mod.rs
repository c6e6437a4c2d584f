//! Compile-checking of fenced code snippets in Markdown documents.
//!
//! # Overview
//!
//! A check pass over a document:
//! - extracts every fenced region and decides whether it is compiled
//!   ([`extractor`]);
//! - writes each compilable fragment to `snippet-<id>.<ext>`, with the opening
//!   fence replaced by a `#line` directive pointing back at the document
//!   ([`stager`], [`rebase`]);
//! - runs the compiler on it ([`compiler`]);
//! - parses the compiler's output into diagnostics positioned in the
//!   document ([`parser`]);
//! - removes the staged file and publishes the diagnostics ([`sink`]).
//!
//! # Configuration
//!
//! Defaults target MSVC. Configure in `.snipcheck.toml`:
//!
//! ```toml
//! language = "cpp"
//! rebase = "line-directive"          # or "first-line-offset"
//! fatal-without-location = "skip"    # or "document-start"
//!
//! [compiler]
//! command = "cl.exe"
//! args = ["/W4", "/WX", "/EHsc", "/std:c++latest", "/I${workspaceRoot}", "/c", "/nologo", "/FC"]
//! include-paths = ["${workspaceRoot}/include"]
//! timeout = 30000
//! ```
//!
//! Escape a fence (`` \``` ``) to keep an example out of the check.

pub mod compiler;
pub mod config;
pub mod diagnostic;
pub mod extractor;
pub mod parser;
pub mod processor;
pub mod rebase;
pub mod sink;
pub mod stager;

use std::path::PathBuf;
use thiserror::Error;

pub use compiler::{CompileOutput, CompilerError, CompilerInvoker, ProcessCompiler};
pub use config::{CompilerConfig, FatalWithoutLocation, SnippetCheckConfig};
pub use diagnostic::{Diagnostic, RelatedLocation, SOURCE_TAG, Severity, Span};
pub use extractor::{Disposition, Fragment, FragmentExtractor};
pub use parser::{DiagnosticParser, LineKind, ParserState};
pub use processor::{CheckSummary, SnippetChecker};
pub use rebase::{Rebase, RebaseStrategy};
pub use sink::{CollectingSink, DiagnosticSink};
pub use stager::{FragmentStager, RealFs, StagedFile, StagingError, StagingFs};

/// Error that ends a check pass early.
#[derive(Debug, Error)]
pub enum SnippetError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Staging(#[from] StagingError),
}
