//! Check pass over one document.
//!
//! Coordinates extraction, staging, compilation and parsing for every
//! compilable fragment, then publishes the collected diagnostics.

use super::SnippetError;
use super::compiler::{CompilerInvoker, ProcessCompiler};
use super::config::SnippetCheckConfig;
use super::diagnostic::Diagnostic;
use super::extractor::{Fragment, FragmentExtractor};
use super::parser::DiagnosticParser;
use super::rebase::Rebase;
use super::sink::DiagnosticSink;
use super::stager::{FragmentStager, RealFs, StagingError, StagingFs, staging_dir_for};
use crate::document::{Document, TextDocument};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Counters for one check pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Fenced regions found, whatever their language.
    pub fragments: usize,
    /// Fragments staged and handed to the compiler.
    pub compiled: usize,
    /// Compiler runs that never started (missing binary, timeout).
    pub compiler_failures: usize,
    pub diagnostics: usize,
}

impl CheckSummary {
    pub fn merge(&mut self, other: &CheckSummary) {
        self.fragments += other.fragments;
        self.compiled += other.compiled;
        self.compiler_failures += other.compiler_failures;
        self.diagnostics += other.diagnostics;
    }
}

/// Compiles the fenced fragments of Markdown documents.
pub struct SnippetChecker {
    config: SnippetCheckConfig,
    extractor: FragmentExtractor,
    compiler: Box<dyn CompilerInvoker>,
    fs: Box<dyn StagingFs>,
    staging_dir: Option<PathBuf>,
    retry: Option<(usize, Duration)>,
}

impl SnippetChecker {
    /// Create a checker running the configured compiler.
    ///
    /// `workspace_root` is substituted for `${workspaceRoot}` in compiler
    /// arguments and anchors a relative `staging-dir`.
    pub fn new(config: SnippetCheckConfig, workspace_root: &Path) -> Self {
        let compiler = ProcessCompiler::from_config(&config.compiler, workspace_root);
        let staging_dir = config.staging_dir.as_ref().map(|dir| workspace_root.join(dir));
        Self {
            extractor: FragmentExtractor::new(config.language.clone(), config.rebase),
            compiler: Box::new(compiler),
            fs: Box::new(RealFs),
            staging_dir,
            retry: None,
            config,
        }
    }

    pub fn with_compiler(mut self, compiler: impl CompilerInvoker + 'static) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    pub fn with_fs(mut self, fs: impl StagingFs + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    /// Override how often and how fast removal of a staged file is retried.
    pub fn with_removal_retry(mut self, attempts: usize, delay: Duration) -> Self {
        self.retry = Some((attempts, delay));
        self
    }

    pub fn config(&self) -> &SnippetCheckConfig {
        &self.config
    }

    /// Read `path` and check it.
    pub fn check_file(&self, path: &Path, sink: &mut dyn DiagnosticSink) -> Result<CheckSummary, SnippetError> {
        let document = TextDocument::open(path).map_err(|source| SnippetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.check_document(&document, sink)
    }

    /// Run one check pass over `document`.
    ///
    /// The sink is cleared and then set for the document even when staging
    /// fails part way; in that case it receives the diagnostics gathered so
    /// far and the staging error is returned.
    pub fn check_document(
        &self,
        document: &dyn Document,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<CheckSummary, SnippetError> {
        let identity = document.identity();
        let fragments = self.extractor.extract(document.text(), identity);

        let dir = staging_dir_for(self.staging_dir.as_deref(), Path::new(identity));
        let mut stager = FragmentStager::new(dir, self.config.extension.as_str(), self.fs.as_ref());
        if let Some((attempts, delay)) = self.retry {
            stager = stager.with_retry(attempts, delay);
        }

        let mut summary = CheckSummary {
            fragments: fragments.len(),
            ..Default::default()
        };
        let mut diagnostics = Vec::new();
        let mut failure = None;

        for fragment in fragments.iter().filter(|f| f.is_compilable()) {
            match self.check_fragment(&stager, document, fragment) {
                Ok((found, compiler_failed)) => {
                    summary.compiled += 1;
                    summary.compiler_failures += usize::from(compiler_failed);
                    diagnostics.extend(found);
                }
                Err(e) => {
                    log::error!("Aborting check of {identity}: {e}");
                    failure = Some(e);
                    break;
                }
            }
        }

        summary.diagnostics = diagnostics.len();
        log::debug!(
            "Checked {identity}: {} fragment(s), {} compiled, {} diagnostic(s)",
            summary.fragments,
            summary.compiled,
            summary.diagnostics
        );

        sink.clear(identity);
        sink.set(identity, diagnostics);

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(summary),
        }
    }

    /// Stage, compile and parse one fragment. The staged file is removed when
    /// this returns, including on early return.
    fn check_fragment(
        &self,
        stager: &FragmentStager<'_>,
        document: &dyn Document,
        fragment: &Fragment,
    ) -> Result<(Vec<Diagnostic>, bool), StagingError> {
        let staged = stager.stage(fragment)?;
        let output = self.compiler.compile(staged.path());
        let compiler_failed = output.spawn_error.is_some();

        let Some(text) = output.diagnostic_text() else {
            return Ok((Vec::new(), compiler_failed));
        };

        let rebase = Rebase::new(self.config.rebase, fragment.start_line, staged.path());
        let diagnostics = DiagnosticParser::new(document, &rebase)
            .with_source_tag(self.config.source_tag.as_str())
            .with_fatal_without_location(self.config.fatal_without_location)
            .parse(text);

        Ok((diagnostics, compiler_failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippets::compiler::CompileOutput;
    use crate::snippets::diagnostic::Severity;
    use crate::snippets::sink::CollectingSink;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::io;
    use std::rc::Rc;

    /// In-memory filesystem that remembers everything ever written.
    #[derive(Clone, Default)]
    struct MemoryFs {
        files: Rc<RefCell<BTreeMap<PathBuf, String>>>,
        written: Rc<RefCell<Vec<(PathBuf, String)>>>,
        fail_writes_after: Option<usize>,
    }

    impl StagingFs for MemoryFs {
        fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
            if let Some(limit) = self.fail_writes_after
                && self.written.borrow().len() >= limit
            {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "disk full"));
            }
            self.files.borrow_mut().insert(path.to_path_buf(), content.to_string());
            self.written.borrow_mut().push((path.to_path_buf(), content.to_string()));
            Ok(())
        }

        fn delete_file(&self, path: &Path) -> io::Result<()> {
            self.files.borrow_mut().remove(path);
            Ok(())
        }
    }

    /// Compiler that replays canned output and records what it was asked to compile.
    #[derive(Clone, Default)]
    struct FakeCompiler {
        outputs: Rc<RefCell<Vec<CompileOutput>>>,
        seen: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl FakeCompiler {
        fn replying(outputs: Vec<CompileOutput>) -> Self {
            let mut outputs = outputs;
            outputs.reverse();
            Self {
                outputs: Rc::new(RefCell::new(outputs)),
                seen: Rc::default(),
            }
        }
    }

    impl CompilerInvoker for FakeCompiler {
        fn compile(&self, source: &Path) -> CompileOutput {
            self.seen.borrow_mut().push(source.to_path_buf());
            self.outputs.borrow_mut().pop().unwrap_or_default()
        }
    }

    fn failing(stdout: &str) -> CompileOutput {
        CompileOutput {
            exit_code: 2,
            stdout: stdout.to_string(),
            ..Default::default()
        }
    }

    fn checker(compiler: &FakeCompiler, fs: &MemoryFs) -> SnippetChecker {
        let config = SnippetCheckConfig {
            staging_dir: Some(PathBuf::from("/stage")),
            ..Default::default()
        };
        SnippetChecker::new(config, Path::new("/work"))
            .with_compiler(compiler.clone())
            .with_fs(fs.clone())
            .with_removal_retry(1, Duration::ZERO)
    }

    const GUIDE: &str = "# Guide\n\nSome text.\n\n```cpp\nint main() {\n    return y;\n}\n```\n\n```python\nprint(1)\n```\n\n```cpp\nint ok;\n```\n";

    #[test]
    fn test_empty_document_clears_sink() {
        let compiler = FakeCompiler::default();
        let fs = MemoryFs::default();
        let mut sink = CollectingSink::new();
        sink.set("/docs/empty.md", vec![Diagnostic::new(
            Severity::Error,
            crate::document::Position {
                line: 0,
                column: 0,
                offset: 0,
            },
            "stale",
        )]);

        let doc = TextDocument::new("/docs/empty.md", "# Nothing to compile\n");
        let summary = checker(&compiler, &fs).check_document(&doc, &mut sink).unwrap();

        assert_eq!(summary, CheckSummary::default());
        assert_eq!(sink.get("/docs/empty.md").map(<[Diagnostic]>::len), Some(0));
        assert!(compiler.seen.borrow().is_empty());
        assert!(fs.written.borrow().is_empty());
    }

    #[test]
    fn test_clean_compile_yields_nothing() {
        let compiler = FakeCompiler::replying(vec![CompileOutput::default(), CompileOutput::default()]);
        let fs = MemoryFs::default();
        let mut sink = CollectingSink::new();

        let doc = TextDocument::new("/docs/guide.md", GUIDE);
        let summary = checker(&compiler, &fs).check_document(&doc, &mut sink).unwrap();

        assert_eq!(summary.fragments, 3);
        assert_eq!(summary.compiled, 2);
        assert_eq!(summary.diagnostics, 0);
        assert_eq!(sink.get("/docs/guide.md").map(<[Diagnostic]>::len), Some(0));
    }

    #[test]
    fn test_fragments_are_staged_by_id_and_removed() {
        let compiler = FakeCompiler::default();
        let fs = MemoryFs::default();
        let mut sink = CollectingSink::new();

        let doc = TextDocument::new("/docs/guide.md", GUIDE);
        checker(&compiler, &fs).check_document(&doc, &mut sink).unwrap();

        assert_eq!(
            *compiler.seen.borrow(),
            vec![PathBuf::from("/stage/snippet-1.cpp"), PathBuf::from("/stage/snippet-3.cpp")]
        );
        let written = fs.written.borrow();
        assert_eq!(written[0].1, "#line 6 \"/docs/guide.md\"\nint main() {\n    return y;\n}\n");
        assert!(fs.files.borrow().is_empty());
    }

    #[test]
    fn test_diagnostics_land_on_document_lines() {
        let compiler = FakeCompiler::replying(vec![failing(
            "snippet-1.cpp\n/docs/guide.md(7,12): error C2065: 'y': undeclared identifier\n    return y;\n           ^\n",
        )]);
        let fs = MemoryFs::default();
        let mut sink = CollectingSink::new();

        let doc = TextDocument::new("/docs/guide.md", GUIDE);
        let summary = checker(&compiler, &fs).check_document(&doc, &mut sink).unwrap();

        assert_eq!(summary.diagnostics, 1);
        let diags = sink.get("/docs/guide.md").unwrap();
        assert_eq!(diags[0].line(), 7);
        assert_eq!(diags[0].column(), 12);
        assert_eq!(diags[0].message, "'y': undeclared identifier\n    return y;\n           ^");
        assert_eq!(&GUIDE[diags[0].span.start.offset..diags[0].span.start.offset + 1], "y");
    }

    #[test]
    fn test_malformed_output_still_removes_staged_file() {
        let compiler = FakeCompiler::replying(vec![failing("garbage\n((((\n: : :\n")]);
        let fs = MemoryFs::default();
        let mut sink = CollectingSink::new();

        let doc = TextDocument::new("/docs/guide.md", "```cpp\nint x\n```\n");
        let summary = checker(&compiler, &fs).check_document(&doc, &mut sink).unwrap();

        assert_eq!(summary.diagnostics, 0);
        assert_eq!(fs.written.borrow().len(), 1);
        assert!(fs.files.borrow().is_empty());
    }

    #[test]
    fn test_escaped_fragment_is_never_staged() {
        let compiler = FakeCompiler::default();
        let fs = MemoryFs::default();
        let mut sink = CollectingSink::new();

        let doc = TextDocument::new("/docs/guide.md", "\\```cpp\nnot code\n```\n");
        let summary = checker(&compiler, &fs).check_document(&doc, &mut sink).unwrap();

        assert_eq!(summary.fragments, 1);
        assert_eq!(summary.compiled, 0);
        assert!(fs.written.borrow().is_empty());
    }

    #[test]
    fn test_spawn_failure_is_counted_without_diagnostics() {
        let compiler = FakeCompiler::replying(vec![CompileOutput::spawn_failed(
            "Failed to spawn 'cl.exe': No such file or directory",
        )]);
        let fs = MemoryFs::default();
        let mut sink = CollectingSink::new();

        let doc = TextDocument::new("/docs/guide.md", "```cpp\nint x;\n```\n");
        let summary = checker(&compiler, &fs).check_document(&doc, &mut sink).unwrap();

        assert_eq!(summary.compiler_failures, 1);
        assert_eq!(summary.diagnostics, 0);
    }

    #[test]
    fn test_staging_failure_aborts_but_publishes_partial_results() {
        let compiler = FakeCompiler::replying(vec![failing("/docs/guide.md(6,1): error C2065: boom\n")]);
        let fs = MemoryFs {
            fail_writes_after: Some(1),
            ..Default::default()
        };
        let mut sink = CollectingSink::new();

        let doc = TextDocument::new("/docs/guide.md", GUIDE);
        let result = checker(&compiler, &fs).check_document(&doc, &mut sink);

        assert!(matches!(result, Err(SnippetError::Staging(StagingError::Write { .. }))));
        assert_eq!(sink.get("/docs/guide.md").map(<[Diagnostic]>::len), Some(1));
        assert_eq!(compiler.seen.borrow().len(), 1);
    }

    #[test]
    fn test_first_line_offset_strategy() {
        let compiler = FakeCompiler::replying(vec![failing("/stage/snippet-1.cpp(3,12): error C2065: 'y': undeclared identifier\n")]);
        let fs = MemoryFs::default();
        let mut sink = CollectingSink::new();
        let config = SnippetCheckConfig {
            staging_dir: Some(PathBuf::from("/stage")),
            rebase: crate::snippets::RebaseStrategy::FirstLineOffset,
            ..Default::default()
        };
        let checker = SnippetChecker::new(config, Path::new("/work"))
            .with_compiler(compiler.clone())
            .with_fs(fs.clone());

        let doc = TextDocument::new("/docs/guide.md", GUIDE);
        checker.check_document(&doc, &mut sink).unwrap();

        assert!(fs.written.borrow()[0].1.starts_with("\nint main()"));
        assert_eq!(sink.get("/docs/guide.md").unwrap()[0].line(), 7);
    }

    #[test]
    fn test_summary_merge() {
        let mut total = CheckSummary::default();
        total.merge(&CheckSummary {
            fragments: 2,
            compiled: 1,
            compiler_failures: 0,
            diagnostics: 3,
        });
        total.merge(&CheckSummary {
            fragments: 1,
            compiled: 1,
            compiler_failures: 1,
            diagnostics: 0,
        });
        assert_eq!(total.fragments, 3);
        assert_eq!(total.compiled, 2);
        assert_eq!(total.compiler_failures, 1);
        assert_eq!(total.diagnostics, 3);
    }
}
