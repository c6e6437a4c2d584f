//! Configuration types for snippet checking.

use super::diagnostic::SOURCE_TAG;
use super::rebase::RebaseStrategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Compiler flags used when none are configured: warnings as errors, strict
/// conformance, workspace on the include path, compile only.
pub const DEFAULT_COMPILER_ARGS: &[&str] = &[
    "/W4",
    "/WX",
    "/EHsc",
    "/Ox",
    "/std:c++latest",
    "/permissive-",
    "/I${workspaceRoot}",
    "/c",
    "/nologo",
    "/FC",
    "/diagnostics:caret",
];

/// Master configuration for snippet checking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct SnippetCheckConfig {
    /// Language tag of fences that get compiled (default: "cpp")
    #[serde(default = "default_language")]
    pub language: String,

    /// Extension of staged fragment files (default: "cpp")
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Source tag attached to every diagnostic
    #[serde(default = "default_source_tag")]
    pub source_tag: String,

    /// Directory for staged fragments (default: workspace root, else the document's directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,

    /// How compiler line numbers are mapped back onto the document
    #[serde(default)]
    pub rebase: RebaseStrategy,

    /// What to do with a fatal error that names no line
    #[serde(default)]
    pub fatal_without_location: FatalWithoutLocation,

    /// External compiler invocation
    #[serde(default)]
    pub compiler: CompilerConfig,
}

fn default_language() -> String {
    "cpp".to_string()
}

fn default_extension() -> String {
    "cpp".to_string()
}

fn default_source_tag() -> String {
    SOURCE_TAG.to_string()
}

impl Default for SnippetCheckConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            extension: default_extension(),
            source_tag: default_source_tag(),
            staging_dir: None,
            rebase: RebaseStrategy::default(),
            fatal_without_location: FatalWithoutLocation::default(),
            compiler: CompilerConfig::default(),
        }
    }
}

/// Handling of `fatal error` lines that carry no `(line,col)`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FatalWithoutLocation {
    /// Drop the diagnostic; there is no position to report it at
    #[default]
    Skip,
    /// Report it at the start of the document
    DocumentStart,
}

/// Definition of the external compiler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct CompilerConfig {
    /// Compiler binary
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments placed before the staged file; `${workspaceRoot}` is substituted
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Extra include directories, each passed with `include-flag`
    #[serde(default)]
    pub include_paths: Vec<String>,

    /// Flag prefix for include directories (default: "/I")
    #[serde(default = "default_include_flag")]
    pub include_flag: String,

    /// Timeout per compilation in milliseconds, 0 waits forever (default: 30000)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_command() -> String {
    "cl.exe".to_string()
}

fn default_args() -> Vec<String> {
    DEFAULT_COMPILER_ARGS.iter().map(|s| s.to_string()).collect()
}

fn default_include_flag() -> String {
    "/I".to_string()
}

fn default_timeout() -> u64 {
    30_000
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
            include_paths: Vec::new(),
            include_flag: default_include_flag(),
            timeout: default_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SnippetCheckConfig::default();
        assert_eq!(config.language, "cpp");
        assert_eq!(config.extension, "cpp");
        assert_eq!(config.source_tag, "markdownsnippetchecker");
        assert_eq!(config.staging_dir, None);
        assert_eq!(config.rebase, RebaseStrategy::LineDirective);
        assert_eq!(config.fatal_without_location, FatalWithoutLocation::Skip);
        assert_eq!(config.compiler.command, "cl.exe");
        assert!(config.compiler.args.contains(&"/WX".to_string()));
        assert_eq!(config.compiler.timeout, 30_000);
    }

    #[test]
    fn test_deserialize_config() {
        let toml = r#"
language = "c++"
extension = "cxx"
staging-dir = "build/snippets"
rebase = "first-line-offset"
fatal-without-location = "document-start"

[compiler]
command = "clang-cl"
args = ["/c", "/nologo"]
include-paths = ["include", "third_party"]
timeout = 5000
"#;

        let config: SnippetCheckConfig = toml::from_str(toml).expect("Failed to parse TOML");

        assert_eq!(config.language, "c++");
        assert_eq!(config.extension, "cxx");
        assert_eq!(config.staging_dir, Some(PathBuf::from("build/snippets")));
        assert_eq!(config.rebase, RebaseStrategy::FirstLineOffset);
        assert_eq!(config.fatal_without_location, FatalWithoutLocation::DocumentStart);
        assert_eq!(config.compiler.command, "clang-cl");
        assert_eq!(config.compiler.args, vec!["/c", "/nologo"]);
        assert_eq!(config.compiler.include_paths, vec!["include", "third_party"]);
        assert_eq!(config.compiler.include_flag, "/I");
        assert_eq!(config.compiler.timeout, 5000);
        assert_eq!(config.source_tag, SOURCE_TAG);
    }

    #[test]
    fn test_serialize_config() {
        let config = SnippetCheckConfig::default();
        let toml = toml::to_string_pretty(&config).expect("Failed to serialize");
        assert!(toml.contains("language = \"cpp\""));
        assert!(toml.contains("[compiler]"));
        assert!(toml.contains("cl.exe"));
        assert!(!toml.contains("staging-dir"));
    }
}
