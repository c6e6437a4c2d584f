use std::path::{Path, PathBuf};

use super::{CONFIG_FILES, ConfigError};
use crate::snippets::SnippetCheckConfig;

const MAX_DEPTH: usize = 100;

const KNOWN_KEYS: &[&str] = &[
    "language",
    "extension",
    "source-tag",
    "staging-dir",
    "rebase",
    "fatal-without-location",
    "compiler",
];

const KNOWN_COMPILER_KEYS: &[&str] = &["command", "args", "include-paths", "include-flag", "timeout"];

/// Effective configuration and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: SnippetCheckConfig,
    /// File the configuration was read from, `None` for built-in defaults.
    pub path: Option<PathBuf>,
    /// Directory substituted for `${workspaceRoot}`.
    pub project_root: PathBuf,
}

/// Load configuration from `explicit`, or discover it upward from the current
/// directory. No file found means defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::IoError {
        source,
        path: ".".to_string(),
    })?;

    if let Some(path) = explicit {
        log::debug!("[snipcheck-config] Loading explicit config file: {}", path.display());
        let config = load_config_file(path)?;
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| cwd.join(p))
            .unwrap_or_else(|| cwd.clone());
        return Ok(LoadedConfig {
            config,
            path: Some(path.to_path_buf()),
            project_root: find_project_root_from(&parent),
        });
    }

    match discover_config_upward(&cwd) {
        Some((path, project_root)) => Ok(LoadedConfig {
            config: load_config_file(&path)?,
            path: Some(path),
            project_root,
        }),
        None => {
            log::debug!("[snipcheck-config] No config file found, using defaults");
            Ok(LoadedConfig {
                config: SnippetCheckConfig::default(),
                path: None,
                project_root: find_project_root_from(&cwd),
            })
        }
    }
}

/// Read and parse one configuration file.
pub fn load_config_file(path: &Path) -> Result<SnippetCheckConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        source,
        path: path.display().to_string(),
    })?;

    let table: toml::Table =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;
    for key in unknown_keys(&table) {
        log::warn!("[snipcheck-config] Unknown key '{key}' in {}", path.display());
    }

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))
}

fn unknown_keys(table: &toml::Table) -> Vec<String> {
    let mut unknown: Vec<String> = table
        .keys()
        .filter(|key| !KNOWN_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();

    if let Some(toml::Value::Table(compiler)) = table.get("compiler") {
        unknown.extend(
            compiler
                .keys()
                .filter(|key| !KNOWN_COMPILER_KEYS.contains(&key.as_str()))
                .map(|key| format!("compiler.{key}")),
        );
    }

    unknown
}

/// Find the project root by walking up from `start_dir` looking for `.git`.
/// Falls back to `start_dir` if none is found.
pub fn find_project_root_from(start_dir: &Path) -> PathBuf {
    let found = start_dir
        .ancestors()
        .take(MAX_DEPTH)
        .find(|dir| dir.join(".git").exists());

    match found {
        Some(root) => {
            log::debug!("[snipcheck-config] Found .git at: {}", root.display());
            root.to_path_buf()
        }
        None => {
            log::debug!(
                "[snipcheck-config] No .git found, using {} as project root",
                start_dir.display()
            );
            start_dir.to_path_buf()
        }
    }
}

/// Search `start_dir` and its ancestors for a configuration file, stopping at
/// the first directory containing `.git`.
///
/// Returns the config path and the project root.
pub fn discover_config_upward(start_dir: &Path) -> Option<(PathBuf, PathBuf)> {
    for dir in start_dir.ancestors().take(MAX_DEPTH) {
        log::debug!("[snipcheck-config] Searching for config in: {}", dir.display());

        if let Some(path) = CONFIG_FILES.iter().map(|name| dir.join(name)).find(|p| p.is_file()) {
            log::debug!("[snipcheck-config] Found config file: {}", path.display());
            return Some((path, find_project_root_from(dir)));
        }

        if dir.join(".git").exists() {
            log::debug!("[snipcheck-config] Stopping at .git directory");
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippets::RebaseStrategy;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discover_in_ancestor() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join(".git")).unwrap();
        fs::write(root.path().join(".snipcheck.toml"), "language = \"c\"\n").unwrap();
        let nested = root.path().join("docs").join("api");
        fs::create_dir_all(&nested).unwrap();

        let (path, project_root) = discover_config_upward(&nested).unwrap();
        assert_eq!(path, root.path().join(".snipcheck.toml"));
        assert_eq!(project_root, root.path());
    }

    #[test]
    fn test_discovery_stops_at_git() {
        let outer = tempdir().unwrap();
        fs::write(outer.path().join(".snipcheck.toml"), "").unwrap();
        let repo = outer.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        assert!(discover_config_upward(&repo).is_none());
    }

    #[test]
    fn test_dotfile_takes_precedence() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("snipcheck.toml"), "").unwrap();
        fs::write(dir.path().join(".snipcheck.toml"), "").unwrap();

        let (path, _) = discover_config_upward(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), ".snipcheck.toml");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".snipcheck.toml");
        fs::write(
            &path,
            "rebase = \"first-line-offset\"\n\n[compiler]\ncommand = \"clang-cl\"\n",
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.rebase, RebaseStrategy::FirstLineOffset);
        assert_eq!(config.compiler.command, "clang-cl");
        assert_eq!(config.language, "cpp");
    }

    #[test]
    fn test_load_invalid_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".snipcheck.toml");
        fs::write(&path, "rebase = \"sideways\"\n").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains(".snipcheck.toml"));
    }

    #[test]
    fn test_load_missing_config() {
        let err = load_config_file(Path::new("/nonexistent/.snipcheck.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }

    #[test]
    fn test_explicit_config_sets_project_root() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join(".git")).unwrap();
        let conf_dir = root.path().join("conf");
        fs::create_dir(&conf_dir).unwrap();
        let path = conf_dir.join("snippets.toml");
        fs::write(&path, "language = \"cxx\"\n").unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.config.language, "cxx");
        assert_eq!(loaded.project_root, root.path());
        assert_eq!(loaded.path, Some(path));
    }

    #[test]
    fn test_unknown_keys() {
        let table: toml::Table = toml::from_str("langauge = \"cpp\"\n[compiler]\ncommand = \"cl\"\nflags = []\n").unwrap();
        assert_eq!(unknown_keys(&table), vec!["langauge", "compiler.flags"]);
    }
}
