//! Markdown file discovery.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Ignore file honoured in addition to `.gitignore`.
pub const IGNORE_FILE: &str = ".snipcheckignore";

const MARKDOWN_GLOBS: &[&str] = &["*.md", "*.markdown"];

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    Walk(#[from] ignore::Error),
}

/// Collect the Markdown files under `paths`.
///
/// Explicit file paths are always kept, whatever their extension; directories
/// are walked for `*.md` and `*.markdown`. An empty `paths` walks the current
/// directory. The result is sorted and free of duplicates.
pub fn find_markdown_files(paths: &[PathBuf], respect_gitignore: bool) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(DiscoveryError::NotFound(path.clone()));
        }
        if path.is_file() {
            files.push(clean_path(path));
        } else {
            dirs.push(path.as_path());
        }
    }

    if paths.is_empty() {
        dirs.push(Path::new("."));
    }

    if let Some((first, rest)) = dirs.split_first() {
        let mut walk_builder = WalkBuilder::new(first);
        for dir in rest {
            walk_builder.add(dir);
        }

        let mut types_builder = ignore::types::TypesBuilder::new();
        for glob in MARKDOWN_GLOBS {
            types_builder.add("markdown", glob)?;
        }
        types_builder.select("markdown");
        walk_builder.types(types_builder.build()?);

        walk_builder.ignore(respect_gitignore);
        walk_builder.git_ignore(respect_gitignore);
        walk_builder.git_global(respect_gitignore);
        walk_builder.git_exclude(respect_gitignore);
        walk_builder.parents(respect_gitignore);
        walk_builder.hidden(true);
        walk_builder.require_git(false);
        walk_builder.add_custom_ignore_filename(IGNORE_FILE);

        for entry in walk_builder.build() {
            match entry {
                Ok(entry) if entry.file_type().is_some_and(|ft| ft.is_file()) => {
                    files.push(clean_path(entry.path()));
                }
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable path: {e}"),
            }
        }
    }

    files.sort();
    files.dedup();
    log::debug!("Discovered {} Markdown file(s)", files.len());
    Ok(files)
}

fn clean_path(path: &Path) -> PathBuf {
    path.strip_prefix("./").unwrap_or(path).to_path_buf()
}
