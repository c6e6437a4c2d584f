pub mod position_index;
pub mod utf8_offsets;

pub use position_index::PositionIndex;

/// Normalize path separators to `/`.
///
/// Compilers echo paths in whatever form they were handed, so comparisons and
/// line directives go through this single canonical form.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Whether two paths name the same file, ignoring ASCII case and separator style.
pub fn same_file(a: &str, b: &str) -> bool {
    normalize_separators(a.trim()).eq_ignore_ascii_case(&normalize_separators(b.trim()))
}
