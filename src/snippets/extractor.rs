//! Fenced fragment extraction.
//!
//! Fragments are found with a lazy backtick-triple pattern rather than a full
//! Markdown parse: every well-formed ```` ``` ```` pair is a region, an opening
//! fence without a partner yields nothing. A region written as `` \``` `` is
//! escaped and never compiled.

use super::rebase::RebaseStrategy;
use crate::utils::PositionIndex;
use regex::Regex;
use std::sync::LazyLock;

const FENCE: &str = "```";

static FENCED_REGION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\\?```.*?```").unwrap());
static LANGUAGE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```(\w+)").unwrap());

/// What happens to an extracted fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Tagged with the target language; staged and compiled.
    Compile,
    /// Written as `` \``` ``.
    Escaped,
    /// Untagged or tagged with another language.
    OtherLanguage,
}

/// One fenced region of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// 1-based sequence number within one extraction pass.
    pub id: usize,
    /// Language tag following the opening fence, if any.
    pub language: Option<String>,
    /// 1-based document line holding the opening fence.
    pub start_line: usize,
    /// Byte offset of the region in the document.
    pub offset: usize,
    /// Text to stage. Rewritten with the position marker when compilable,
    /// otherwise the region as written.
    pub text: String,
    pub disposition: Disposition,
}

impl Fragment {
    pub fn is_compilable(&self) -> bool {
        self.disposition == Disposition::Compile
    }
}

/// Scans documents for fenced fragments in one target language.
#[derive(Debug, Clone)]
pub struct FragmentExtractor {
    language: String,
    strategy: RebaseStrategy,
}

impl FragmentExtractor {
    pub fn new(language: impl Into<String>, strategy: RebaseStrategy) -> Self {
        Self {
            language: language.into(),
            strategy,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Extract every fenced region of `content` in document order.
    ///
    /// Ids count every region, escaped and foreign ones included, so a
    /// fragment keeps its id when neighbouring regions change language.
    pub fn extract(&self, content: &str, identity: &str) -> Vec<Fragment> {
        let index = PositionIndex::new(content);

        FENCED_REGION
            .find_iter(content)
            .enumerate()
            .map(|(i, region)| {
                let id = i + 1;
                let raw = region.as_str();
                let start_line = index.line_of(region.start());
                let language = LANGUAGE_TAG.captures(raw).map(|caps| caps[1].to_string());

                let disposition = if raw.starts_with('\\') {
                    Disposition::Escaped
                } else if language.as_deref() == Some(self.language.as_str()) {
                    Disposition::Compile
                } else {
                    Disposition::OtherLanguage
                };

                let text = match disposition {
                    Disposition::Compile => self.rewrite(raw, start_line, identity),
                    _ => raw.to_string(),
                };

                log::debug!("Fragment {id} at line {start_line}: {disposition:?} ({language:?})");

                Fragment {
                    id,
                    language,
                    start_line,
                    offset: region.start(),
                    text,
                    disposition,
                }
            })
            .collect()
    }

    /// Replace the opening delimiter with the position marker and strip all
    /// remaining bare delimiters.
    fn rewrite(&self, raw: &str, start_line: usize, identity: &str) -> String {
        let opening = format!("{FENCE}{}", self.language);
        let marker = self.strategy.marker(start_line, identity);
        raw.replacen(&opening, &marker, 1).replace(FENCE, "")
    }
}
