use aho_corasick::AhoCorasick;

use murmelbot_common::error::Error;

/// Case-insensitive word filter applied before dispatch; a hit drops the
/// message entirely.
#[derive(Debug)]
pub struct SwearFilter {
    words: Vec<String>,
    matcher: Option<AhoCorasick>,
}

impl SwearFilter {
    /// An empty word list builds a filter that never matches.
    pub fn new(words: &[String]) -> Result<Self, Error> {
        let words: Vec<String> = words
            .iter()
            .filter(|w| !w.trim().is_empty())
            .map(|w| w.trim().to_string())
            .collect();

        let matcher = if words.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .build(&words)
                    .map_err(|e| Error::Config(format!("bad swear list: {e}")))?,
            )
        };

        Ok(Self { words, matcher })
    }

    /// Returns every configured word found in `text`.
    pub fn matches(&self, text: &str) -> Vec<&str> {
        let Some(matcher) = &self.matcher else {
            return Vec::new();
        };
        matcher
            .find_iter(text)
            .map(|m| self.words[m.pattern().as_usize()].as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_never_matches() {
        let filter = SwearFilter::new(&[]).unwrap();
        assert!(filter.matches("anything at all").is_empty());
    }

    #[test]
    fn finds_words_case_insensitively() {
        let filter = SwearFilter::new(&["frick".to_string(), "heck".to_string()]).unwrap();
        assert_eq!(filter.matches("oh FRICK, what the Heck"), vec!["frick", "heck"]);
        assert!(filter.matches("a clean message").is_empty());
    }
}
