//! Client-view-path to real-filesystem-path translation.
//!
//! # Design
//! - The translation table is sorted longest-prefix-first at construction
//!   time so overlapping prefixes resolve unambiguously, rather than relying
//!   on map-iteration order.

use std::path::{Path, PathBuf};

/// An ordered set of `(from, to)` prefix rewrite rules.
#[derive(Debug, Clone, Default)]
pub struct PathTranslator {
    rules: Vec<(String, String)>,
}

impl PathTranslator {
    /// Build a translator from an unordered `(from, to)` table, sorting rules
    /// so the longest `from` prefix is tried first.
    #[must_use]
    pub fn new<I>(table: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut rules: Vec<(String, String)> = table.into_iter().collect();
        rules.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        Self { rules }
    }

    /// Translate `path` using the first matching prefix rule, or return the
    /// normalized input unchanged if no rule applies.
    #[must_use]
    pub fn translate(&self, path: &str) -> PathBuf {
        let normalized = normalize(path);
        for (from, to) in &self.rules {
            let from_normalized = normalize(from);
            if let Some(tail) = strip_prefix(&normalized, &from_normalized) {
                let mut rewritten = normalize(to);
                if !tail.is_empty() {
                    if !rewritten.ends_with('/') {
                        rewritten.push('/');
                    }
                    rewritten.push_str(tail.trim_start_matches('/'));
                }
                return PathBuf::from(normalize(&rewritten));
            }
        }
        PathBuf::from(normalized)
    }
}

fn normalize(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    let mut normalized = replaced.trim_end_matches('/').to_string();
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

fn strip_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if path == prefix {
        return Some("");
    }
    let with_slash = if prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    };
    path.strip_prefix(&with_slash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_is_identity() {
        let translator = PathTranslator::new(Vec::new());
        assert_eq!(
            translator.translate("/data/downloads/movie"),
            PathBuf::from("/data/downloads/movie")
        );
    }

    #[test]
    fn rewrites_matching_prefix() {
        let translator = PathTranslator::new([(
            "/remote/downloads".to_string(),
            "/mnt/data".to_string(),
        )]);
        assert_eq!(
            translator.translate("/remote/downloads/movie/file.mkv"),
            PathBuf::from("/mnt/data/movie/file.mkv")
        );
    }

    #[test]
    fn longer_prefix_wins_over_shorter_overlapping_prefix() {
        let translator = PathTranslator::new([
            ("/data".to_string(), "/mnt/short".to_string()),
            ("/data/tv".to_string(), "/mnt/long".to_string()),
        ]);
        assert_eq!(
            translator.translate("/data/tv/show/episode.mkv"),
            PathBuf::from("/mnt/long/show/episode.mkv")
        );
        assert_eq!(
            translator.translate("/data/movies/film.mkv"),
            PathBuf::from("/mnt/short/movies/film.mkv")
        );
    }

    #[test]
    fn no_matching_rule_returns_normalized_input() {
        let translator = PathTranslator::new([(
            "/remote".to_string(),
            "/mnt".to_string(),
        )]);
        assert_eq!(
            translator.translate("/other/path/"),
            PathBuf::from("/other/path")
        );
    }

    #[test]
    fn exact_prefix_match_with_no_tail() {
        let translator = PathTranslator::new([(
            "/remote/downloads".to_string(),
            "/mnt/data".to_string(),
        )]);
        assert_eq!(
            translator.translate("/remote/downloads"),
            PathBuf::from("/mnt/data")
        );
    }
}
