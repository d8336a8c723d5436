//! Heuristic sentence segmentation for document text.
//!
//! Not a grammar-correct splitter: sentences break on `.` or `?` followed
//! by whitespace unless the text just before the break looks like an
//! abbreviation ("U.S.", "e.g.", "Dr."). False splits and joins on unusual
//! punctuation are an accepted limitation.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUNS: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapse every whitespace run to a single space.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUNS.replace_all(text, " ").into_owned()
}

/// Normalize and segment every page into one flat sentence set.
///
/// Sentences are trimmed; empty results are dropped. Duplicates across
/// pages are kept as-is.
pub fn segment(pages: &[String]) -> Vec<String> {
    let mut sentences = Vec::new();
    for page in pages {
        let normalized = normalize_whitespace(page);
        sentences.extend(split_sentences(&normalized));
    }
    sentences
}

/// Split normalized text on sentence-terminal punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        if chars[i].is_whitespace()
            && matches!(chars[i - 1], '.' | '?')
            && !ends_with_abbreviation(&chars[..i])
        {
            push_trimmed(&mut sentences, &chars[start..i]);
            start = i + 1;
        }
    }
    if start < chars.len() {
        push_trimmed(&mut sentences, &chars[start..]);
    }

    sentences
}

fn push_trimmed(out: &mut Vec<String>, chars: &[char]) {
    let sentence: String = chars.iter().collect();
    let trimmed = sentence.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// True when the text before a candidate split point ends in an
/// abbreviation rather than a sentence terminator: a word character,
/// period, word character, period shape ("U.S.", "e.g."), or an uppercase
/// letter, lowercase letter, period shape ("Dr.").
fn ends_with_abbreviation(prefix: &[char]) -> bool {
    let n = prefix.len();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    if n >= 4 && is_word(prefix[n - 4]) && prefix[n - 3] == '.' && is_word(prefix[n - 2]) {
        return true;
    }
    if n >= 3
        && prefix[n - 3].is_uppercase()
        && prefix[n - 2].is_lowercase()
        && prefix[n - 1] == '.'
    {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_splits_on_period_and_question_mark() {
        let sentences = split_sentences("The heart has four chambers. Does it? Yes.");
        assert_eq!(
            sentences,
            vec!["The heart has four chambers.", "Does it?", "Yes."]
        );
    }

    #[test]
    fn test_keeps_dotted_abbreviations_together() {
        let sentences = split_sentences("The U.S. health system is large. Next point.");
        assert_eq!(
            sentences,
            vec!["The U.S. health system is large.", "Next point."]
        );
    }

    #[test]
    fn test_keeps_latin_abbreviations_together() {
        let sentences = split_sentences("Fruits, e.g. apples, are sweet. Done.");
        assert_eq!(sentences, vec!["Fruits, e.g. apples, are sweet.", "Done."]);
    }

    #[test]
    fn test_keeps_titles_together() {
        let sentences = split_sentences("Dr. Osler taught here. He left in 1905.");
        assert_eq!(
            sentences,
            vec!["Dr. Osler taught here.", "He left in 1905."]
        );
    }

    #[test]
    fn test_trailing_fragment_without_terminator_is_kept() {
        let sentences = split_sentences("Complete sentence. trailing fragment");
        assert_eq!(sentences, vec!["Complete sentence.", "trailing fragment"]);
    }

    #[test]
    fn test_empty_input_yields_empty_set() {
        assert!(split_sentences("").is_empty());
        assert!(segment(&[]).is_empty());
        assert!(segment(&pages(&["", "   "])).is_empty());
    }

    #[test]
    fn test_normalize_collapses_whitespace_runs() {
        assert_eq!(
            normalize_whitespace("one\n\ntwo\t three   four"),
            "one two three four"
        );
    }

    #[test]
    fn test_segment_flattens_pages_and_keeps_duplicates() {
        let sentences = segment(&pages(&["Same line. Other line.", "Same line."]));
        assert_eq!(sentences, vec!["Same line.", "Other line.", "Same line."]);
    }

    #[test]
    fn test_rejoining_reconstructs_normalized_text() {
        // Holds whenever no abbreviation exceptions fire.
        let normalized = normalize_whitespace("Alpha beta.  Gamma delta? Epsilon.");
        let sentences = split_sentences(&normalized);
        assert_eq!(sentences.join(" "), normalized);
    }
}
