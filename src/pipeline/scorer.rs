//! Relevance scoring of a single note against the document embedding space.

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;

use crate::document::segment::normalize_whitespace;
use crate::embed::{Embedder, EmbeddingSpace};

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref SOUND_REF: Regex = Regex::new(r"\[sound:[^\]]*\]").unwrap();
    static ref CLOZE: Regex = Regex::new(r"\{\{c\d+::(.*?)(?:::[^}]*)?\}\}").unwrap();
}

/// Reduce an HTML-formatted note field to plain text.
///
/// Cloze deletions keep their answer text and lose the hint; tags and
/// `[sound:...]` references become whitespace; the common entities are
/// decoded; whitespace is collapsed.
pub fn strip_markup(text: &str) -> String {
    let text = CLOZE.replace_all(text, "$1");
    let text = SOUND_REF.replace_all(&text, " ");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = decode_entities(&text);
    normalize_whitespace(&text).trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Binary relevance decision: best-matching sentence wins.
///
/// Pure apart from the embedder call; no shared mutable state.
pub struct RelevanceScorer<'a> {
    embedder: &'a dyn Embedder,
    space: &'a EmbeddingSpace,
    threshold: f32,
}

impl<'a> RelevanceScorer<'a> {
    pub fn new(embedder: &'a dyn Embedder, space: &'a EmbeddingSpace, threshold: f32) -> Self {
        Self {
            embedder,
            space,
            threshold,
        }
    }

    /// Relevant iff the best cosine score across the space reaches the
    /// threshold. The boundary is inclusive.
    pub fn is_relevant(&self, note_text: &str) -> Result<bool> {
        let plain = strip_markup(note_text);
        let vector = self.embedder.embed(&plain)?;

        Ok(self
            .space
            .max_similarity(&vector)
            .map(|score| score >= self.threshold)
            .unwrap_or(false))
    }
}
