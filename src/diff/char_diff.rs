//! Character-level diffs of changed cell values

use serde::{Deserialize, Serialize};

/// Kind of a span in a character diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanTag {
    Equal,
    Insert,
    Delete,
}

/// A run of characters sharing one tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSpan {
    pub tag: SpanTag,
    pub text: String,
}

/// Ordered sequence of spans describing how one string became another
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffModel {
    pub spans: Vec<DiffSpan>,
}

impl DiffModel {
    /// Append text, merging with the previous span when the tag matches
    pub fn push(&mut self, tag: SpanTag, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.tag == tag => last.text.push_str(text),
            _ => self.spans.push(DiffSpan {
                tag,
                text: text.to_string(),
            }),
        }
    }

    /// The same diff seen from the other side: inserts become deletes
    pub fn invert(&self) -> DiffModel {
        let spans = self
            .spans
            .iter()
            .map(|span| DiffSpan {
                tag: match span.tag {
                    SpanTag::Equal => SpanTag::Equal,
                    SpanTag::Insert => SpanTag::Delete,
                    SpanTag::Delete => SpanTag::Insert,
                },
                text: span.text.clone(),
            })
            .collect();
        DiffModel { spans }
    }

    /// Reassemble the old string (equal + deleted spans)
    pub fn old_text(&self) -> String {
        self.collect_text(SpanTag::Delete)
    }

    /// Reassemble the new string (equal + inserted spans)
    pub fn new_text(&self) -> String {
        self.collect_text(SpanTag::Insert)
    }

    fn collect_text(&self, side: SpanTag) -> String {
        self.spans
            .iter()
            .filter(|s| s.tag == SpanTag::Equal || s.tag == side)
            .map(|s| s.text.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Computes fine-grained diffs between two canonical cell values.
///
/// Only called for cells whose values differ, and only when character-level
/// detail was requested.
pub trait CharDiffAdapter: Send + Sync {
    fn compute_char_diff(&self, old: &str, new: &str, ignore_whitespace: bool) -> DiffModel;
}

/// Report whitespace-only edits as unchanged text.
///
/// Inserts and deletes are treated alike, so suppressing the forward diff and
/// inverting it gives the same model as suppressing the reverse diff.
pub fn suppress_whitespace_edits(model: DiffModel) -> DiffModel {
    let mut out = DiffModel::default();
    for span in model.spans {
        let whitespace_only = span.text.chars().all(char::is_whitespace);
        match span.tag {
            SpanTag::Insert | SpanTag::Delete if whitespace_only => out.push(SpanTag::Equal, &span.text),
            tag => out.push(tag, &span.text),
        }
    }
    out
}

/// Character diff using the Myers algorithm from `similar`
#[cfg(feature = "char-diff")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarCharDiff;

#[cfg(feature = "char-diff")]
impl CharDiffAdapter for SimilarCharDiff {
    fn compute_char_diff(&self, old: &str, new: &str, ignore_whitespace: bool) -> DiffModel {
        use similar::{ChangeTag, TextDiff};

        let diff = TextDiff::configure()
            .algorithm(similar::Algorithm::Myers)
            .diff_chars(old, new);

        let mut model = DiffModel::default();
        for change in diff.iter_all_changes() {
            let tag = match change.tag() {
                ChangeTag::Equal => SpanTag::Equal,
                ChangeTag::Insert => SpanTag::Insert,
                ChangeTag::Delete => SpanTag::Delete,
            };
            model.push(tag, change.value());
        }

        if ignore_whitespace {
            suppress_whitespace_edits(model)
        } else {
            model
        }
    }
}
