//! Edit lists: non-overlapping byte-range replacements applied back to front.
//!
//! Every text-splice modifier collects its changes here, then applies them to
//! the original text in one pass so earlier offsets stay valid.

use thiserror::Error;

use crate::syntax::Span;

/// Errors raised by edit-list operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// Edit intersects one already in the list
    #[error("edit {new:?} overlaps existing edit {existing:?}")]
    Overlap { new: Span, existing: Span },

    /// Edit range is inverted, outside the text, or splits a character
    #[error("edit {span:?} is out of bounds for text of length {len}")]
    OutOfBounds { span: Span, len: usize },
}

/// A single replacement of `span` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub replacement: String,
}

impl Edit {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn delete(span: Span) -> Self {
        Self::replace(span, String::new())
    }
}

/// Ordered collection of non-overlapping edits.
#[derive(Debug, Clone, Default)]
pub struct EditList {
    edits: Vec<Edit>,
}

impl EditList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edit, rejecting it if it overlaps one already present.
    pub fn push(&mut self, edit: Edit) -> Result<(), EditError> {
        if edit.span.start > edit.span.end {
            return Err(EditError::OutOfBounds {
                span: edit.span,
                len: 0,
            });
        }
        if let Some(existing) = self.edits.iter().find(|e| e.span.overlaps(&edit.span)) {
            return Err(EditError::Overlap {
                new: edit.span,
                existing: existing.span,
            });
        }
        self.edits.push(edit);
        Ok(())
    }

    /// Add an edit unless it overlaps; returns whether it was accepted.
    pub fn try_push(&mut self, edit: Edit) -> bool {
        self.push(edit).is_ok()
    }

    /// Whether `span` intersects any edit already in the list.
    pub fn overlaps(&self, span: &Span) -> bool {
        self.edits.iter().any(|e| e.span.overlaps(span))
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edit> {
        self.edits.iter()
    }

    /// Re-base every edit by subtracting `offset`, clamping to `len`.
    ///
    /// Used to move edits computed in file coordinates into the coordinates
    /// of an entity's text.
    pub fn rebase(&self, offset: usize, len: usize) -> Result<EditList, EditError> {
        let mut rebased = EditList::new();
        for edit in &self.edits {
            if edit.span.start < offset {
                return Err(EditError::OutOfBounds {
                    span: edit.span,
                    len,
                });
            }
            let start = edit.span.start - offset;
            let end = (edit.span.end - offset).min(len);
            rebased.push(Edit::replace(
                Span::new(start.min(end), end),
                edit.replacement.clone(),
            ))?;
        }
        Ok(rebased)
    }

    /// Apply all edits to `text` in descending start order.
    pub fn apply(&self, text: &str) -> Result<String, EditError> {
        let mut ordered: Vec<&Edit> = self.edits.iter().collect();
        ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start).then(b.span.end.cmp(&a.span.end)));

        let mut result = text.to_string();
        for edit in ordered {
            let span = edit.span;
            if span.end > text.len()
                || !text.is_char_boundary(span.start)
                || !text.is_char_boundary(span.end)
            {
                return Err(EditError::OutOfBounds {
                    span,
                    len: text.len(),
                });
            }
            result.replace_range(span.start..span.end, &edit.replacement);
        }
        Ok(result)
    }
}
