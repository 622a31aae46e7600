//! Labels attached to one image
//!
//! A [`LabelSet`] keeps AI-generated and user-entered labels in two separate
//! collections. Display and submission order is every AI label in response
//! order followed by every custom label in the order it was added.

use std::fmt;
use std::str::FromStr;

/// Identifier of a label, unique within its origin collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u64);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a label came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelOrigin {
    /// Returned by the service's automatic labeling step
    Ai,
    /// Entered by the user
    Custom,
}

impl fmt::Display for LabelOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ai => f.write_str("ai"),
            Self::Custom => f.write_str("custom"),
        }
    }
}

impl FromStr for LabelOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ai" => Ok(Self::Ai),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown label origin '{other}' (expected 'ai' or 'custom')")),
        }
    }
}

/// A single label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Identifier within the origin collection
    pub id: LabelId,
    /// Label text
    pub text: String,
    /// Origin; never changes after creation
    pub origin: LabelOrigin,
}

/// AI and custom labels currently active for one image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    ai: Vec<Label>,
    custom: Vec<Label>,
    /// Next custom id; only ever increases so removed ids are never reused
    next_custom_id: u64,
}

impl LabelSet {
    /// Create an empty label set
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the AI collection with `texts`, numbering them by position
    pub fn set_ai_labels<I, S>(&mut self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ai = texts
            .into_iter()
            .zip(0u64..)
            .map(|(text, position)| Label {
                id: LabelId(position),
                text: text.into(),
                origin: LabelOrigin::Ai,
            })
            .collect();
    }

    /// AI-origin labels in response order
    pub fn ai(&self) -> &[Label] {
        &self.ai
    }

    /// Custom-origin labels in addition order
    pub fn custom(&self) -> &[Label] {
        &self.custom
    }

    /// Append a custom label
    ///
    /// Returns `None` without changing the set when `text` is blank. Surrounding
    /// whitespace is trimmed from the stored text.
    pub fn add_custom(&mut self, text: &str) -> Option<LabelId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let id = LabelId(self.next_custom_id);
        self.next_custom_id += 1;
        self.custom.push(Label {
            id,
            text: text.to_string(),
            origin: LabelOrigin::Custom,
        });
        Some(id)
    }

    /// Remove the label with `id` from the `origin` collection
    ///
    /// The other collection is never touched, even if it holds the same id.
    pub fn remove(&mut self, id: LabelId, origin: LabelOrigin) -> Option<Label> {
        let collection = match origin {
            LabelOrigin::Ai => &mut self.ai,
            LabelOrigin::Custom => &mut self.custom,
        };
        let index = collection.iter().position(|label| label.id == id)?;
        Some(collection.remove(index))
    }

    /// All labels in display order
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.ai.iter().chain(self.custom.iter())
    }

    /// Label texts in display order, as submitted to the service
    pub fn final_labels(&self) -> Vec<String> {
        self.iter().map(|label| label.text.clone()).collect()
    }

    /// Total number of labels
    pub fn len(&self) -> usize {
        self.ai.len() + self.custom.len()
    }

    /// Whether the set holds no labels
    pub fn is_empty(&self) -> bool {
        self.ai.is_empty() && self.custom.is_empty()
    }
}
