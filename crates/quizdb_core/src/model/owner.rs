//! Owner profile data.

use std::collections::BTreeMap;

/// Per-owner interface preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    /// Answer with buttons instead of typed replies.
    pub use_buttons: bool,
    /// Move to the next question automatically.
    pub use_auto_next: bool,
}

/// Owner metadata stored next to, not inside, the owner's documents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OwnerProfile {
    /// Owner id.
    pub id: String,
    /// Command prefix the owner prefers, if any.
    pub preferred_prefix: Option<String>,
    /// Interface preferences.
    pub preferences: Preferences,
    /// Tags declared by the owner, name to glyph.
    pub tags: BTreeMap<String, String>,
}

impl OwnerProfile {
    /// Creates an empty profile.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}
