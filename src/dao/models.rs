use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Persisted record of one participant's completed workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionEntity {
    /// Roster name the participant picked; unique across all selections.
    pub selected_name: String,
    /// Roster name the participant guessed as the drawer.
    pub guessed_name: String,
    /// Effective gift value (custom text already resolved).
    pub gift: String,
    /// When the selection was drafted.
    pub created_at: SystemTime,
}

impl SelectionEntity {
    /// Build a selection stamped with the current time.
    pub fn new(
        selected_name: impl Into<String>,
        guessed_name: impl Into<String>,
        gift: impl Into<String>,
    ) -> Self {
        Self {
            selected_name: selected_name.into(),
            guessed_name: guessed_name.into(),
            gift: gift.into(),
            created_at: SystemTime::now(),
        }
    }
}
