use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::dao::models::SelectionEntity;

pub const SELECTION_PREFIX: &str = "selection::";

/// Selection document as stored in CouchDB.
///
/// The document id is derived from the selected name, so the store itself
/// rejects a second selection for the same name with a 409 conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchSelectionDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub selection: SelectionBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionBody {
    pub selected_name: String,
    pub guessed_name: String,
    pub gift: String,
    pub created_at: SystemTime,
}

impl From<SelectionEntity> for CouchSelectionDocument {
    fn from(value: SelectionEntity) -> Self {
        Self {
            id: selection_doc_id(&value.selected_name),
            rev: None,
            selection: SelectionBody {
                selected_name: value.selected_name,
                guessed_name: value.guessed_name,
                gift: value.gift,
                created_at: value.created_at,
            },
        }
    }
}

impl From<CouchSelectionDocument> for SelectionEntity {
    fn from(value: CouchSelectionDocument) -> Self {
        Self {
            selected_name: value.selection.selected_name,
            guessed_name: value.selection.guessed_name,
            gift: value.selection.gift,
            created_at: value.selection.created_at,
        }
    }
}

pub fn selection_doc_id(selected_name: &str) -> String {
    format!("{SELECTION_PREFIX}{selected_name}")
}
