use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::dao::models::SelectionEntity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSelectionDocument {
    selected_name: String,
    guessed_name: String,
    gift: String,
    created_at: DateTime,
}

impl From<SelectionEntity> for MongoSelectionDocument {
    fn from(value: SelectionEntity) -> Self {
        Self {
            selected_name: value.selected_name,
            guessed_name: value.guessed_name,
            gift: value.gift,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl From<MongoSelectionDocument> for SelectionEntity {
    fn from(value: MongoSelectionDocument) -> Self {
        Self {
            selected_name: value.selected_name,
            guessed_name: value.guessed_name,
            gift: value.gift,
            created_at: value.created_at.to_system_time(),
        }
    }
}
