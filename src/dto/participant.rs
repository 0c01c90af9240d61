use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{AppConfig, Participant};

/// Public projection of a roster entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantDto {
    /// Stable participant identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Portrait asset reference the frontend can resolve.
    pub portrait: String,
}

impl From<&Participant> for ParticipantDto {
    fn from(value: &Participant) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            portrait: value.portrait.clone(),
        }
    }
}

/// Roster payload the frontend needs to bootstrap the form.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterResponse {
    /// Participants in their configured order.
    pub participants: Vec<ParticipantDto>,
    /// Gift labels offered on the gift step, excluding the custom option.
    pub gift_options: Vec<String>,
}

impl From<&AppConfig> for RosterResponse {
    fn from(config: &AppConfig) -> Self {
        Self {
            participants: config.participants().map(Into::into).collect(),
            gift_options: config.gift_options().to_vec(),
        }
    }
}
