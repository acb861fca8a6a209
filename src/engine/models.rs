//! Core engine data types shared by every game.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type PlayerId = String;

/// Index of a player in turn order.
pub type Seat = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Event {
    pub fn new(event_type: impl Into<String>, player_id: Option<PlayerId>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            player_id,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub winners: Vec<PlayerId>,
    #[serde(default = "default_reason")]
    pub reason: String,
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
}

fn default_reason() -> String {
    "normal".to_string()
}
