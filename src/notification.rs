use serde::{Deserialize, Serialize};

/// Unlock / level-up event queued by the engine for display.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    LevelUp {
        message: String,
        reward: String,
    },
    Achievement {
        message: String,
        desc: String,
        xp: u64,
    },
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::LevelUp { message, .. } | Notification::Achievement { message, .. } => {
                message
            }
        }
    }
}
