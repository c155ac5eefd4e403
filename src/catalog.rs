// --- Static achievement and level tables ---

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstTask,
    #[serde(rename = "streak_3")]
    Streak3,
    #[serde(rename = "task_10")]
    Task10,
    NightOwl,
    SpeedDemon,
    Collector,
    Perfectionist,
}

impl AchievementId {
    pub const ALL: [AchievementId; 7] = [
        AchievementId::FirstTask,
        AchievementId::Streak3,
        AchievementId::Task10,
        AchievementId::NightOwl,
        AchievementId::SpeedDemon,
        AchievementId::Collector,
        AchievementId::Perfectionist,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AchievementId::FirstTask => "first_task",
            AchievementId::Streak3 => "streak_3",
            AchievementId::Task10 => "task_10",
            AchievementId::NightOwl => "night_owl",
            AchievementId::SpeedDemon => "speed_demon",
            AchievementId::Collector => "collector",
            AchievementId::Perfectionist => "perfectionist",
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry plus its unlock flag. Persisted as part of the game state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: String,
    pub desc: String,
    pub xp: u64,
    /** Monotonic: false -> true, never back */
    #[serde(default)]
    pub unlocked: bool,
}

impl Achievement {
    fn locked(id: AchievementId, name: &str, desc: &str, xp: u64) -> Self {
        Self {
            id,
            name: name.to_owned(),
            desc: desc.to_owned(),
            xp,
            unlocked: false,
        }
    }
}

/// Full catalog, every entry locked.
pub fn default_achievements() -> Vec<Achievement> {
    use AchievementId::*;
    vec![
        Achievement::locked(FirstTask, "Getting Started", "Add your first task", 10),
        Achievement::locked(Streak3, "On Fire", "Complete 3 tasks in a row", 25),
        Achievement::locked(Task10, "Productive", "Complete 10 tasks", 50),
        Achievement::locked(NightOwl, "Night Owl", "Use the app after 10 PM", 15),
        Achievement::locked(
            SpeedDemon,
            "Speed Demon",
            "Complete a task within 1 minute of creating it",
            30,
        ),
        Achievement::locked(Collector, "Collector", "Have 20 tasks at once", 40),
        Achievement::locked(
            Perfectionist,
            "Perfectionist",
            "Complete all tasks in a single session",
            75,
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub level: u32,
    pub xp_required: u64,
    pub name: &'static str,
    pub reward: &'static str,
}

/// Ordered by `level`; `xp_required` strictly increasing, level 1 at 0 XP.
pub const LEVELS: [Level; 6] = [
    Level { level: 1, xp_required: 0, name: "Beginner", reward: "Welcome to the journey" },
    Level { level: 2, xp_required: 50, name: "Novice", reward: "Immersive Mode Unlocked!" },
    Level { level: 3, xp_required: 150, name: "Apprentice", reward: "Custom themes unlocked" },
    Level { level: 4, xp_required: 300, name: "Adept", reward: "Advanced animations" },
    Level { level: 5, xp_required: 500, name: "Expert", reward: "Particle effects unlocked" },
    Level { level: 6, xp_required: 800, name: "Master", reward: "All features unlocked!" },
];

/// Level at which immersive mode becomes available.
pub const IMMERSIVE_UNLOCK_LEVEL: u32 = 2;

pub fn find_level(level: u32) -> Option<&'static Level> {
    LEVELS.iter().find(|l| l.level == level)
}
