// --- Gamification engine: task lifecycle -> XP, levels, streaks, achievements ---

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    catalog::{
        Achievement, AchievementId, IMMERSIVE_UNLOCK_LEVEL, LEVELS, Level, default_achievements,
        find_level,
    },
    clock::{Clock, SystemClock},
    model::{Task, TaskId, TaskUpdate},
    notification::Notification,
};

pub const XP_TASK_CREATED: u64 = 5;
pub const XP_TASK_COMPLETED: u64 = 15;

const SPEED_DEMON_WINDOW_MS: i128 = 60_000;
const STREAK_TARGET: u32 = 3;
const COMPLETED_TARGET: u64 = 10;
const COLLECTOR_TARGET: usize = 20;
const NIGHT_STARTS_AT: u8 = 22;
const NIGHT_ENDS_AT: u8 = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Minimal,
    Immersive,
}

/// The persisted progress record. Missing keys fall back to [`GameState::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub mode: Mode,
    /** Cumulative, never decreases */
    pub xp: u64,
    /** Cached level ordinal, advanced one step per level check */
    pub level: u32,
    pub achievements: Vec<Achievement>,
    /** Insertion order is display order */
    pub tasks: Vec<Task>,
    /** Lifetime completion events, not the live count */
    pub completed_tasks: u64,
    pub streak: u32,
    pub is_immersive_mode_unlocked: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            mode: Mode::Minimal,
            xp: 0,
            level: 1,
            achievements: default_achievements(),
            tasks: Vec::new(),
            completed_tasks: 0,
            streak: 0,
            is_immersive_mode_unlocked: false,
        }
    }
}

impl GameState {
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn achievement(&self, id: AchievementId) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.achievement(id).is_some_and(|a| a.unlocked)
    }
}

/// Sole writer of a [`GameState`]. Every mutating operation runs to completion
/// and leaves the state consistent; callers persist it afterwards.
#[derive(Debug)]
pub struct Engine<C = SystemClock> {
    state: GameState,
    clock: C,
    pending: Option<Notification>,
    events: Vec<Notification>,
}

impl Engine<SystemClock> {
    pub fn new(state: GameState) -> Self {
        Self::with_clock(state, SystemClock)
    }
}

impl<C: Clock> Engine<C> {
    pub fn with_clock(state: GameState, clock: C) -> Self {
        Self {
            state,
            clock,
            pending: None,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Create a task from `text`. Blank text is ignored and returns `None`.
    pub fn add_task(&mut self, text: &str) -> Option<Task> {
        let now = self.clock.now();
        let Some(task) = Task::builder().text(text).created_at(now).build() else {
            debug!("ignoring blank task text");
            return None;
        };

        let before = self.state.tasks.len();
        self.state.tasks.push(task.clone());
        debug!(id = %task.id, "task added");

        self.add_xp(XP_TASK_CREATED);

        if before == 0 {
            self.unlock_achievement(AchievementId::FirstTask);
        }
        if self.state.tasks.len() >= COLLECTOR_TARGET {
            self.unlock_achievement(AchievementId::Collector);
        }
        let hour = now.hour();
        if hour >= NIGHT_STARTS_AT || hour < NIGHT_ENDS_AT {
            self.unlock_achievement(AchievementId::NightOwl);
        }

        Some(task)
    }

    /// Flip completion of one task. Returns the new `completed` value, or
    /// `None` when no task has that id.
    pub fn toggle_task(&mut self, id: TaskId) -> Option<bool> {
        let now = self.clock.now();
        let Some(task) = self.state.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(%id, "toggle of unknown task ignored");
            return None;
        };

        let done = task.toggle();
        if !done {
            self.state.streak = 0;
            debug!(%id, "task reopened, streak reset");
            return Some(false);
        }
        let age_ms = task.age_millis(now);

        self.state.completed_tasks += 1;
        self.state.streak += 1;
        debug!(%id, streak = self.state.streak, "task completed");
        self.add_xp(XP_TASK_COMPLETED);

        if age_ms < SPEED_DEMON_WINDOW_MS {
            self.unlock_achievement(AchievementId::SpeedDemon);
        }
        if self.state.streak >= STREAK_TARGET {
            self.unlock_achievement(AchievementId::Streak3);
        }
        if self.state.completed_tasks >= COMPLETED_TARGET {
            self.unlock_achievement(AchievementId::Task10);
        }
        if !self.state.tasks.is_empty() && self.state.tasks.iter().all(|t| t.completed) {
            self.unlock_achievement(AchievementId::Perfectionist);
        }

        Some(true)
    }

    /// Remove a task. The streak is reset whether or not the id existed.
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let before = self.state.tasks.len();
        self.state.tasks.retain(|t| t.id != id);
        self.state.streak = 0;
        let removed = self.state.tasks.len() != before;
        debug!(%id, removed, "task deleted, streak reset");
        removed
    }

    /// Edit a task in place. No XP, streak or achievement effects.
    pub fn update_task(&mut self, id: TaskId, update: TaskUpdate) -> bool {
        match self.state.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.apply(update);
                true
            }
            None => false,
        }
    }

    /// Unlock once. Returns `false` if already unlocked or not in the state's list.
    pub fn unlock_achievement(&mut self, id: AchievementId) -> bool {
        let Some(achievement) = self
            .state
            .achievements
            .iter_mut()
            .find(|a| a.id == id && !a.unlocked)
        else {
            return false;
        };
        achievement.unlocked = true;
        let reward = achievement.xp;
        let notification = Notification::Achievement {
            message: achievement.name.clone(),
            desc: achievement.desc.clone(),
            xp: reward,
        };
        info!(achievement = %id, xp = reward, "achievement unlocked");

        self.notify(notification);
        self.add_xp(reward);
        true
    }

    pub fn add_xp(&mut self, amount: u64) {
        self.state.xp = self.state.xp.saturating_add(amount);
        self.check_level_up();
    }

    // Advances at most one level per call.
    fn check_level_up(&mut self) -> bool {
        let Some(next) = find_level(self.state.level.saturating_add(1)) else {
            return false;
        };
        if self.state.xp < next.xp_required {
            return false;
        }

        self.state.level = next.level;
        if next.level == IMMERSIVE_UNLOCK_LEVEL {
            self.state.is_immersive_mode_unlocked = true;
        }
        info!(level = next.level, xp = self.state.xp, "level up");
        self.notify(Notification::LevelUp {
            message: format!("Level Up! You're now {}", next.name),
            reward: next.reward.to_owned(),
        });
        true
    }

    /// Flip between minimal and immersive; locked until level 2 is reached.
    pub fn toggle_mode(&mut self) -> Mode {
        if self.state.is_immersive_mode_unlocked {
            self.state.mode = match self.state.mode {
                Mode::Minimal => Mode::Immersive,
                Mode::Immersive => Mode::Minimal,
            };
        }
        self.state.mode
    }

    // Last write wins for the pending slot; the event log keeps everything.
    fn notify(&mut self, notification: Notification) {
        self.events.push(notification.clone());
        self.pending = Some(notification);
    }

    pub fn pending_notification(&self) -> Option<&Notification> {
        self.pending.as_ref()
    }

    pub fn dismiss_notification(&mut self) -> Option<Notification> {
        self.pending.take()
    }

    /// Every notification emitted since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.events)
    }

    pub fn current_level(&self) -> &'static Level {
        find_level(self.state.level).unwrap_or(&LEVELS[0])
    }

    pub fn next_level(&self) -> Option<&'static Level> {
        find_level(self.state.level.saturating_add(1))
    }

    /// Percent of the way from the current level's threshold to the next one.
    /// 100 at max level; may exceed 100 and is not clamped.
    pub fn xp_progress(&self) -> f64 {
        let current = self.current_level();
        let Some(next) = self.next_level() else {
            return 100.0;
        };
        let into_level = self.state.xp as f64 - current.xp_required as f64;
        let window = (next.xp_required - current.xp_required) as f64;
        into_level / window * 100.0
    }
}
