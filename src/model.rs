use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// Self documenting alias
pub type TimeStamp = OffsetDateTime;

pub type TaskId = Uuid;

// --- Task Object ---
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /** Immutable primary key (unique per task) */
    pub id: TaskId,

    /** Display text, trimmed and never empty */
    pub text: String,

    /** Flipped by toggle / edit */
    #[serde(default)]
    pub completed: bool,

    /** Creation time, stored as milliseconds since epoch */
    #[serde(with = "time::serde::timestamp::milliseconds")]
    pub created_at: TimeStamp,
}

/// Partial edit applied by `Engine::update_task`. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

// --- Zero size markers for the "typed-state" builder ---
pub struct MissingText;
pub struct HasText;

// --- Generic Builder struct ---
pub struct TaskBuilder<TextState> {
    /// Mirrors [`Task`]; `build()` decides whether the text is usable.
    text: Option<String>,
    created_at: Option<TimeStamp>,

    // zero-cost phantom marker to record builder state in type system
    _state: std::marker::PhantomData<TextState>,
}

// --- Entry-Point: Task::builder(). impl domain methods on `Task` ---
impl Task {
    /// Creates a new builder chain (*without* text).
    pub fn builder() -> TaskBuilder<MissingText> {
        TaskBuilder {
            text: None,
            created_at: None,
            _state: std::marker::PhantomData,
        }
    }

    /// Flip completion; returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }

    /// Milliseconds elapsed between creation and `now` (negative if the clock went back).
    pub fn age_millis(&self, now: TimeStamp) -> i128 {
        (now - self.created_at).whole_milliseconds()
    }

    /// Apply a partial edit. Text that trims to empty is ignored.
    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(text) = update.text.as_deref().and_then(clean_text) {
            self.text = text;
        }
        if let Some(done) = update.completed {
            self.completed = done;
        }
    }
}

// --- Stage-1: impl: methods available *before* text exists ---
impl TaskBuilder<MissingText> {
    pub fn text<S: Into<String>>(self, t: S) -> TaskBuilder<HasText> {
        TaskBuilder {
            text: Some(t.into()),
            created_at: self.created_at,
            _state: std::marker::PhantomData, // Flips to HasText marker
        }
    }
}

// --- Stage-2: impl: common (setter) methods available in *either* state ---
impl<TextState> TaskBuilder<TextState> {
    /// Creation time; defaults to the current UTC time.
    pub fn created_at(mut self, ts: TimeStamp) -> Self {
        self.created_at = Some(ts);
        self
    }
}

// --- Final-Stage: impl: .build() only once text supplied --
impl TaskBuilder<HasText> {
    /// Consume builder and return a fully-formed [`Task`], or `None` when the
    /// text is blank after trimming.
    pub fn build(self) -> Option<Task> {
        let text = self.text.as_deref().and_then(clean_text)?;
        let created_at = self.created_at.unwrap_or_else(TimeStamp::now_utc);
        Some(Task {
            id: Uuid::new_v4(),
            text,
            completed: false,
            created_at: millis_precision(created_at),
        })
    }
}

fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

// Persisted form only keeps milliseconds; match it in memory.
fn millis_precision(ts: TimeStamp) -> TimeStamp {
    ts.replace_nanosecond(u32::from(ts.millisecond()) * 1_000_000)
        .unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn build_trims_text() {
        let task = Task::builder().text("  buy milk \n").build().unwrap();
        assert_eq!(task.text, "buy milk");
        assert!(!task.completed);
    }

    #[test]
    fn build_rejects_blank_text() {
        assert!(Task::builder().text("").build().is_none());
        assert!(Task::builder().text("   \t").build().is_none());
    }

    #[test]
    fn ids_are_unique() {
        let a = Task::builder().text("a").build().unwrap();
        let b = Task::builder().text("a").build().unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn created_at_is_truncated_to_millis() {
        let ts = datetime!(2024-03-01 12:00:00.123_456_789 UTC);
        let task = Task::builder().text("x").created_at(ts).build().unwrap();
        assert_eq!(task.created_at, datetime!(2024-03-01 12:00:00.123 UTC));
    }

    #[test]
    fn apply_ignores_blank_text() {
        let mut task = Task::builder().text("keep").build().unwrap();
        task.apply(TaskUpdate {
            text: Some("   ".into()),
            completed: Some(true),
        });
        assert_eq!(task.text, "keep");
        assert!(task.completed);
    }

    #[test]
    fn serializes_created_at_as_epoch_millis() {
        let ts = datetime!(1970-01-01 00:00:01.5 UTC);
        let task = Task::builder().text("x").created_at(ts).build().unwrap();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["createdAt"], 1500);
        assert_eq!(json["completed"], false);
    }
}
