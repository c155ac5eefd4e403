pub mod catalog;
pub mod clock;
pub mod engine;
pub mod model;
pub mod notification;
pub mod storage;

use std::path::Path;

use anyhow::{Context, Result, bail};

pub use crate::{
    catalog::{Achievement, AchievementId, LEVELS, Level},
    clock::{Clock, ManualClock, SystemClock},
    engine::{Engine, GameState, Mode},
    model::{Task, TaskId, TaskUpdate},
    notification::Notification,
};

use crate::storage::{load_state, open_or_init, write_snapshot};

/// Result of one persisted operation: the operation's return value, the
/// snapshot that was written, and every notification it emitted.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub state: GameState,
    pub notifications: Vec<Notification>,
    /// The banner left in the engine's pending slot, handed over (and thereby
    /// dismissed) when the operation ends.
    pub pending: Option<Notification>,
}

/// Load the saved state (seeding the file if it does not exist yet).
pub fn load(path: impl AsRef<Path>) -> Result<GameState> {
    let file = open_or_init(path.as_ref())?;
    Ok(load_state(&file))
}

/// Run one engine operation as a single transaction against the state file.
pub fn transact<T, F>(path: impl AsRef<Path>, op: F) -> Result<Outcome<T>>
where
    F: FnOnce(&mut Engine) -> T,
{
    transact_with(path, SystemClock, op)
}

pub fn transact_with<C, T, F>(path: impl AsRef<Path>, clock: C, op: F) -> Result<Outcome<T>>
where
    C: Clock,
    F: FnOnce(&mut Engine<C>) -> T,
{
    let path = path.as_ref();

    let file = open_or_init(path)?;
    let mut engine = Engine::with_clock(load_state(&file), clock);

    let value = op(&mut engine);
    let notifications = engine.take_events();
    let pending = engine.dismiss_notification();
    let state = engine.into_state();

    // The lock goes before the rename so the replace also works where open
    // files cannot be renamed over. A process already blocked on the old
    // inode then reads the previous snapshot; multi-process use is unsupported.
    drop(file);
    write_snapshot(path, &state).context("Writing game state to disk")?;

    Ok(Outcome {
        value,
        state,
        notifications,
        pending,
    })
}

pub fn add_task(path: impl AsRef<Path>, text: &str) -> Result<Outcome<Option<Task>>> {
    transact(path, |engine| engine.add_task(text))
}

/// Toggle completion of the task whose id starts with `id_prefix`.
/// `None` when no task matches.
pub fn toggle_task(path: impl AsRef<Path>, id_prefix: &str) -> Result<Outcome<Option<bool>>> {
    transact_task(path, id_prefix, |engine, id| {
        id.and_then(|id| engine.toggle_task(id))
    })
}

/// Delete the matching task. The streak is reset even when nothing matches;
/// the value says whether a task was removed.
pub fn delete_task(path: impl AsRef<Path>, id_prefix: &str) -> Result<Outcome<bool>> {
    transact_task(path, id_prefix, |engine, id| {
        // No task carries the nil id, so this still takes the streak-reset path.
        engine.delete_task(id.unwrap_or(TaskId::nil()))
    })
}

pub fn update_task(
    path: impl AsRef<Path>,
    id_prefix: &str,
    update: TaskUpdate,
) -> Result<Outcome<bool>> {
    transact_task(path, id_prefix, |engine, id| {
        id.is_some_and(|id| engine.update_task(id, update))
    })
}

// Resolve the id under the same lock as the mutation. Blank or ambiguous
// prefixes abort before the operation runs.
fn transact_task<T, F>(path: impl AsRef<Path>, id_prefix: &str, op: F) -> Result<Outcome<T>>
where
    F: FnOnce(&mut Engine, Option<TaskId>) -> T,
{
    let outcome = transact(path, |engine| {
        find_task_id(engine.state(), id_prefix).map(|id| op(engine, id))
    })?;
    let value = outcome.value?;
    Ok(Outcome {
        value,
        state: outcome.state,
        notifications: outcome.notifications,
        pending: outcome.pending,
    })
}

pub fn toggle_mode(path: impl AsRef<Path>) -> Result<Outcome<Mode>> {
    transact(path, |engine| engine.toggle_mode())
}

/// Find the task for a full id or a unique, case-insensitive prefix of one.
/// `Ok(None)` when nothing matches; an error for blank or ambiguous input.
pub fn find_task_id(state: &GameState, id_prefix: &str) -> Result<Option<TaskId>> {
    let needle = id_prefix.trim().to_ascii_lowercase();
    if needle.is_empty() {
        bail!("task id must not be empty");
    }

    let mut matches = state
        .tasks
        .iter()
        .filter(|t| t.id.to_string().starts_with(&needle));

    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(Some(task.id)),
        (None, _) => Ok(None),
        (Some(_), Some(_)) => bail!("task id {id_prefix} is ambiguous"),
    }
}
