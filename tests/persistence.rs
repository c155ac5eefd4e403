use questlog::{
    AchievementId, GameState, ManualClock, Mode, Notification, TaskUpdate, transact_with,
};
use time::{Duration, macros::datetime};

fn noon() -> ManualClock {
    ManualClock::new(datetime!(2024-05-01 12:00 UTC))
}

#[test]
fn missing_file_is_seeded_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questlog.json");

    let state = questlog::load(&path).unwrap();
    assert_eq!(state, GameState::default());
    assert!(path.exists());
}

#[test]
fn first_task_is_saved_with_its_rewards() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questlog.json");
    let clock = noon();

    let outcome = transact_with(&path, &clock, |engine| engine.add_task("buy milk")).unwrap();
    let task = outcome.value.unwrap();
    assert_eq!(task.text, "buy milk");
    assert_eq!(outcome.state.xp, 15);
    assert_eq!(
        outcome.notifications,
        vec![Notification::Achievement {
            message: "Getting Started".into(),
            desc: "Add your first task".into(),
            xp: 10,
        }]
    );

    let reloaded = questlog::load(&path).unwrap();
    assert_eq!(reloaded, outcome.state);
    assert!(reloaded.is_unlocked(AchievementId::FirstTask));
}

#[test]
fn blank_task_leaves_saved_state_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questlog.json");

    let outcome = questlog::add_task(&path, "   ").unwrap();
    assert!(outcome.value.is_none());
    assert!(outcome.notifications.is_empty());
    assert_eq!(questlog::load(&path).unwrap(), GameState::default());
}

#[test]
fn corrupted_file_starts_fresh_and_is_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questlog.json");
    std::fs::write(&path, "{\"xp\": ").unwrap();

    assert_eq!(questlog::load(&path).unwrap(), GameState::default());

    let clock = noon();
    transact_with(&path, &clock, |engine| engine.add_task("recover")).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["xp"], 15);
    assert_eq!(json["tasks"][0]["text"], "recover");
}

#[test]
fn partial_file_fills_defaults_and_levels_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questlog.json");
    std::fs::write(&path, r#"{ "xp": 45, "mode": "minimal" }"#).unwrap();

    let clock = noon();
    let outcome = transact_with(&path, &clock, |engine| engine.add_task("push")).unwrap();
    assert_eq!(outcome.state.level, 2);
    assert_eq!(outcome.state.xp, 60);
    assert!(outcome.state.is_immersive_mode_unlocked);
    assert!(
        outcome
            .notifications
            .iter()
            .any(|n| matches!(n, Notification::LevelUp { .. }))
    );

    let mode = questlog::toggle_mode(&path).unwrap();
    assert_eq!(mode.value, Mode::Immersive);
    assert_eq!(questlog::load(&path).unwrap().mode, Mode::Immersive);
}

#[test]
fn locked_mode_toggle_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questlog.json");

    let outcome = questlog::toggle_mode(&path).unwrap();
    assert_eq!(outcome.value, Mode::Minimal);
    assert_eq!(questlog::load(&path).unwrap().mode, Mode::Minimal);
}

#[test]
fn toggle_edit_and_delete_by_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questlog.json");
    let clock = noon();

    let id = transact_with(&path, &clock, |engine| engine.add_task("write report"))
        .unwrap()
        .value
        .unwrap()
        .id;
    let prefix = &id.to_string()[..8];

    clock.advance(Duration::minutes(2));
    let toggled = transact_with(&path, &clock, |engine| engine.toggle_task(id)).unwrap();
    assert_eq!(toggled.value, Some(true));
    assert_eq!(toggled.state.completed_tasks, 1);
    assert_eq!(toggled.state.streak, 1);

    let edited = questlog::update_task(
        &path,
        prefix,
        TaskUpdate {
            text: Some("write final report".into()),
            completed: None,
        },
    )
    .unwrap();
    assert!(edited.value);
    assert_eq!(edited.state.tasks[0].text, "write final report");
    assert_eq!(edited.state.xp, toggled.state.xp);

    let reopened = questlog::toggle_task(&path, prefix).unwrap();
    assert_eq!(reopened.value, Some(false));
    assert_eq!(reopened.state.streak, 0);
    assert_eq!(reopened.state.xp, toggled.state.xp);

    let deleted = questlog::delete_task(&path, prefix).unwrap();
    assert!(deleted.value);

    let state = questlog::load(&path).unwrap();
    assert!(state.tasks.is_empty());
    assert_eq!(state.completed_tasks, 1);
}

#[test]
fn deleting_unknown_id_still_resets_streak() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questlog.json");
    let clock = noon();

    let a = transact_with(&path, &clock, |engine| {
        let a = engine.add_task("a").unwrap().id;
        engine.add_task("b");
        a
    })
    .unwrap()
    .value;
    let toggled = transact_with(&path, &clock, |engine| engine.toggle_task(a)).unwrap();
    assert_eq!(toggled.state.streak, 1);

    let deleted = questlog::delete_task(&path, "ffffffff").unwrap();
    assert!(!deleted.value);
    assert_eq!(deleted.state.streak, 0);
    assert_eq!(deleted.state.tasks.len(), 2);

    let state = questlog::load(&path).unwrap();
    assert_eq!(state.streak, 0);
    assert_eq!(state.completed_tasks, 1);
}

#[test]
fn unknown_id_on_toggle_and_edit_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questlog.json");
    let clock = noon();
    let before = transact_with(&path, &clock, |engine| engine.add_task("only"))
        .unwrap()
        .state;

    let toggled = questlog::toggle_task(&path, "deadbeef").unwrap();
    assert_eq!(toggled.value, None);
    let edited = questlog::update_task(&path, "deadbeef", TaskUpdate::default()).unwrap();
    assert!(!edited.value);

    assert_eq!(questlog::load(&path).unwrap(), before);
}

#[test]
fn blank_id_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questlog.json");

    let err = questlog::delete_task(&path, "  ").unwrap_err();
    assert!(err.to_string().contains("must not be empty"));
}

#[test]
fn pending_banner_is_handed_back_and_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questlog.json");
    std::fs::write(&path, r#"{ "xp": 40 }"#).unwrap();

    let clock = noon();
    let outcome = transact_with(&path, &clock, |engine| engine.add_task("level me")).unwrap();
    // +5 then first_task +10 crosses 50 during the reward
    assert_eq!(outcome.notifications.len(), 2);
    assert!(matches!(outcome.pending, Some(Notification::LevelUp { .. })));

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json.get("pending").is_none());
    assert!(json.get("pendingNotification").is_none());
}
