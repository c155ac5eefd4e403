use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};
use questlog::{AchievementId, GameState, LEVELS, Notification, Outcome, TaskUpdate};

#[derive(Parser, Debug)]
#[command(author, version, about = "Task tracker that pays out XP, levels and achievements")]
struct Cli {
    /// Main verb. If omitted, `list` is default action.
    #[command(subcommand)]
    verb: Option<Verb>,

    /// Saved game state.
    #[arg(
        short,
        long,
        global = true,
        env = "QUESTLOG_FILE",
        value_hint = ValueHint::FilePath,
        default_value = "./questlog.json"
    )]
    file: String,

    /// Log filter (overridden by RUST_LOG).
    #[arg(long, global = true, env = "QUESTLOG_LOG", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Verb {
    /// Add a task (+5 XP).
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Complete or reopen a task by id or unique id prefix.
    Toggle { id: String },
    /// Delete a task. Resets the streak.
    Delete { id: String },
    /// Edit a task without earning or losing XP.
    Edit {
        id: String,

        #[arg(short, long)]
        text: Option<String>,

        #[arg(short, long)]
        completed: Option<bool>,
    },
    List,
    /// XP, level, streak and progress to the next level.
    Status,
    Achievements,
    Levels,
    /// Switch between minimal and immersive mode (level 2+).
    Mode,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.verb.unwrap_or(Verb::List) {
        Verb::Add { text } => {
            let outcome = questlog::add_task(&cli.file, &text.join(" "))?;
            match &outcome.value {
                Some(task) => println!("Added {} \"{}\"", short_id(task.id), task.text),
                None => println!("Nothing added: task text is empty"),
            }
            report(&outcome);
        }
        Verb::Toggle { id } => {
            let outcome = questlog::toggle_task(&cli.file, &id)?;
            match outcome.value {
                Some(true) => println!("Completed. Streak: {}", outcome.state.streak),
                Some(false) => println!("Reopened. Streak reset"),
                None => println!("Task {id} not found"),
            }
            report(&outcome);
        }
        Verb::Delete { id } => {
            let outcome = questlog::delete_task(&cli.file, &id)?;
            if outcome.value {
                println!("Deleted. Streak reset");
            } else {
                println!("Task {id} not found. Streak reset");
            }
            report(&outcome);
        }
        Verb::Edit {
            id,
            text,
            completed,
        } => {
            let outcome = questlog::update_task(&cli.file, &id, TaskUpdate { text, completed })?;
            if outcome.value {
                println!("Updated");
            } else {
                println!("Task {id} not found");
            }
            report(&outcome);
        }
        Verb::List => list_tasks(&questlog::load(&cli.file)?),
        Verb::Status => print_status(&questlog::load(&cli.file)?),
        Verb::Achievements => print_achievements(&questlog::load(&cli.file)?),
        Verb::Levels => print_levels(&questlog::load(&cli.file)?),
        Verb::Mode => {
            let outcome = questlog::toggle_mode(&cli.file)?;
            if outcome.state.is_immersive_mode_unlocked {
                println!("Mode: {:?}", outcome.value);
            } else {
                println!("Immersive mode unlocks at level 2");
            }
        }
    }
    Ok(())
}

fn short_id(id: questlog::TaskId) -> String {
    id.to_string()[..8].to_owned()
}

fn report<T>(outcome: &Outcome<T>) {
    if outcome.notifications.len() > 1 {
        if let Some(latest) = &outcome.pending {
            println!("== {}", latest.message());
        }
    }
    for n in &outcome.notifications {
        match n {
            Notification::LevelUp { message, reward } => println!("** {message}: {reward}"),
            Notification::Achievement { message, desc, xp } => {
                println!("** Achievement unlocked: {message} ({desc}) +{xp} XP")
            }
        }
    }
}

fn list_tasks(state: &GameState) {
    println!("ID       | Done | Task");
    println!("---------+------+----------------");
    for t in &state.tasks {
        println!(
            "{:<8} | {:<4} | {}",
            short_id(t.id),
            if t.completed { "x" } else { " " },
            t.text
        );
    }
}

fn print_status(state: &GameState) {
    let engine = questlog::Engine::new(state.clone());
    let current = engine.current_level();
    println!("Level {} {} | {} XP", current.level, current.name, state.xp);
    match engine.next_level() {
        Some(next) => println!(
            "Next: {} at {} XP ({:.0}%)",
            next.name,
            next.xp_required,
            engine.xp_progress()
        ),
        None => println!("Max level reached"),
    }
    println!(
        "Streak {} | Completed {} | Mode {:?}{}",
        state.streak,
        state.completed_tasks,
        state.mode,
        if state.is_immersive_mode_unlocked { "" } else { " (immersive locked)" }
    );
}

fn print_achievements(state: &GameState) {
    for id in AchievementId::ALL {
        if let Some(a) = state.achievement(id) {
            let mark = if a.unlocked { "x" } else { " " };
            println!("[{mark}] {:<16} {:>3} XP  {}", a.name, a.xp, a.desc);
        }
    }
}

fn print_levels(state: &GameState) {
    for l in LEVELS {
        let mark = if l.level == state.level { ">" } else { " " };
        println!("{mark} {} {:<11} {:>4} XP  {}", l.level, l.name, l.xp_required, l.reward);
    }
}
