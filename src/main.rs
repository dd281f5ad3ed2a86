mod app;
mod clock;
mod domain;
mod input;
mod notifications;
mod persistence;
mod settings;
mod task_store;
mod ticker;
mod timer;

use anyhow::{anyhow, bail, Context, Result};
use app::FocusApp;
use clap::{Parser, Subcommand};
use clock::{Clock, SystemClock};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use domain::{day_header, format_clock, AppSettings, AVAILABLE_DURATIONS, AVAILABLE_SOUNDS};
use notifications::SystemSound;
use persistence::{ensure_data_dir, init_local_dir, FileStore};
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Instant;
use ticker::Ticker;
use timer::TimerCompletion;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "focusfriend")]
#[command(about = "A small focus timer for up to three concurrent tasks", long_about = None)]
struct Cli {
    /// Log state transitions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .focusfriend directory in the current directory
    Init,
    /// Add a task (at most three can be active)
    Add {
        name: String,
        /// Duration in minutes. Defaults to the configured default.
        #[arg(short, long)]
        minutes: Option<f64>,
    },
    /// List active tasks
    List,
    /// Run a task's countdown in the foreground (space pauses, r restarts, q quits)
    Focus { task: usize },
    /// Mark a task as completed
    Done { task: usize },
    /// Delete a task
    Delete { task: usize },
    /// Reset a task's elapsed time
    Reset { task: usize },
    /// Move a task up in the list
    Up { task: usize },
    /// Move a task down in the list
    Down { task: usize },
    /// Rename a task
    Rename { task: usize, name: String },
    /// Change a task's duration
    Duration { task: usize, minutes: f64 },
    /// Show completed tasks grouped by day
    History,
    /// Delete all completed tasks
    ClearHistory,
    /// Show or change settings
    Settings {
        /// Default duration for new tasks, in minutes
        #[arg(long)]
        duration: Option<f64>,
        /// Alarm sound name (see `sounds`)
        #[arg(long)]
        sound: Option<String>,
        #[arg(long)]
        launch_at_login: Option<bool>,
        #[arg(long)]
        floating_timer: Option<bool>,
    },
    /// List available alarm sounds
    Sounds,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command.unwrap_or(Commands::List) {
        Commands::Init => {
            let dir = init_local_dir()?;
            println!("Initialized focusfriend directory: {}", dir.display());
            Ok(())
        }
        command => run_command(command),
    }
}

fn run_command(command: Commands) -> Result<()> {
    let dir = ensure_data_dir()?;
    tracing::debug!(dir = %dir.display(), "using data directory");

    let clock: Rc<dyn Clock> = Rc::new(SystemClock);
    let mut app = FocusApp::open(Rc::new(FileStore::new(dir)), clock, Box::new(SystemSound));

    match command {
        Commands::Init => unreachable!("init is handled before the data directory is opened"),
        Commands::Add { name, minutes } => {
            let duration = minutes.map(minutes_to_secs).transpose()?;
            if !app.task_store().can_add_task() {
                bail!("Task limit reached ({} active tasks)", task_store::MAX_TASKS);
            }
            let id = app.add_task(&name).context("Task name cannot be empty")?;
            if let Some(duration) = duration {
                app.set_task_duration(id, duration);
            }
            print_tasks(&app);
        }
        Commands::List => print_tasks(&app),
        Commands::Focus { task } => {
            let id = task_id(&app, task)?;
            run_focus(&mut app, id)?;
        }
        Commands::Done { task } => {
            let id = task_id(&app, task)?;
            app.complete_task(id);
            print_tasks(&app);
        }
        Commands::Delete { task } => {
            let id = task_id(&app, task)?;
            app.delete_task(id);
            print_tasks(&app);
        }
        Commands::Reset { task } => {
            let id = task_id(&app, task)?;
            app.reset_task(id);
            print_tasks(&app);
        }
        Commands::Up { task } => {
            let id = task_id(&app, task)?;
            app.move_task_up(id);
            print_tasks(&app);
        }
        Commands::Down { task } => {
            let id = task_id(&app, task)?;
            app.move_task_down(id);
            print_tasks(&app);
        }
        Commands::Rename { task, name } => {
            let id = task_id(&app, task)?;
            if name.trim().is_empty() {
                bail!("Task name cannot be empty");
            }
            app.rename_task(id, &name);
            print_tasks(&app);
        }
        Commands::Duration { task, minutes } => {
            let id = task_id(&app, task)?;
            app.set_task_duration(id, minutes_to_secs(minutes)?);
            print_tasks(&app);
        }
        Commands::History => print_history(&app),
        Commands::ClearHistory => {
            app.clear_history();
            println!("History cleared.");
        }
        Commands::Settings {
            duration,
            sound,
            launch_at_login,
            floating_timer,
        } => {
            let settings = app.settings_mut();
            if let Some(minutes) = duration {
                settings.set_default_duration(minutes_to_secs(minutes)?);
            }
            if let Some(sound) = sound {
                if !AppSettings::is_known_sound(&sound) {
                    bail!("Unknown sound '{}'. Run `focusfriend sounds` to list them.", sound);
                }
                settings.set_alarm_sound(&sound);
            }
            if let Some(enabled) = launch_at_login {
                settings.set_launch_at_login(enabled);
            }
            if let Some(show) = floating_timer {
                settings.set_show_floating_timer(show);
            }
            print_settings(app.settings().settings());
        }
        Commands::Sounds => {
            let current = app.settings().alarm_sound().to_string();
            for sound in AVAILABLE_SOUNDS {
                let marker = if *sound == current { "*" } else { " " };
                println!("{} {}", marker, sound);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("FOCUSFRIEND_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn minutes_to_secs(minutes: f64) -> Result<f64> {
    if !minutes.is_finite() || minutes <= 0.0 {
        bail!("Duration must be a positive number of minutes");
    }
    Ok(minutes * 60.0)
}

/// Resolve a 1-based task number to its id
fn task_id(app: &FocusApp, number: usize) -> Result<Uuid> {
    number
        .checked_sub(1)
        .and_then(|index| app.task_store().tasks().get(index))
        .map(|task| task.id)
        .with_context(|| format!("No task #{}", number))
}

/// Run the countdown in the foreground until it completes or the user quits
///
/// Live time is saved and the timer released on every exit path.
fn run_focus(app: &mut FocusApp, id: Uuid) -> Result<()> {
    app.start_task(id);
    println!("{}", input::FOCUS_KEYS);

    enable_raw_mode().context("enable raw terminal mode")?;
    let result = focus_loop(app, id);
    let restored = disable_raw_mode();
    app.suspend();
    restored?;

    match result? {
        Some(done) => {
            let name = app
                .task_store()
                .completed_tasks()
                .first()
                .filter(|task| task.id == done.task_id)
                .map(|task| task.name.clone())
                .unwrap_or_default();
            println!("\r✓ {} completed ({})          ", name, format_clock(done.elapsed));
        }
        None => {
            let elapsed = app
                .task_store()
                .task(id)
                .map(|task| task.formatted_elapsed())
                .unwrap_or_default();
            println!("\rStopped at {} elapsed                    ", elapsed);
        }
    }
    Ok(())
}

/// Tick and poll keys; `None` means the user quit before completion
fn focus_loop(app: &mut FocusApp, id: Uuid) -> Result<Option<TimerCompletion>> {
    let mut ticker = Ticker::default();
    let mut stdout = io::stdout();

    loop {
        if event::poll(ticker.interval())? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && input::handle_focus_key(app, id, key) {
                    return Ok(None);
                }
            }
        }

        if let Some(done) = app.tick() {
            return Ok(Some(done));
        }

        if ticker.checkpoint_due(Instant::now()) {
            app.checkpoint();
        }

        let snapshot = app.snapshot();
        let timer = &snapshot.timer;
        let paused = if app.timer().is_running() { "" } else { " (paused)" };
        write!(
            stdout,
            "\r{}  {} elapsed, {} left  [{:>3.0}%]{}          ",
            snapshot.title,
            timer.formatted_elapsed(),
            timer.formatted_remaining(),
            timer.progress * 100.0,
            paused
        )?;
        stdout.flush()?;
    }
}

fn print_tasks(app: &FocusApp) {
    let snapshot = app.snapshot();
    if snapshot.tasks.is_empty() {
        println!("No active tasks. Add one with `focusfriend add <name>`.");
        return;
    }

    for (index, row) in snapshot.tasks.iter().enumerate() {
        let marker = match (row.is_active, row.is_running) {
            (true, true) => ">",
            (true, false) => "=",
            _ => " ",
        };
        println!(
            "{} {}. {:<30} {} / {}  ({} left, {:.0}%)",
            marker,
            index + 1,
            row.name,
            format_clock(row.elapsed),
            format_clock(row.duration),
            format_clock(row.remaining),
            row.progress * 100.0
        );
    }
    if !snapshot.can_add_task {
        println!("(task limit reached)");
    }
    println!();
    println!("Focused today: {}", format_clock(snapshot.total_time_today));
}

fn print_history(app: &FocusApp) {
    let groups = app.history();
    if groups.is_empty() {
        println!("No completed tasks yet.");
        return;
    }

    let today = chrono::Local::now().date_naive();
    for group in groups {
        println!("{}", day_header(group.date, today));
        for task in &group.tasks {
            let finished = task
                .completed_at
                .map(|at| at.format("%H:%M").to_string())
                .unwrap_or_default();
            println!(
                "  {}  {:<30} {} / {}",
                finished,
                task.name,
                task.formatted_elapsed(),
                task.formatted_duration()
            );
        }
    }
}

fn print_settings(settings: &AppSettings) {
    let duration = AppSettings::duration_label(settings.default_duration)
        .map(str::to_string)
        .unwrap_or_else(|| format_clock(settings.default_duration));
    println!("Default duration:   {}", duration);
    println!("Alarm sound:        {}", settings.alarm_sound);
    println!("Launch at login:    {}", settings.launch_at_login);
    println!("Floating timer:     {}", settings.show_floating_timer);
    println!();
    let presets: Vec<&str> = AVAILABLE_DURATIONS.iter().map(|(label, _)| *label).collect();
    println!("Duration presets: {}", presets.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_to_secs() {
        assert_eq!(minutes_to_secs(25.0).unwrap(), 1500.0);
        assert_eq!(minutes_to_secs(0.5).unwrap(), 30.0);

        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(minutes_to_secs(bad).is_err(), "accepted {}", bad);
        }
    }
}
