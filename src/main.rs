use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use tasklist::{
    Backend, Config, FileStorage, Filter, Priority, SqliteStorage, Stats, Storage, Task, TaskStore, TaskView,
    ValidationError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "tasklist - A local task list with priority sorting and filtering")]
#[command(version)]
struct Cli {
    /// Path to the store directory (default: the platform data directory)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task text
        #[arg(required = true)]
        text: Vec<String>,

        /// high, medium or low
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Mark a task done, or not done again
    Toggle { id: i64 },

    /// Delete a task
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List tasks
    List {
        /// all, pending or completed
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show task counts
    Stats,
}

fn main() {
    // Setup tracing (stderr)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        if let Some(invalid) = e.downcast_ref::<ValidationError>() {
            eprintln!("{} {}", "error:".red().bold(), invalid);
            process::exit(1);
        }
        eprintln!("Error: {:#}", e);
        process::exit(2);
    }
}

fn run(cli: Cli) -> Result<()> {
    let dir = cli.store_path.unwrap_or_else(default_store_dir);
    let config = Config::load(&dir)?;
    let settings = config.store_settings();

    match config.backend {
        Backend::File => {
            let storage = FileStorage::open(&dir)?;
            execute(TaskStore::with_settings(storage, settings), &config, cli.command, cli.json)
        }
        Backend::Sqlite => {
            let storage = SqliteStorage::open(&dir)?;
            execute(TaskStore::with_settings(storage, settings), &config, cli.command, cli.json)
        }
    }
}

fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("tasklist"))
        .unwrap_or_else(|| PathBuf::from(".tasklist"))
}

fn execute<S: Storage>(mut store: TaskStore<S>, config: &Config, command: Commands, json: bool) -> Result<()> {
    store.set_filter(config.default_filter);

    match command {
        Commands::Add { text, priority } => {
            let priority = priority.as_deref().map(str::parse::<Priority>).transpose()?;
            store.add_task(&text.join(" "), priority)?;
        }
        Commands::Toggle { id } => {
            if store.get(id).is_none() {
                eprintln!("No task with id {}", id);
            }
            store.toggle_task(id);
        }
        Commands::Delete { id, yes } => {
            let text = store.get(id).map(|t| t.text.clone());
            match text {
                None => eprintln!("No task with id {}", id),
                Some(text) => {
                    if !yes && !confirm(&format!("Delete \"{}\"?", text))? {
                        println!("Cancelled");
                        return Ok(());
                    }
                    store.delete_task(id);
                }
            }
        }
        Commands::List { filter } => {
            if let Some(filter) = filter {
                store.set_filter(filter.parse::<Filter>()?);
            }
        }
        Commands::Stats => return print_stats(&store.compute_stats(), json),
    }

    print_view(&store.render(), json)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer).context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_view(view: &TaskView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    if view.tasks.is_empty() {
        println!("{}", "No tasks".dimmed());
    }
    for task in &view.tasks {
        println!("{}", format_task(task));
    }

    println!();
    println!("{}  (filter: {})", format_stats(&view.stats), view.filter);
    Ok(())
}

fn print_stats(stats: &Stats, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
    } else {
        println!("{}", format_stats(stats));
    }
    Ok(())
}

fn format_task(task: &Task) -> String {
    let check = if task.completed { "[x]".green() } else { "[ ]".normal() };
    let priority = match task.priority {
        Priority::High => "high  ".red().bold(),
        Priority::Medium => "medium".yellow(),
        Priority::Low => "low   ".blue(),
    };
    let text = if task.completed {
        task.text.strikethrough().dimmed()
    } else {
        task.text.normal()
    };
    let created = task.created_at.format("%Y-%m-%d %H:%M").to_string();

    format!("{} {} {} {}  {}", check, task.id.to_string().dimmed(), priority, text, created.dimmed())
}

fn format_stats(stats: &Stats) -> String {
    format!(
        "{} total, {} completed, {} pending",
        stats.total, stats.completed, stats.pending
    )
}
