//! Habitual CLI
//!
//! Command-line front end over a file-backed store:
//! - Add, complete, delete and list habits
//! - Weekly completion chart
//! - Export/import backups
//! - Quote of the day
//! - Theme and accent preferences
//! - Prime and inspect the offline app-shell bundle

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use habitual::cache::{
    AssetManifest, CacheController, DetachedHost, DiskCacheStorage, HttpNetwork, Origin, Request,
};
use habitual::config::{generate_default_config, Config, LoggingConfig};
use habitual::habits::{
    longest_streak, AlwaysConfirm, Celebration, CelebrationError, Clock, SystemClock,
};
use habitual::prefs::{AccentColor, Preferences, Theme};
use habitual::quote::{HttpQuoteSource, QuoteFetcher, QuoteOfTheDay, QuoteRefresher};
use habitual::storage::FileStore;
use habitual::view::EMPTY_MESSAGE;
use habitual::HabitTracker;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "habitual")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first habit tracker")]
#[command(long_about = "Habitual tracks daily habits, streaks and a weekly chart.\nData lives in a single local JSON store.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir, then ./habitual.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a habit
    Add {
        /// Habit name
        name: Vec<String>,
    },

    /// Toggle today's completion of a habit
    Done {
        /// Habit id or name
        habit: String,
    },

    /// Delete a habit
    Delete {
        /// Habit id or name
        habit: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete every habit and its history
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List habits with streaks
    List,

    /// Completions over the last seven days
    Week,

    /// Export a backup
    Export {
        /// Output file (default: habit-tracker-backup-YYYY-MM-DD.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all habits with a backup
    Import {
        /// Backup file
        path: PathBuf,
    },

    /// Show the quote of the day
    Quote {
        /// Keep running and print the new quote when the day changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Show or set the theme (light, dark)
    Theme { value: Option<String> },

    /// Show or set the accent color (#rgb or #rrggbb)
    Accent { value: Option<String> },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Offline app-shell bundle
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Fetch every manifest asset into the current generation
    Install,
    /// Delete stale generations
    Activate,
    /// Answer a request the way the background worker would
    Fetch {
        /// Absolute URL or path under the configured origin
        url: String,
        /// Treat as a page navigation
        #[arg(short, long)]
        navigate: bool,
        /// Write the response body here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show lifecycle state and stored generations
    Status,
}

struct TerminalCelebration;

impl Celebration for TerminalCelebration {
    fn celebrate(&self) -> Result<(), CelebrationError> {
        let mut out = std::io::stdout();
        writeln!(out, "🎉 Every habit done today!").map_err(|e| CelebrationError(e.to_string()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.to_string_lossy().to_string();
    }

    init_logging(&config.logging);

    let json = cli.format == "json";

    match cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }

        Commands::Cache { action } => run_cache(&config, action, json).await?,

        Commands::Quote { watch } => {
            let store = open_store(&config)?;
            run_quote(&config, store, watch).await?;
        }

        command => {
            let store = open_store(&config)?;
            let mut tracker = HabitTracker::open(store, SystemClock)
                .context("Failed to open habit store")?;
            tracker.repo_mut().set_celebration(TerminalCelebration);
            run_habit_command(&mut tracker, command, json)?;
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("habitual={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn open_store(config: &Config) -> anyhow::Result<FileStore> {
    FileStore::open(&config.storage.data_dir)
        .with_context(|| format!("Failed to open store in {}", config.storage.data_dir))
}

fn confirm_on_terminal(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if std::io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn run_habit_command(
    tracker: &mut HabitTracker<FileStore, SystemClock>,
    command: Commands,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Add { name } => {
            let name = name.join(" ");
            if let Some(id) = tracker.repo_mut().add(&name)? {
                println!("Added {} ({})", name.trim(), id);
            }
        }

        Commands::Done { habit } => {
            let Some(id) = tracker.repo().find(&habit).map(|h| h.id.clone()) else {
                bail!("No habit matching '{}'", habit);
            };
            if let Some(done) = tracker.repo_mut().toggle_done(&id)? {
                if let Some(h) = tracker.repo().get(&id) {
                    if done {
                        println!("Done: {} (streak {})", h.name, h.streak);
                    } else {
                        println!("Undone: {} (streak {})", h.name, h.streak);
                    }
                }
            }
        }

        Commands::Delete { habit, yes } => {
            let Some(id) = tracker.repo().find(&habit).map(|h| h.id.clone()) else {
                bail!("No habit matching '{}'", habit);
            };
            let deleted = if yes {
                tracker.repo_mut().delete(&id, &AlwaysConfirm)?
            } else {
                tracker.repo_mut().delete(&id, &confirm_on_terminal)?
            };
            if deleted {
                println!("Deleted {}", habit);
            } else {
                println!("Kept {}", habit);
            }
        }

        Commands::Clear { yes } => {
            let cleared = if yes {
                tracker.repo_mut().clear_all(&AlwaysConfirm)?
            } else {
                tracker.repo_mut().clear_all(&confirm_on_terminal)?
            };
            if cleared {
                println!("Cleared all habits");
            } else {
                println!("Nothing cleared");
            }
        }

        Commands::List => {
            let frame = tracker.render();

            if json {
                println!("{}", serde_json::to_string_pretty(&frame.rows)?);
            } else if let Some(message) = frame.empty_message {
                println!("{}", message);
            } else {
                println!(
                    "{:<24} {:>6} {:>6} {:>6}  {:<6} {}",
                    "Name", "Streak", "Best", "Total", "Today", "ID"
                );
                println!("{}", "-".repeat(90));

                for (row, habit) in frame.rows.iter().zip(tracker.repo().habits()) {
                    println!(
                        "{:<24} {:>6} {:>6} {:>6}  {:<6} {}",
                        row.name,
                        row.streak,
                        longest_streak(&habit.history),
                        row.total,
                        if row.done { "✓" } else { "·" },
                        row.id
                    );
                }
            }
        }

        Commands::Week => {
            let frame = tracker.render();

            if json {
                println!("{}", serde_json::to_string_pretty(&frame.week)?);
            } else if frame.rows.is_empty() {
                println!("{}", EMPTY_MESSAGE);
            } else {
                let width = 30usize;
                let total = frame.rows.len().max(1);
                for day in frame.week.days() {
                    let bar = "█".repeat(day.count * width / total);
                    println!("{}  {:<30} {}", day.label, bar, day.count);
                }
            }
        }

        Commands::Export { output } => {
            let snapshot = tracker.repo().export_snapshot();
            let path = output.unwrap_or_else(|| PathBuf::from(snapshot.file_name()));
            std::fs::write(&path, snapshot.to_json()?)
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("Exported {} habits to {:?}", snapshot.habits.len(), path);
        }

        Commands::Import { path } => {
            let document = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let count = tracker.repo_mut().import_snapshot(&document)?;
            println!("Imported {} habits", count);
        }

        Commands::Theme { value } => {
            if let Some(value) = value {
                let theme: Theme = value.parse()?;
                tracker.set_theme(theme)?;
            }
            let theme = tracker.prefs().theme();
            println!("{} ({})", theme, theme.stylesheet_href());
        }

        Commands::Accent { value } => {
            if let Some(value) = value {
                tracker.set_accent(AccentColor::parse(&value)?)?;
            }
            println!("{}", tracker.prefs().accent());
        }

        // Handled in main before a session is opened
        Commands::Config { .. } | Commands::Cache { .. } | Commands::Quote { .. } => {}
    }

    Ok(())
}

fn print_quote(quote: &QuoteOfTheDay) {
    println!("\"{}\"", quote.quote.text);
    if !quote.quote.author.is_empty() {
        println!("  {}", quote.quote.author);
    }
}

async fn run_quote(config: &Config, store: FileStore, watch: bool) -> anyhow::Result<()> {
    let source = HttpQuoteSource::new(&config.quote.url, config.quote.timeout())?;
    let fetcher = QuoteFetcher::new(source);
    let prefs = Preferences::new(store);

    if !watch {
        let quote = fetcher.quote_of_the_day(&prefs, SystemClock.today()).await;
        print_quote(&quote);
        return Ok(());
    }

    let refresher = Arc::new(
        QuoteRefresher::new(fetcher, prefs, SystemClock)
            .with_interval(config.quote.refresh_interval()),
    );
    let mut updates = refresher.subscribe();
    let handle = refresher.clone().start().await;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = updates.borrow_and_update().clone();
                if let Some(quote) = current {
                    print_quote(&quote);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    refresher.stop().await;
    handle.abort();
    Ok(())
}

async fn run_cache(config: &Config, action: CacheCommand, json: bool) -> anyhow::Result<()> {
    let origin = Origin::parse(&config.cache.origin)?;
    let manifest = AssetManifest::default().with_generation(config.cache.generation.clone());
    let storage = DiskCacheStorage::open(config.cache_dir())
        .await
        .with_context(|| format!("Failed to open cache dir {:?}", config.cache_dir()))?;
    let network = HttpNetwork::new(config.cache.timeout())?;
    let controller = CacheController::new(storage, network, DetachedHost, manifest, origin);

    match action {
        CacheCommand::Install => {
            let report = controller.install().await?;
            println!(
                "Installed {} assets into {}",
                report.assets, report.generation
            );
        }

        CacheCommand::Activate => {
            let report = controller.activate().await?;
            if report.removed.is_empty() {
                println!("{} active, nothing to remove", report.generation);
            } else {
                println!(
                    "{} active, removed {}",
                    report.generation,
                    report.removed.join(", ")
                );
            }
        }

        CacheCommand::Fetch {
            url,
            navigate,
            output,
        } => {
            let url = controller.origin().resolve(&url);
            let request = if navigate {
                Request::navigate(url)
            } else {
                Request::get(url)
            };

            let outcome = controller.handle_fetch(&request).await;
            println!(
                "{} {} ({:?}, {} bytes)",
                outcome.response.status,
                outcome.response.status_text,
                outcome.source,
                outcome.response.body.len()
            );
            if let Some(path) = output {
                std::fs::write(&path, &outcome.response.body)?;
                println!("Body written to {:?}", path);
            }
        }

        CacheCommand::Status => {
            let status = controller.status().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else if status.generations.is_empty() {
                println!("No offline bundle yet. Run: habitual cache install");
            } else {
                println!("{:<32} {:>8}  {}", "Generation", "Entries", "Current");
                println!("{}", "-".repeat(52));
                for generation in status.generations {
                    println!(
                        "{:<32} {:>8}  {}",
                        generation.name,
                        generation.entries,
                        if generation.current { "yes" } else { "" }
                    );
                }
            }
        }
    }

    Ok(())
}
