//! Command line entry point.
//!
//! Commands:
//! - `verify [script]...` - replay verification scripts against a fresh game
//! - `journal` - show quest progress from the current save
//! - `reset` - delete the current save

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use britannia_quest::{GameConfig, GameState, QuestRegistry, SaveStore, Script, WorldRegistry, run_script};

#[derive(Parser)]
#[command(name = "britannia-quest")]
#[command(about = "Quest and map-transition core for Britannia")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Game configuration file
    #[arg(short, long, default_value = "data/game.toml", global = true)]
    config: PathBuf,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay scripts; with no arguments, every script in the data directory
    Verify {
        scripts: Vec<PathBuf>,

        /// Save the state left by the last script
        #[arg(long)]
        save: bool,
    },
    /// Print the quest journal from the current save
    Journal,
    /// Delete the current save
    Reset,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = GameConfig::load(&cli.config)?;

    match cli.command {
        Commands::Verify { scripts, save } => verify(&config, scripts, save),
        Commands::Journal => journal(&config),
        Commands::Reset => {
            let store = SaveStore::new(&config.save.path);
            if store.clear()? {
                println!("Deleted {}", store.path().display());
            } else {
                println!("No save at {}", store.path().display());
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default = if verbose > 0 {
        "britannia_quest=debug"
    } else {
        "britannia_quest=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_content(config: &GameConfig) -> Result<(WorldRegistry, QuestRegistry)> {
    let world = WorldRegistry::load_from_directory(&config.maps_dir())
        .with_context(|| format!("loading maps from {:?}", config.maps_dir()))?;
    let quests = QuestRegistry::load_from_directory(&config.quests_dir())?;
    Ok((world, quests))
}

// ============================================================================
// Commands
// ============================================================================

fn verify(config: &GameConfig, mut scripts: Vec<PathBuf>, save: bool) -> Result<()> {
    if scripts.is_empty() {
        scripts = script_files(&config.scripts_dir())?;
        if scripts.is_empty() {
            warn!("No scripts found in {:?}", config.scripts_dir());
            return Ok(());
        }
    }

    let (world, quests) = load_content(config)?;

    let mut last = None;
    for path in &scripts {
        let script = Script::load(path)?;
        let mut game = GameState::new(world.clone(), quests.clone(), config)?;
        let report = run_script(&mut game, &script).with_context(|| format!("script {:?} failed", path))?;
        println!(
            "PASS {} ({} steps, {} actions, {} checks)",
            report.name, report.steps, report.actions, report.checks
        );
        last = Some(game);
    }
    info!("{} scripts passed", scripts.len());

    if let Some(game) = last.filter(|_| save) {
        SaveStore::new(&config.save.path).save(&game.snapshot())?;
    }
    Ok(())
}

fn journal(config: &GameConfig) -> Result<()> {
    let (world, quests) = load_content(config)?;
    let store = SaveStore::new(&config.save.path);

    let game = match store.load()? {
        Some(save) => GameState::restore(world, quests, save)?,
        None => {
            warn!("No save at {:?}, showing a new game", store.path());
            GameState::new(world, quests, config)?
        }
    };

    let journal = game.journal();
    if journal.is_empty() {
        println!("No quests started.");
    }
    for entry in &journal.entries {
        let status = if entry.completed { "done" } else { "active" };
        println!("[{}] {} (stage {})", status, entry.title, entry.stage);
        if let Some(text) = &entry.text {
            println!("    {}", text);
        }
    }

    let player = game.player();
    println!(
        "Location: {} {} facing {}, carrying {}/{}",
        player.map(),
        player.position(),
        player.facing().as_str(),
        player.inventory().len(),
        player.inventory().capacity()
    );
    Ok(())
}

fn script_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {:?}", dir))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();
    Ok(paths)
}
