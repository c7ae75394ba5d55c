//! warspell command line
//!
//! - `warspell check [FILE]` - load a spell book and list its spells
//! - `warspell skirmish` - run a scripted battle headless and print a
//!   digest of the final state

mod skirmish;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use ws_core::magic::{SpellRegistry, load_spell_book_file};
use ws_data::{load_standard_spells, standard_world};

#[derive(Parser)]
#[command(name = "warspell")]
#[command(about = "Spell-casting engine tools", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a spell book and list its spells
    Check {
        /// Spell book to load instead of the built-in one
        file: Option<PathBuf>,
    },

    /// Run a two-player battle without display
    Skirmish {
        /// Seed of the shared random stream
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Game cycles to run
        #[arg(long, default_value_t = 200)]
        steps: u64,

        /// Run twice and fail if the outcomes differ
        #[arg(long)]
        verify: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Check { file } => check(file),
        Commands::Skirmish {
            seed,
            steps,
            verify,
        } => run_skirmish(seed, steps, verify),
    }
}

fn check(file: Option<PathBuf>) -> Result<()> {
    let mut world = standard_world(64, 64);
    let mut spells = SpellRegistry::new();
    match &file {
        Some(path) => load_spell_book_file(path, &mut world, &mut spells)
            .with_context(|| format!("loading {}", path.display()))?,
        None => load_standard_spells(&mut world, &mut spells).context("loading built-in spell book")?,
    };

    println!("{:>4}  {:<24} {:<9} {:>5} {:>5}  actions", "slot", "ident", "target", "mana", "range");
    for spell in spells.iter() {
        let actions: Vec<&str> = spell.actions.iter().map(|a| a.name()).collect();
        println!(
            "{:>4}  {:<24} {:<9} {:>5} {:>5}  {}",
            spell.slot.index(),
            spell.ident,
            spell.target.to_string(),
            spell.mana_cost,
            spell.range,
            actions.join(", ")
        );
    }

    for unit_type in world.unit_types().iter().filter(|t| !t.can_cast.is_empty()) {
        let known: Vec<&str> = unit_type
            .can_cast
            .iter()
            .filter_map(|slot| spells.get(*slot))
            .map(|s| s.ident.as_str())
            .collect();
        println!("{}: {}", unit_type.ident, known.join(", "));
    }
    Ok(())
}

fn run_skirmish(seed: u64, steps: u64, verify: bool) -> Result<()> {
    let outcome = skirmish::run(seed, steps)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if verify {
        let again = skirmish::run(seed, steps)?;
        if again.digest != outcome.digest {
            bail!(
                "replay diverged: {:016x} vs {:016x}",
                outcome.digest,
                again.digest
            );
        }
        tracing::info!(digest = %format!("{:016x}", outcome.digest), "replay matches");
    }
    Ok(())
}
