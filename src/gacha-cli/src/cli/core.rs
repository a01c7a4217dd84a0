//! Core CLI definitions

use clap::{ArgAction, Args, Parser, Subcommand};
use gacha::RarityTier;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gacha")]
#[command(about = "Draw collectible characters and track your collection", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Catalog file (.json, .yaml or .yml); defaults to the built-in catalog
    #[arg(long, global = true, env = "GACHA_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Collection store (.json for a JSON file, anything else for SQLite)
    #[arg(long, global = true, env = "GACHA_STORE")]
    pub store: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Draw one or more items
    #[command(visible_alias = "d")]
    Draw {
        /// Number of draws
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,

        /// Seed for a reproducible draw sequence
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show collection progress by tier
    #[command(visible_alias = "c")]
    Collection {
        /// Only show this tier (common, uncommon, rare, epic, legendary)
        #[arg(short, long)]
        tier: Option<RarityTier>,
    },

    /// List catalog items with their tier and draw odds
    #[command(visible_alias = "l")]
    Catalog {
        /// Show names of items not drawn yet
        #[arg(long)]
        reveal: bool,
    },

    /// Clear all collection progress
    Reset {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Save --catalog and --store as defaults
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
