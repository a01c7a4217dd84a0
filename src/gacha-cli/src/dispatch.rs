//! Command dispatch
//!
//! Loads configuration, opens the engine for the commands that need one and
//! hands off to the handlers in [`crate::commands`].

use anyhow::Result;

use crate::cli::{Cli, Commands};
use crate::commands;
use crate::config::Config;
use crate::session;

pub fn dispatch(cli: Cli) -> Result<()> {
    let Cli { global, command } = cli;

    if let Commands::Configure { show } = command {
        return commands::configure::handle(&global, show);
    }

    let config = Config::load()?;
    let seed = match command {
        Commands::Draw { seed, .. } => seed,
        _ => None,
    };
    let mut engine = session::open(&global, &config, seed)?;

    match command {
        Commands::Draw { count, .. } => commands::draw::handle(&mut engine, count),
        Commands::Collection { tier } => commands::collection::handle(&engine, tier),
        Commands::Catalog { reveal } => commands::catalog::handle(&engine, reveal),
        Commands::Reset { yes } => commands::reset::handle(&mut engine, yes),
        Commands::Configure { .. } => Ok(()),
    }
}
