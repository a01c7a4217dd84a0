//! Reset command handler

use crate::session::Engine;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// Prompt user for confirmation
fn prompt_confirmation(input: &mut impl BufRead, draws: u64) -> Result<bool> {
    print!("Erase {} draws and all collected items? [y/N] ", draws);
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    Ok(line.trim().eq_ignore_ascii_case("y"))
}

/// Handle the reset command
///
/// # Arguments
/// * `yes` - Skip confirmation prompt if true
pub fn handle(engine: &mut Engine, yes: bool) -> Result<()> {
    run(engine, yes, &mut io::stdin().lock())
}

fn run(engine: &mut Engine, yes: bool, input: &mut impl BufRead) -> Result<()> {
    if !yes && !prompt_confirmation(input, engine.collection().total_draws())? {
        println!("Reset cancelled");
        return Ok(());
    }

    engine.reset().context("Failed to reset collection")?;
    println!("Collection reset");
    Ok(())
}
