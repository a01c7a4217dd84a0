//! Draw command handler

use crate::session::Engine;
use anyhow::{bail, Context, Result};
use gacha::Reveal;

/// Handle the draw command
pub fn handle(engine: &mut Engine, count: u32) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }

    for _ in 0..count {
        let reveal = engine.draw().context("Failed to record draw")?;
        println!("{}", render_reveal(&reveal));
    }

    let state = engine.collection();
    println!(
        "Total draws: {}  Collected: {}/{}",
        state.total_draws(),
        state.seen_count(),
        engine.catalog().len()
    );

    Ok(())
}

fn render_reveal(reveal: &Reveal<'_>) -> String {
    let item = reveal.item;
    let mut out = format!("{} [{}]", item.name, reveal.tier);
    if reveal.is_new {
        out.push_str("  NEW!");
    }
    if let Some(mood) = &item.mood {
        out.push_str(&format!("\n  Mood: {}", mood));
    }
    if let Some(quote) = &item.quote {
        out.push_str(&format!("\n  \"{}\"", quote));
    }
    out.push('\n');
    out
}
