//! Collection progress command handler

use crate::session::Engine;
use anyhow::Result;
use gacha::{Catalog, CollectionState, RarityTier};

/// Handle the collection command
pub fn handle(engine: &Engine, tier: Option<RarityTier>) -> Result<()> {
    print!("{}", render(engine.catalog(), engine.collection(), tier));
    Ok(())
}

/// Per-tier grid, least rare first. Unseen items are masked as `???`.
fn render(catalog: &Catalog, state: &CollectionState, only: Option<RarityTier>) -> String {
    let mut out = format!(
        "Total draws: {}  Collected: {}/{} ({:.0}%)\n",
        state.total_draws(),
        state.seen_count(),
        catalog.len(),
        state.completion(catalog) * 100.0
    );

    for progress in state.tiers_with_progress(catalog) {
        if only.is_some_and(|t| t != progress.tier) {
            continue;
        }

        let marker = if progress.is_complete() { " *" } else { "" };
        out.push_str(&format!(
            "\n{} ({}/{}){}\n",
            progress.tier, progress.seen, progress.total, marker
        ));

        for item in catalog.items_in_tier(progress.tier) {
            let name = if state.is_seen(item.id.as_str()) {
                item.name.as_str()
            } else {
                "???"
            };
            out.push_str(&format!("  {}\n", name));
        }
    }

    out
}
