//! Catalog listing command handler

use crate::session::Engine;
use anyhow::Result;
use gacha::{Catalog, CollectionState, Odds, RarityTier};

/// Handle the catalog command
pub fn handle(engine: &Engine, reveal: bool) -> Result<()> {
    print!("{}", render(engine.catalog(), engine.collection(), reveal));
    Ok(())
}

fn render(catalog: &Catalog, state: &CollectionState, reveal: bool) -> String {
    let mut out = format!(
        "{:<28} {:<10} {:>8} {:>14}\n",
        "Name", "Tier", "Chance", "Odds"
    );
    out.push_str(&"-".repeat(63));
    out.push('\n');

    for item in catalog.items() {
        let name = if reveal || state.is_seen(item.id.as_str()) {
            item.name.as_str()
        } else {
            "???"
        };
        let odds = catalog.odds(item.id.as_str()).unwrap_or(Odds::new(0.0));
        out.push_str(&format!(
            "{:<28} {:<10} {:>8} {:>14}\n",
            name,
            item.tier().name(),
            odds.percent_display(),
            odds.odds_display()
        ));
    }

    out.push('\n');
    for tier in RarityTier::ALL {
        let odds = Odds::new(catalog.tier_probability(tier));
        if odds.probability > 0.0 {
            out.push_str(&format!(
                "{:<10} {:>8} {:>14}\n",
                tier.name(),
                odds.percent_display(),
                odds.odds_display()
            ));
        }
    }

    out
}
