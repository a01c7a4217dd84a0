//! Inverse-rarity weighted selection
//!
//! Each item's weight is `1 - rarity_score`, so rarer items are drawn less
//! often. An item with a score of exactly 1 has weight 0 and can never be
//! drawn.

use crate::catalog::{CatalogError, CatalogItem};
use crate::rng::{clamp_unit, RandomSource};

/// Draw weight for a rarity score. Scores are clamped to `[0, 1]`.
pub fn item_weight(rarity_score: f64) -> f64 {
    if rarity_score.is_nan() {
        return 0.0;
    }
    1.0 - rarity_score.clamp(0.0, 1.0)
}

/// Pick an index by cumulative weight.
///
/// `unit` is a uniform value in `[0, 1)`; values outside it are clamped
/// into it, so 1.0 never reaches past the last drawable item. Returns the first index whose
/// running weight sum exceeds `unit * total`. When rounding leaves the walk
/// short of the target, the last index is returned. `None` only for an
/// empty slice.
pub fn select_index(weights: &[f64], total: f64, unit: f64) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let target = clamp_unit(unit) * total;
    let mut cumulative = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if target < cumulative {
            return Some(i);
        }
    }

    Some(weights.len() - 1)
}

/// Draw one item from an unvalidated item slice.
///
/// Fails when the slice is empty or its total weight is not positive, since
/// no item could legally be selected.
pub fn draw<'a, R: RandomSource + ?Sized>(
    items: &'a [CatalogItem],
    rng: &mut R,
) -> Result<&'a CatalogItem, CatalogError> {
    if items.is_empty() {
        return Err(CatalogError::Empty);
    }

    let weights: Vec<f64> = items.iter().map(CatalogItem::weight).collect();
    let total: f64 = weights.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return Err(CatalogError::NoDrawableItems);
    }

    let index = select_index(&weights, total, rng.next_unit()).ok_or(CatalogError::Empty)?;
    Ok(&items[index])
}

/// Single-draw odds for an item or tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Odds {
    /// Probability of the outcome on one draw (0.0-1.0)
    pub probability: f64,
}

impl Odds {
    pub fn new(probability: f64) -> Self {
        Self { probability }
    }

    /// Expected number of draws per occurrence, rounded. 0 when impossible.
    pub fn one_in(&self) -> u64 {
        if self.probability > 0.0 {
            (1.0 / self.probability).round() as u64
        } else {
            0
        }
    }

    /// Human-readable odds string
    pub fn odds_display(&self) -> String {
        match self.one_in() {
            0 => "never".to_string(),
            1 => "~100%".to_string(),
            n => format!("~1 in {}", format_number(n)),
        }
    }

    /// Percentage string with one decimal place
    pub fn percent_display(&self) -> String {
        format!("{:.1}%", self.probability * 100.0)
    }
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
