//! Survivor selection over a population sorted best first.
//!
//! Both schemes return a row order for [`Population::reorder`]: entry `i`
//! names the row that becomes row `i` of the next generation. Because the
//! rows are already ranked, a lower index always means a better agent.
//!
//! [`Population::reorder`]: crate::population::Population::reorder

use rand::seq::index;
use rand::Rng;

use crate::error::ConfigError;

/// Survivor selection scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Keep the best `fraction · T` rows and refill the rest by drawing
    /// uniformly from the survivors.
    #[default]
    Random,
    /// Replace every row by the winner of a tournament over a random
    /// sub-population of `fraction · T` rows.
    Tournament,
}

impl Selection {
    pub(crate) fn from_code(code: usize) -> Result<Self, ConfigError> {
        match code {
            0 => Ok(Selection::Random),
            1 => Ok(Selection::Tournament),
            other => Err(ConfigError::InvalidParameter {
                name: "selection",
                reason: format!("expected 0 (random) or 1 (tournament), got {other}"),
            }),
        }
    }

    /// Next-generation row order for `rows` ranked rows.
    pub fn order<R: Rng>(&self, rows: usize, fraction: f64, rng: &mut R) -> Vec<usize> {
        let size = ((fraction * rows as f64).round() as usize).clamp(1, rows.max(1));
        match self {
            Selection::Random => survivors(rows, size, rng),
            Selection::Tournament => tournaments(rows, size, rng),
        }
    }
}

fn survivors<R: Rng>(rows: usize, keep: usize, rng: &mut R) -> Vec<usize> {
    (0..rows)
        .map(|row| if row < keep { row } else { rng.random_range(0..keep) })
        .collect()
}

fn tournaments<R: Rng>(rows: usize, size: usize, rng: &mut R) -> Vec<usize> {
    (0..rows)
        .map(|_| {
            index::sample(rng, rows, size)
                .into_iter()
                .min()
                .unwrap_or(0)
        })
        .collect()
}
