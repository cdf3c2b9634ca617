#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UtilityConfig {
    /// Minimum score required to select an option.
    ///
    /// If every option is below this threshold nothing is selected, allowing fallbacks in
    /// higher-level control flow.
    pub min_score: f32,
    /// Re-score the options on every update and switch when another one wins.
    pub reevaluate: bool,
}

impl Default for UtilityConfig {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            reevaluate: true,
        }
    }
}

/// NaN never wins a comparison.
#[inline]
pub fn sanitize_score(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

/// Index and score of the highest-scoring option.
///
/// Ties go to the earliest option. Returns `None` when there are no options or the best one is
/// below `config.min_score`.
pub fn select_best(
    scores: impl IntoIterator<Item = f32>,
    config: &UtilityConfig,
) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, score) in scores.into_iter().enumerate() {
        let score = sanitize_score(score);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((i, score));
        }
    }

    best.filter(|&(_, score)| score >= config.min_score && score > f32::NEG_INFINITY)
}
