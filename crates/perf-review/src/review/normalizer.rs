//! Rescales goal weights so a goal category never exceeds its allocation.
//!
//! Weights are only ever scaled down. A goal set weighted below its cap keeps
//! its raw weights, so the unallocated share is simply unreachable score.

use super::domain::{sanitize_amount, Goal};

/// Anything carrying a raw fractional weight.
pub trait Weighted {
    fn raw_weight(&self) -> f64;
}

impl Weighted for Goal {
    fn raw_weight(&self) -> f64 {
        self.weight
    }
}

impl<T: Weighted + ?Sized> Weighted for &T {
    fn raw_weight(&self) -> f64 {
        (**self).raw_weight()
    }
}

/// A goal paired with the weight it actually contributes.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGoal<'a, G> {
    pub goal: &'a G,
    pub effective_weight: f64,
}

/// Fit the goals' weights within `allocation_cap_pct` percent of the total.
pub fn normalize<G: Weighted>(goals: &[G], allocation_cap_pct: f64) -> Vec<NormalizedGoal<'_, G>> {
    let scale = scale_factor(goals, allocation_cap_pct);
    goals
        .iter()
        .map(|goal| NormalizedGoal {
            goal,
            effective_weight: sanitize_amount(goal.raw_weight()) * scale,
        })
        .collect()
}

/// Multiplier applied to every raw weight in the set.
///
/// An allocation of zero or below yields 0 rather than leaving weights
/// unscaled at 1, so effective weights never exceed the allocation.
pub fn scale_factor<G: Weighted>(goals: &[G], allocation_cap_pct: f64) -> f64 {
    let cap = sanitize_amount(allocation_cap_pct) / 100.0;
    if cap <= 0.0 {
        return 0.0;
    }

    let total_raw = total_weight(goals);
    if total_raw > cap {
        cap / total_raw
    } else {
        1.0
    }
}

pub fn total_weight<G: Weighted>(goals: &[G]) -> f64 {
    goals
        .iter()
        .map(|goal| sanitize_amount(goal.raw_weight()))
        .sum()
}
