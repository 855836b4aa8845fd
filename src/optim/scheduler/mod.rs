//! Learning rate schedulers
//!
//! Provides learning rate scheduling strategies for training:
//! - `DecayingCosineWarmRestarts` - Cosine warm restarts whose peak and floor decay per restart
//! - `CosineAnnealingWarmRestarts` - Cosine warm restarts without decay
//! - `CosineAnnealingLR` - Single cosine cycle
//! - `StepLR` - Step decay by factor every N epochs
//! - `ConstantLR` - Constant factor for the first N epochs
//! - `LinearLR` - Linear factor interpolation
//! - `LinearWarmup` - Linear warmup wrapped around any other scheduler
//!
//! Every scheduler computes one rate per parameter group and is "primed" on
//! construction: the rates for step 0 are available from `get_last_lr`
//! before the first call to `step`.

mod constant;
mod cosine_annealing;
mod cosine_restarts;
mod decaying_restarts;
mod factory;
mod linear;
mod linear_warmup;
mod step_decay;


pub use constant::ConstantLR;
pub use cosine_annealing::CosineAnnealingLR;
pub use cosine_restarts::CosineAnnealingWarmRestarts;
pub use decaying_restarts::{DecayingCosineWarmRestarts, DecayingRestartsConfig};
pub use factory::{get_lr_scheduler, SchedulerKind, SchedulerOptions};
pub use linear::LinearLR;
pub use linear_warmup::LinearWarmup;
pub use step_decay::StepLR;

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use super::ParamGroups;
use crate::error::{Result, SchedulerError};

/// Learning rate scheduler trait
pub trait LRScheduler: fmt::Debug {
    /// Undecayed starting rate of every parameter group
    fn base_lrs(&self) -> &[f64];

    /// Rates computed by the most recent step, one per parameter group
    fn get_last_lr(&self) -> &[f64];

    /// Index of the last processed step (-1 before priming)
    fn last_epoch(&self) -> i64;

    /// Advance one step and return the new rates
    fn step(&mut self) -> &[f64];

    /// Jump directly to `epoch` without replaying intermediate steps.
    ///
    /// Fractional epochs are accepted; `last_epoch` records the floor.
    fn step_to(&mut self, epoch: f64) -> Result<&[f64]>;

    /// Return to step 0 and recompute the rates
    fn reset(&mut self) -> &[f64];

    /// Write the most recent rates into the optimizer's group slots
    fn apply(&self, groups: &mut dyn ParamGroups) {
        let lrs = self.get_last_lr();
        debug_assert_eq!(
            groups.num_groups(),
            lrs.len(),
            "scheduler tracks {} groups but optimizer has {}",
            lrs.len(),
            groups.num_groups()
        );
        for (index, &lr) in lrs.iter().enumerate() {
            groups.set_group_lr(index, lr);
        }
    }

    /// Advance one step and publish the new rates
    fn step_and_apply(&mut self, groups: &mut dyn ParamGroups) {
        self.step();
        self.apply(groups);
    }
}

impl<S: LRScheduler + ?Sized> LRScheduler for Box<S> {
    fn base_lrs(&self) -> &[f64] {
        (**self).base_lrs()
    }

    fn get_last_lr(&self) -> &[f64] {
        (**self).get_last_lr()
    }

    fn last_epoch(&self) -> i64 {
        (**self).last_epoch()
    }

    fn step(&mut self) -> &[f64] {
        (**self).step()
    }

    fn step_to(&mut self, epoch: f64) -> Result<&[f64]> {
        (**self).step_to(epoch)
    }

    fn reset(&mut self) -> &[f64] {
        (**self).reset()
    }
}

/// Resumable position of a cosine-with-restarts schedule.
///
/// Together with the construction parameters this fully determines the
/// emitted rates; decayed peaks and floors are re-derived from `cycle`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestartState {
    /// Number of restarts so far
    pub cycle: u64,
    /// Length of the cycle in progress
    pub t_i: usize,
    /// Offset within the cycle in progress
    pub t_cur: f64,
    /// Last processed step
    pub last_epoch: i64,
}

impl RestartState {
    /// Check the state against the schedule it is loaded into
    pub(crate) fn validate(&self, t_0: usize, t_mult: usize) -> Result<()> {
        let expected = if t_mult == 1 { Some(t_0) } else { cycle_length(t_0, t_mult, self.cycle) };
        if expected != Some(self.t_i) {
            return Err(SchedulerError::StateMismatch(format!(
                "t_i = {} does not match T_0 * T_mult^cycle for T_0 = {t_0}, T_mult = {t_mult}, \
                 cycle = {}",
                self.t_i, self.cycle
            )));
        }
        if !(self.t_cur >= 0.0 && self.t_cur < self.t_i as f64) {
            return Err(SchedulerError::StateMismatch(format!(
                "t_cur = {} outside [0, {})",
                self.t_cur, self.t_i
            )));
        }
        if self.last_epoch < 0 {
            return Err(SchedulerError::StateMismatch(format!(
                "last_epoch = {} but a primed scheduler has last_epoch >= 0",
                self.last_epoch
            )));
        }
        Ok(())
    }
}

/// Half-cosine interpolation from `peak` at `t_cur = 0` to `floor` at `t_cur = t_i`.
///
/// Formula: lr = floor + (peak - floor) * (1 + cos(pi * t_cur / t_i)) / 2
pub(crate) fn cosine_rate(floor: f64, peak: f64, t_cur: f64, t_i: f64) -> f64 {
    floor + (peak - floor) * (1.0 + (PI * t_cur / t_i).cos()) / 2.0
}

/// `T_0 * T_mult^cycle`, or `None` if it does not fit in `usize`
fn cycle_length(t_0: usize, t_mult: usize, cycle: u64) -> Option<usize> {
    u32::try_from(cycle)
        .ok()
        .and_then(|cycle| t_mult.checked_pow(cycle))
        .and_then(|growth| t_0.checked_mul(growth))
}

/// Locate `epoch` in a schedule whose cycles have lengths `t_0 * t_mult^n`.
///
/// Returns `(cycle, t_i, t_cur)`. The cycle index comes from the closed form
/// `floor(log_{t_mult}(epoch / t_0 * (t_mult - 1) + 1))`, then is corrected
/// against the exact cycle start so that rounding in the logarithm cannot
/// land on the wrong side of a restart boundary.
///
/// Fails if the located cycle is longer than `usize::MAX` steps.
pub(crate) fn locate_cycle(epoch: f64, t_0: usize, t_mult: usize) -> Result<(u64, usize, f64)> {
    let t0 = t_0 as f64;
    if epoch < t0 {
        return Ok((0, t_0, epoch));
    }
    if t_mult == 1 {
        return Ok(((epoch / t0).floor() as u64, t_0, epoch % t0));
    }

    let m = t_mult as f64;
    let cycle_start = |n: i32| t0 * (m.powi(n) - 1.0) / (m - 1.0);

    let mut n = ((epoch / t0 * (m - 1.0) + 1.0).log(m).floor() as i32).max(0);
    while cycle_start(n + 1) <= epoch {
        n += 1;
    }
    while n > 0 && cycle_start(n) > epoch {
        n -= 1;
    }

    let t_cur = epoch - cycle_start(n);
    match cycle_length(t_0, t_mult, n as u64) {
        Some(t_i) if t_cur < t_i as f64 => Ok((n as u64, t_i, t_cur)),
        _ => Err(SchedulerError::invalid(format!(
            "Epoch {epoch} falls in cycle {n}, whose length exceeds {} steps",
            usize::MAX
        ))),
    }
}

/// Reject negative or non-finite seek targets
pub(crate) fn validate_epoch(epoch: f64) -> Result<()> {
    if !epoch.is_finite() || epoch < 0.0 {
        return Err(SchedulerError::invalid(format!(
            "Expected non-negative epoch, but got {epoch}"
        )));
    }
    Ok(())
}

/// Reject resumption points before the "not yet started" marker
pub(crate) fn validate_last_epoch(last_epoch: i64) -> Result<()> {
    if last_epoch < -1 {
        return Err(SchedulerError::invalid(format!(
            "Expected last_epoch >= -1, but got {last_epoch}"
        )));
    }
    Ok(())
}

/// Step that an incremental `step` call addresses next
pub(crate) fn next_epoch(last_epoch: i64) -> f64 {
    (last_epoch + 1).max(0) as f64
}
