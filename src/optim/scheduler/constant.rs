//! Constant factor learning rate scheduler

use super::{next_epoch, validate_epoch, validate_last_epoch, LRScheduler};
use crate::error::{Result, SchedulerError};

/// Constant Factor Learning Rate Scheduler
///
/// Scales every group's rate by `factor` until `total_iters` steps have
/// passed, then uses the base rate.
///
/// Formula: lr_t = base_lr * (factor if t < total_iters else 1)
#[derive(Debug, Clone)]
pub struct ConstantLR {
    base_lrs: Vec<f64>,
    factor: f64,
    total_iters: usize,
    last_epoch: i64,
    last_lr: Vec<f64>,
}

impl ConstantLR {
    /// Create a new constant factor scheduler
    ///
    /// # Arguments
    /// * `base_lrs` - Initial learning rate of every group
    /// * `factor` - Multiplier in `[0, 1]` applied before `total_iters`
    /// * `total_iters` - Number of steps the factor is applied for
    /// * `last_epoch` - Step to resume from (-1 starts fresh)
    pub fn new(
        base_lrs: Vec<f64>,
        factor: f64,
        total_iters: usize,
        last_epoch: i64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&factor) {
            return Err(SchedulerError::invalid(format!(
                "Constant multiplicative factor expected to be between 0 and 1, but got {factor}"
            )));
        }
        validate_last_epoch(last_epoch)?;

        let mut scheduler =
            Self { last_lr: base_lrs.clone(), base_lrs, factor, total_iters, last_epoch };
        scheduler.step();
        Ok(scheduler)
    }

    fn compute(&mut self, epoch: f64) {
        let factor = if epoch < self.total_iters as f64 { self.factor } else { 1.0 };
        for (lr, &base) in self.last_lr.iter_mut().zip(&self.base_lrs) {
            *lr = base * factor;
        }
        self.last_epoch = epoch.floor() as i64;
    }
}

impl LRScheduler for ConstantLR {
    fn base_lrs(&self) -> &[f64] {
        &self.base_lrs
    }

    fn get_last_lr(&self) -> &[f64] {
        &self.last_lr
    }

    fn last_epoch(&self) -> i64 {
        self.last_epoch
    }

    fn step(&mut self) -> &[f64] {
        self.compute(next_epoch(self.last_epoch));
        &self.last_lr
    }

    fn step_to(&mut self, epoch: f64) -> Result<&[f64]> {
        validate_epoch(epoch)?;
        self.compute(epoch);
        Ok(&self.last_lr)
    }

    fn reset(&mut self) -> &[f64] {
        self.compute(0.0);
        &self.last_lr
    }
}
