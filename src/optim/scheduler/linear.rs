//! Linear factor learning rate scheduler

use super::{next_epoch, validate_epoch, validate_last_epoch, LRScheduler};
use crate::error::{Result, SchedulerError};

/// Linear Factor Learning Rate Scheduler
///
/// Interpolates the multiplicative factor linearly from `start_factor` to
/// `end_factor` over `total_iters` steps, then holds `end_factor`.
///
/// Formula: lr_t = base_lr * (s + (e - s) * min(t, N) / N)
#[derive(Debug, Clone)]
pub struct LinearLR {
    base_lrs: Vec<f64>,
    start_factor: f64,
    end_factor: f64,
    total_iters: usize,
    last_epoch: i64,
    last_lr: Vec<f64>,
}

impl LinearLR {
    /// Create a new linear factor scheduler
    ///
    /// # Arguments
    /// * `base_lrs` - Initial learning rate of every group
    /// * `start_factor` - Factor at step 0, in `(0, 1]`
    /// * `end_factor` - Factor from step `total_iters` on, in `[0, 1]`
    /// * `total_iters` - Number of interpolation steps (> 0)
    /// * `last_epoch` - Step to resume from (-1 starts fresh)
    pub fn new(
        base_lrs: Vec<f64>,
        start_factor: f64,
        end_factor: f64,
        total_iters: usize,
        last_epoch: i64,
    ) -> Result<Self> {
        if !(start_factor > 0.0 && start_factor <= 1.0) {
            return Err(SchedulerError::invalid(format!(
                "Starting multiplicative factor expected to be greater than 0 and less or equal \
                 to 1, but got {start_factor}"
            )));
        }
        if !(0.0..=1.0).contains(&end_factor) {
            return Err(SchedulerError::invalid(format!(
                "Ending multiplicative factor expected to be between 0 and 1, but got {end_factor}"
            )));
        }
        if total_iters == 0 {
            return Err(SchedulerError::invalid("Expected positive integer total_iters, but got 0"));
        }
        validate_last_epoch(last_epoch)?;

        let mut scheduler = Self {
            last_lr: base_lrs.clone(),
            base_lrs,
            start_factor,
            end_factor,
            total_iters,
            last_epoch,
        };
        scheduler.step();
        Ok(scheduler)
    }

    fn compute(&mut self, epoch: f64) {
        let total = self.total_iters as f64;
        let factor =
            self.start_factor + (self.end_factor - self.start_factor) * epoch.min(total) / total;
        for (lr, &base) in self.last_lr.iter_mut().zip(&self.base_lrs) {
            *lr = base * factor;
        }
        self.last_epoch = epoch.floor() as i64;
    }
}

impl LRScheduler for LinearLR {
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
