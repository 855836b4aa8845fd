//! Step decay learning rate scheduler

use super::{next_epoch, validate_epoch, validate_last_epoch, LRScheduler};
use crate::error::{Result, SchedulerError};

/// Step Decay Learning Rate Scheduler
///
/// Multiplies learning rate by gamma every step_size epochs.
///
/// Formula: lr_t = base_lr * gamma^(floor(epoch / step_size))
#[derive(Debug, Clone)]
pub struct StepLR {
    base_lrs: Vec<f64>,
    step_size: usize,
    gamma: f64,
    last_epoch: i64,
    last_lr: Vec<f64>,
}

impl StepLR {
    /// Create a new step decay scheduler
    ///
    /// # Arguments
    /// * `base_lrs` - Initial learning rate of every group
    /// * `step_size` - Decay LR every step_size epochs
    /// * `gamma` - Multiplicative factor (e.g., 0.1 for 10x reduction)
    /// * `last_epoch` - Step to resume from (-1 starts fresh)
    pub fn new(base_lrs: Vec<f64>, step_size: usize, gamma: f64, last_epoch: i64) -> Result<Self> {
        if step_size == 0 {
            return Err(SchedulerError::invalid("Expected positive integer step_size, but got 0"));
        }
        if !gamma.is_finite() {
            return Err(SchedulerError::invalid(format!("Expected finite gamma, but got {gamma}")));
        }
        validate_last_epoch(last_epoch)?;

        let mut scheduler =
            Self { last_lr: base_lrs.clone(), base_lrs, step_size, gamma, last_epoch };
        scheduler.step();
        Ok(scheduler)
    }

    fn compute(&mut self, epoch: f64) {
        let num_decays = (epoch / self.step_size as f64).floor();
        let factor = self.gamma.powf(num_decays);
        for (lr, &base) in self.last_lr.iter_mut().zip(&self.base_lrs) {
            *lr = base * factor;
        }
        self.last_epoch = epoch.floor() as i64;
    }
}

impl LRScheduler for StepLR {
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
