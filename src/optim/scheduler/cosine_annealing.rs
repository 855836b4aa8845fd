//! Cosine annealing learning rate scheduler

use super::{cosine_rate, next_epoch, validate_epoch, validate_last_epoch, LRScheduler};
use crate::error::{Result, SchedulerError};

/// Cosine Annealing Learning Rate Scheduler
///
/// Decreases the learning rate following a cosine curve from base_lr to eta_min.
///
/// Formula: lr_t = eta_min + (base_lr - eta_min) * (1 + cos(pi * t / T_max)) / 2
///
/// Where:
/// - t is the current step
/// - T_max is the half period of the cosine
/// - base_lr is the group's initial learning rate
/// - eta_min is the minimum learning rate (default 0)
///
/// The closed form is evaluated as-is past `T_max`, so the rate climbs back
/// towards base_lr over the following `T_max` steps.
#[derive(Debug, Clone)]
pub struct CosineAnnealingLR {
    base_lrs: Vec<f64>,
    t_max: usize,
    eta_min: f64,
    last_epoch: i64,
    last_lr: Vec<f64>,
}

impl CosineAnnealingLR {
    /// Create a new cosine annealing scheduler
    ///
    /// # Arguments
    /// * `base_lrs` - Initial (maximum) learning rate of every group
    /// * `t_max` - Number of steps from maximum to minimum
    /// * `eta_min` - Minimum learning rate
    /// * `last_epoch` - Step to resume from (-1 starts fresh)
    pub fn new(base_lrs: Vec<f64>, t_max: usize, eta_min: f64, last_epoch: i64) -> Result<Self> {
        if t_max == 0 {
            return Err(SchedulerError::invalid("Expected positive integer T_max, but got 0"));
        }
        if !eta_min.is_finite() {
            return Err(SchedulerError::invalid(format!(
                "Expected finite eta_min, but got {eta_min}"
            )));
        }
        validate_last_epoch(last_epoch)?;

        let mut scheduler =
            Self { last_lr: base_lrs.clone(), base_lrs, t_max, eta_min, last_epoch };
        scheduler.step();
        Ok(scheduler)
    }

    fn compute(&mut self, epoch: f64) {
        let t_max = self.t_max as f64;
        for (lr, &base) in self.last_lr.iter_mut().zip(&self.base_lrs) {
            *lr = cosine_rate(self.eta_min, base, epoch, t_max);
        }
        self.last_epoch = epoch.floor() as i64;
    }
}

impl LRScheduler for CosineAnnealingLR {
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
