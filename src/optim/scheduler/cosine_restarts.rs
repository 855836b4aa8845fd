//! Cosine annealing with warm restarts

use super::{
    cosine_rate, locate_cycle, validate_epoch, validate_last_epoch, LRScheduler, RestartState,
};
use crate::error::{Result, SchedulerError};

/// Cosine Annealing with Warm Restarts
///
/// Every cycle restarts at the full base rate. Cycle `i` lasts `T_0 * T_mult^i`
/// steps.
///
/// Formula: lr = eta_min + (base_lr - eta_min) * (1 + cos(pi * T_cur / T_i)) / 2
#[derive(Debug, Clone)]
pub struct CosineAnnealingWarmRestarts {
    base_lrs: Vec<f64>,
    t_0: usize,
    t_mult: usize,
    eta_min: f64,
    cycle: u64,
    t_i: usize,
    t_cur: f64,
    last_epoch: i64,
    last_lr: Vec<f64>,
}

impl CosineAnnealingWarmRestarts {
    /// Create a new cosine warm restarts scheduler
    ///
    /// # Arguments
    /// * `base_lrs` - Peak learning rate of every group
    /// * `t_0` - Length of the first cycle
    /// * `t_mult` - Cycle length multiplier (>= 1)
    /// * `eta_min` - Minimum learning rate
    /// * `last_epoch` - Step to resume from (-1 starts fresh)
    pub fn new(
        base_lrs: Vec<f64>,
        t_0: usize,
        t_mult: usize,
        eta_min: f64,
        last_epoch: i64,
    ) -> Result<Self> {
        if t_0 == 0 {
            return Err(SchedulerError::invalid(format!(
                "Expected positive integer T_0, but got {t_0}"
            )));
        }
        if t_mult < 1 {
            return Err(SchedulerError::invalid(format!(
                "Expected integer T_mult >= 1, but got {t_mult}"
            )));
        }
        if !eta_min.is_finite() {
            return Err(SchedulerError::invalid(format!(
                "Expected finite eta_min, but got {eta_min}"
            )));
        }
        validate_last_epoch(last_epoch)?;

        let mut scheduler = Self {
            last_lr: base_lrs.clone(),
            base_lrs,
            t_0,
            t_mult,
            eta_min,
            cycle: 0,
            t_i: t_0,
            t_cur: last_epoch as f64,
            last_epoch,
        };
        scheduler.step();
        Ok(scheduler)
    }

    /// Length of the cycle in progress
    pub fn t_i(&self) -> usize {
        self.t_i
    }

    /// Offset within the cycle in progress
    pub fn t_cur(&self) -> f64 {
        self.t_cur
    }

    /// Number of restarts so far
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Capture the resumable position
    pub fn state(&self) -> RestartState {
        RestartState {
            cycle: self.cycle,
            t_i: self.t_i,
            t_cur: self.t_cur,
            last_epoch: self.last_epoch,
        }
    }

    /// Restore a position captured by [`state`](Self::state)
    pub fn load_state(&mut self, state: RestartState) -> Result<()> {
        state.validate(self.t_0, self.t_mult)?;
        self.cycle = state.cycle;
        self.t_i = state.t_i;
        self.t_cur = state.t_cur;
        self.last_epoch = state.last_epoch;
        self.refresh_lrs();
        Ok(())
    }

    fn seek(&mut self, epoch: f64, located: (u64, usize, f64)) {
        (self.cycle, self.t_i, self.t_cur) = located;
        self.last_epoch = epoch.floor() as i64;
    }

    fn rewind(&mut self) {
        self.seek(0.0, (0, self.t_0, 0.0));
    }

    fn refresh_lrs(&mut self) {
        let t_i = self.t_i as f64;
        for (lr, &base) in self.last_lr.iter_mut().zip(&self.base_lrs) {
            *lr = cosine_rate(self.eta_min, base, self.t_cur, t_i);
        }
    }
}

impl LRScheduler for CosineAnnealingWarmRestarts {
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
        if self.last_epoch < 0 {
            self.rewind();
        } else {
            self.t_cur += 1.0;
            if self.t_cur >= self.t_i as f64 {
                self.t_cur -= self.t_i as f64;
                self.t_i = self.t_i.saturating_mul(self.t_mult);
                self.cycle += 1;
            }
            self.last_epoch += 1;
        }
        self.refresh_lrs();
        &self.last_lr
    }

    fn step_to(&mut self, epoch: f64) -> Result<&[f64]> {
        validate_epoch(epoch)?;
        let located = locate_cycle(epoch, self.t_0, self.t_mult)?;
        self.seek(epoch, located);
        self.refresh_lrs();
        Ok(&self.last_lr)
    }

    fn reset(&mut self) -> &[f64] {
        self.rewind();
        self.refresh_lrs();
        &self.last_lr
    }
}
