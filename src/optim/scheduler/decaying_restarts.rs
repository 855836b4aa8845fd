//! Cosine annealing with warm restarts and per-restart decay

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    cosine_rate, locate_cycle, validate_epoch, validate_last_epoch, LRScheduler, RestartState,
};
use crate::error::{Result, SchedulerError};
use crate::optim::ParamGroups;

fn default_t_mult() -> usize {
    1
}

fn default_restart_decay() -> f64 {
    1.0
}

fn default_last_epoch() -> i64 {
    -1
}

fn saturate(value: f64) -> f64 {
    value.clamp(-f64::MAX, f64::MAX)
}

/// Configuration for [`DecayingCosineWarmRestarts`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayingRestartsConfig {
    /// Length of the first cycle in steps
    #[serde(rename = "T_0")]
    pub t_0: usize,

    /// Cycle length multiplier applied at every restart
    #[serde(rename = "T_mult", default = "default_t_mult")]
    pub t_mult: usize,

    /// Minimum learning rate before any restart decay
    #[serde(default)]
    pub eta_min: f64,

    /// Multiplier applied to peak and minimum rates at every restart
    #[serde(default = "default_restart_decay")]
    pub restart_decay: f64,

    /// Step to resume from (-1 starts fresh)
    #[serde(default = "default_last_epoch")]
    pub last_epoch: i64,
}

impl DecayingRestartsConfig {
    /// Create a configuration with a first cycle of `t_0` steps and no decay
    pub fn new(t_0: usize) -> Self {
        Self {
            t_0,
            t_mult: default_t_mult(),
            eta_min: 0.0,
            restart_decay: default_restart_decay(),
            last_epoch: default_last_epoch(),
        }
    }

    /// Set cycle length multiplier
    pub fn with_t_mult(mut self, t_mult: usize) -> Self {
        self.t_mult = t_mult;
        self
    }

    /// Set minimum learning rate
    pub fn with_eta_min(mut self, eta_min: f64) -> Self {
        self.eta_min = eta_min;
        self
    }

    /// Set per-restart decay
    pub fn with_restart_decay(mut self, restart_decay: f64) -> Self {
        self.restart_decay = restart_decay;
        self
    }

    /// Set the step to resume from
    pub fn with_last_epoch(mut self, last_epoch: i64) -> Self {
        self.last_epoch = last_epoch;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.t_0 == 0 {
            return Err(SchedulerError::invalid(format!(
                "Expected positive integer T_0, but got {}",
                self.t_0
            )));
        }
        if self.t_mult < 1 {
            return Err(SchedulerError::invalid(format!(
                "Expected integer T_mult >= 1, but got {}",
                self.t_mult
            )));
        }
        if !self.eta_min.is_finite() {
            return Err(SchedulerError::invalid(format!(
                "Expected finite eta_min, but got {}",
                self.eta_min
            )));
        }
        if !(self.restart_decay > 0.0 && self.restart_decay.is_finite()) {
            return Err(SchedulerError::invalid(format!(
                "Expected positive restart_decay, but got {}",
                self.restart_decay
            )));
        }
        validate_last_epoch(self.last_epoch)
    }
}

/// Cosine Annealing with Warm Restarts and Restart Decay
///
/// Each cycle follows a half cosine from the cycle's peak rate down to its
/// floor rate. At every restart the cycle length is multiplied by `T_mult`
/// and both the peak and the floor are multiplied by `restart_decay`:
///
/// lr = eta_min_c + (base_lr_c - eta_min_c) * (1 + cos(pi * T_cur / T_i)) / 2
///
/// where `base_lr_c = base_lr * restart_decay^c`, `eta_min_c = eta_min *
/// restart_decay^c`, `c` is the number of restarts so far and `T_i = T_0 *
/// T_mult^c`. With `restart_decay = 1.0` this is exactly
/// [`CosineAnnealingWarmRestarts`](super::CosineAnnealingWarmRestarts).
#[derive(Debug, Clone)]
pub struct DecayingCosineWarmRestarts {
    config: DecayingRestartsConfig,
    initial_base_lrs: Vec<f64>,
    base_lrs: Vec<f64>,
    eta_min: f64,
    cycle: u64,
    t_i: usize,
    t_cur: f64,
    last_epoch: i64,
    last_lr: Vec<f64>,
}

impl DecayingCosineWarmRestarts {
    /// Create a scheduler for groups starting at `base_lrs`.
    ///
    /// The rates for the first step are computed immediately and are
    /// available from `get_last_lr`.
    pub fn new(base_lrs: Vec<f64>, config: DecayingRestartsConfig) -> Result<Self> {
        config.validate()?;
        if let Some(&lr) = base_lrs.iter().find(|&&lr| lr < config.eta_min) {
            warn!(
                base_lr = lr,
                eta_min = config.eta_min,
                "eta_min exceeds a group's base learning rate; rates will rise within each cycle"
            );
        }

        let mut scheduler = Self {
            initial_base_lrs: base_lrs.clone(),
            last_lr: base_lrs.clone(),
            base_lrs,
            eta_min: config.eta_min,
            cycle: 0,
            t_i: config.t_0,
            t_cur: config.last_epoch as f64,
            last_epoch: config.last_epoch,
            config,
        };
        scheduler.step();
        Ok(scheduler)
    }

    /// Create a scheduler from an optimizer's current group rates and
    /// publish the first rates to it.
    pub fn from_groups(
        groups: &mut dyn ParamGroups,
        config: DecayingRestartsConfig,
    ) -> Result<Self> {
        let scheduler = Self::new(groups.group_lrs(), config)?;
        scheduler.apply(groups);
        Ok(scheduler)
    }

    /// Configuration this scheduler was built with
    pub fn config(&self) -> &DecayingRestartsConfig {
        &self.config
    }

    /// Number of restarts so far
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Length of the cycle in progress
    pub fn t_i(&self) -> usize {
        self.t_i
    }

    /// Offset within the cycle in progress
    pub fn t_cur(&self) -> f64 {
        self.t_cur
    }

    /// Peak rates of the current cycle (`base_lrs * restart_decay^cycle`)
    pub fn current_base_lrs(&self) -> &[f64] {
        &self.base_lrs
    }

    /// Floor rate of the current cycle (`eta_min * restart_decay^cycle`)
    pub fn current_eta_min(&self) -> f64 {
        self.eta_min
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

    /// Restore a position captured by [`state`](Self::state).
    ///
    /// The rates are recomputed but not published; call `apply` afterwards.
    pub fn load_state(&mut self, state: RestartState) -> Result<()> {
        state.validate(self.config.t_0, self.config.t_mult)?;
        self.cycle = state.cycle;
        self.t_i = state.t_i;
        self.t_cur = state.t_cur;
        self.last_epoch = state.last_epoch;
        self.decay_to_cycle();
        self.refresh_lrs();
        Ok(())
    }

    /// Re-derive the cycle's peak and floor from the undecayed originals.
    ///
    /// Factors and decayed rates beyond the `f64` range saturate at
    /// `f64::MAX`.
    fn decay_to_cycle(&mut self) {
        let mut factor = self.config.restart_decay.powf(self.cycle as f64);
        if !factor.is_finite() {
            warn!(
                cycle = self.cycle,
                restart_decay = self.config.restart_decay,
                "restart decay factor overflows f64; saturating at f64::MAX"
            );
            factor = f64::MAX;
        }
        for (base, &initial) in self.base_lrs.iter_mut().zip(&self.initial_base_lrs) {
            *base = saturate(initial * factor);
        }
        self.eta_min = saturate(self.config.eta_min * factor);
    }

    fn advance(&mut self) {
        self.t_cur += 1.0;
        if self.t_cur >= self.t_i as f64 {
            self.t_cur %= self.t_i as f64;
            self.t_i = self.t_i.saturating_mul(self.config.t_mult);
            self.cycle += 1;
            self.decay_to_cycle();
            debug!(
                cycle = self.cycle,
                t_i = self.t_i,
                eta_min = self.eta_min,
                "warm restart"
            );
        }
        self.last_epoch += 1;
    }

    fn seek(&mut self, epoch: f64, (cycle, t_i, t_cur): (u64, usize, f64)) {
        let previous = self.cycle;
        self.cycle = cycle;
        self.t_i = t_i;
        self.t_cur = t_cur;
        if cycle != previous {
            self.decay_to_cycle();
        }
        self.last_epoch = epoch.floor() as i64;
        debug!(epoch, cycle, t_i, t_cur, "seek");
    }

    fn rewind(&mut self) {
        self.seek(0.0, (0, self.config.t_0, 0.0));
    }

    fn refresh_lrs(&mut self) {
        let t_i = self.t_i as f64;
        for (lr, &base) in self.last_lr.iter_mut().zip(&self.base_lrs) {
            let rate = cosine_rate(self.eta_min, base, self.t_cur, t_i);
            // Saturated peaks can overflow the interpolation
            *lr = if rate.is_finite() { rate } else { base.max(self.eta_min) };
        }
    }
}

impl LRScheduler for DecayingCosineWarmRestarts {
    fn base_lrs(&self) -> &[f64] {
        &self.initial_base_lrs
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
            self.advance();
        }
        self.refresh_lrs();
        &self.last_lr
    }

    fn step_to(&mut self, epoch: f64) -> Result<&[f64]> {
        validate_epoch(epoch)?;
        let located = locate_cycle(epoch, self.config.t_0, self.config.t_mult)?;
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
