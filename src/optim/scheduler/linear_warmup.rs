//! Linear warmup wrapper

use super::{next_epoch, validate_epoch, validate_last_epoch, LRScheduler};
use crate::error::{Result, SchedulerError};

/// Linear Warmup Learning Rate Scheduler
///
/// Ramps every group linearly from `start_factor * base_lr` towards `base_lr`
/// over `warmup_steps` steps, then hands control to the inner scheduler.
/// The inner scheduler is rewound to its step 0 at the handoff, so it sees
/// step `t - warmup_steps` at global step `t`.
///
/// Formula (t < warmup_steps): lr_t = base_lr * (f + (1 - f) * t / warmup_steps)
#[derive(Debug, Clone)]
pub struct LinearWarmup<S: LRScheduler> {
    inner: S,
    warmup_steps: usize,
    start_factor: f64,
    base_lrs: Vec<f64>,
    last_epoch: i64,
    last_lr: Vec<f64>,
}

impl<S: LRScheduler> LinearWarmup<S> {
    /// Wrap `inner` with a warmup phase
    ///
    /// # Arguments
    /// * `inner` - The scheduler to use after warmup
    /// * `warmup_steps` - Number of warmup steps (0 = no warmup)
    /// * `start_factor` - Fraction of the base rate at step 0, in `[0, 1]`
    pub fn new(inner: S, warmup_steps: usize, start_factor: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&start_factor) {
            return Err(SchedulerError::invalid(format!(
                "Expected warmup_start_factor between 0 and 1, but got {start_factor}"
            )));
        }

        let base_lrs = inner.base_lrs().to_vec();
        let mut scheduler = Self {
            inner,
            warmup_steps,
            start_factor,
            last_lr: base_lrs.clone(),
            base_lrs,
            last_epoch: -1,
        };
        scheduler.reset();
        Ok(scheduler)
    }

    /// Resume from `last_epoch` (-1 starts fresh).
    ///
    /// The wrapper seeks to `last_epoch + 1`, which places the inner
    /// scheduler at `last_epoch + 1 - warmup_steps` once warmup is over.
    /// `inner` should therefore be built fresh, not resumed itself.
    pub fn with_last_epoch(mut self, last_epoch: i64) -> Result<Self> {
        validate_last_epoch(last_epoch)?;
        if last_epoch >= 0 {
            self.step_to((last_epoch + 1) as f64)?;
        }
        Ok(self)
    }

    /// Get the inner scheduler
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get the warmup steps
    pub fn warmup_steps(&self) -> usize {
        self.warmup_steps
    }

    /// Whether `last_epoch` is still inside the warmup phase
    pub fn in_warmup(&self) -> bool {
        self.last_epoch < self.warmup_steps as i64
    }

    fn ramp(&mut self, epoch: f64) {
        let progress = epoch / self.warmup_steps as f64;
        let factor = self.start_factor + (1.0 - self.start_factor) * progress;
        for (lr, &base) in self.last_lr.iter_mut().zip(&self.base_lrs) {
            *lr = base * factor;
        }
    }

    fn copy_inner(&mut self) {
        self.last_lr.clear();
        self.last_lr.extend_from_slice(self.inner.get_last_lr());
    }
}

impl<S: LRScheduler> LRScheduler for LinearWarmup<S> {
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
        let epoch = next_epoch(self.last_epoch);
        let handoff = self.warmup_steps as f64;
        if epoch < handoff {
            self.ramp(epoch);
        } else if epoch == handoff {
            self.inner.reset();
            self.copy_inner();
        } else {
            self.inner.step();
            self.copy_inner();
        }
        self.last_epoch = epoch as i64;
        &self.last_lr
    }

    fn step_to(&mut self, epoch: f64) -> Result<&[f64]> {
        validate_epoch(epoch)?;
        let handoff = self.warmup_steps as f64;
        if epoch < handoff {
            self.ramp(epoch);
        } else {
            self.inner.step_to(epoch - handoff)?;
            self.copy_inner();
        }
        self.last_epoch = epoch.floor() as i64;
        Ok(&self.last_lr)
    }

    fn reset(&mut self) -> &[f64] {
        self.last_epoch = -1;
        self.step()
    }
}
