//! Scheduler construction by name

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use super::{
    ConstantLR, CosineAnnealingLR, CosineAnnealingWarmRestarts, DecayingCosineWarmRestarts,
    DecayingRestartsConfig, LRScheduler, LinearLR, LinearWarmup, StepLR,
};
use crate::error::{Result, SchedulerError};
use crate::optim::ParamGroups;

/// Warmup length used by `constant_with_warmup` when none is given
pub const DEFAULT_NUM_WARMUP_STEPS: usize = 1000;

const WARMUP_OPTIONS: [&str; 2] = ["warmup_steps", "warmup_start_factor"];

/// Scheduler kinds recognised by [`get_lr_scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    Cosine,
    CosineWithRestarts,
    DecayingCosineWithRestarts,
    Step,
    Constant,
    Linear,
    ConstantWithWarmup,
}

impl SchedulerKind {
    /// Every recognised kind
    pub const ALL: [SchedulerKind; 7] = [
        SchedulerKind::Cosine,
        SchedulerKind::CosineWithRestarts,
        SchedulerKind::DecayingCosineWithRestarts,
        SchedulerKind::Step,
        SchedulerKind::Constant,
        SchedulerKind::Linear,
        SchedulerKind::ConstantWithWarmup,
    ];

    /// Name used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            SchedulerKind::Cosine => "cosine",
            SchedulerKind::CosineWithRestarts => "cosine_with_restarts",
            SchedulerKind::DecayingCosineWithRestarts => "decaying_cosine_with_restarts",
            SchedulerKind::Step => "step",
            SchedulerKind::Constant => "constant",
            SchedulerKind::Linear => "linear",
            SchedulerKind::ConstantWithWarmup => "constant_with_warmup",
        }
    }

    /// Options this kind accepts after `total_iters` normalization
    fn accepted_options(&self) -> &'static [&'static str] {
        match self {
            SchedulerKind::Cosine => &["T_max", "eta_min", "last_epoch"],
            SchedulerKind::CosineWithRestarts => &["T_0", "T_mult", "eta_min", "last_epoch"],
            SchedulerKind::DecayingCosineWithRestarts => {
                &["T_0", "T_mult", "eta_min", "restart_decay", "last_epoch"]
            }
            SchedulerKind::Step => &["step_size", "gamma", "last_epoch"],
            SchedulerKind::Constant => &["factor", "total_iters", "last_epoch"],
            SchedulerKind::Linear => &["start_factor", "end_factor", "total_iters", "last_epoch"],
            SchedulerKind::ConstantWithWarmup => &["num_warmup_steps", "last_epoch"],
        }
    }

    fn accepts(&self, option: &str) -> bool {
        self.accepted_options().iter().any(|accepted| *accepted == option)
            || (*self != SchedulerKind::ConstantWithWarmup
                && WARMUP_OPTIONS.iter().any(|accepted| *accepted == option))
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchedulerKind {
    type Err = SchedulerError;

    fn from_str(name: &str) -> Result<Self> {
        SchedulerKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| SchedulerError::UnknownScheduler(name.to_string()))
    }
}

/// Options for [`get_lr_scheduler`]
///
/// Field names follow the configuration keys (`T_0`, `T_mult`, `T_max`, ...).
/// `total_iters` is renamed to the period option of the cosine kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_iters: Option<usize>,

    /// Cosine annealing half period
    #[serde(rename = "T_max", default, skip_serializing_if = "Option::is_none")]
    pub t_max: Option<usize>,

    /// First restart period
    #[serde(rename = "T_0", default, skip_serializing_if = "Option::is_none")]
    pub t_0: Option<usize>,

    /// Restart period multiplier
    #[serde(rename = "T_mult", default, skip_serializing_if = "Option::is_none")]
    pub t_mult: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_decay: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_size: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_factor: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_factor: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_warmup_steps: Option<usize>,

    /// Linear warmup steps before the selected scheduler takes over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup_steps: Option<usize>,

    /// Fraction of the base rate at the first warmup step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup_start_factor: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_epoch: Option<i64>,
}

impl SchedulerOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set total_iters
    pub fn with_total_iters(mut self, total_iters: usize) -> Self {
        self.total_iters = Some(total_iters);
        self
    }

    /// Set T_0
    pub fn with_t_0(mut self, t_0: usize) -> Self {
        self.t_0 = Some(t_0);
        self
    }

    /// Set T_mult
    pub fn with_t_mult(mut self, t_mult: usize) -> Self {
        self.t_mult = Some(t_mult);
        self
    }

    /// Set eta_min
    pub fn with_eta_min(mut self, eta_min: f64) -> Self {
        self.eta_min = Some(eta_min);
        self
    }

    /// Set restart_decay
    pub fn with_restart_decay(mut self, restart_decay: f64) -> Self {
        self.restart_decay = Some(restart_decay);
        self
    }

    /// Set warmup steps and start factor
    pub fn with_warmup(mut self, warmup_steps: usize, warmup_start_factor: f64) -> Self {
        self.warmup_steps = Some(warmup_steps);
        self.warmup_start_factor = Some(warmup_start_factor);
        self
    }

    /// Names of the options that are set
    fn present(&self) -> Vec<&'static str> {
        let flags = [
            ("total_iters", self.total_iters.is_some()),
            ("T_max", self.t_max.is_some()),
            ("T_0", self.t_0.is_some()),
            ("T_mult", self.t_mult.is_some()),
            ("eta_min", self.eta_min.is_some()),
            ("restart_decay", self.restart_decay.is_some()),
            ("step_size", self.step_size.is_some()),
            ("gamma", self.gamma.is_some()),
            ("factor", self.factor.is_some()),
            ("start_factor", self.start_factor.is_some()),
            ("end_factor", self.end_factor.is_some()),
            ("num_warmup_steps", self.num_warmup_steps.is_some()),
            ("warmup_steps", self.warmup_steps.is_some()),
            ("warmup_start_factor", self.warmup_start_factor.is_some()),
            ("last_epoch", self.last_epoch.is_some()),
        ];
        flags.into_iter().filter(|(_, set)| *set).map(|(name, _)| name).collect()
    }

    /// Rename `total_iters` to the option the kind actually uses
    fn normalized(mut self, kind: SchedulerKind) -> Self {
        match kind {
            SchedulerKind::Cosine => {
                if let Some(total_iters) = self.total_iters.take() {
                    self.t_max = Some(total_iters);
                }
            }
            SchedulerKind::CosineWithRestarts | SchedulerKind::DecayingCosineWithRestarts => {
                if let Some(total_iters) = self.total_iters.take() {
                    self.t_0 = Some(total_iters);
                }
            }
            SchedulerKind::ConstantWithWarmup => {
                self.total_iters = None;
            }
            SchedulerKind::Step | SchedulerKind::Constant | SchedulerKind::Linear => {}
        }
        self
    }
}

fn required<T>(value: Option<T>, kind: SchedulerKind, option: &'static str) -> Result<T> {
    value.ok_or(SchedulerError::MissingOption { scheduler: kind.name(), option })
}

/// Build a scheduler by name for the groups of an optimizer.
///
/// Base rates are read from `groups`, and the primed rates are written back
/// before returning. `warmup_steps > 0` wraps the scheduler in
/// [`LinearWarmup`] whose ramp starts at `warmup_start_factor` (default 0.0).
/// With warmup, `last_epoch` resumes the wrapper and the wrapped scheduler is
/// positioned `warmup_steps` behind it.
pub fn get_lr_scheduler(
    name: &str,
    groups: &mut dyn ParamGroups,
    options: SchedulerOptions,
) -> Result<Box<dyn LRScheduler>> {
    let kind: SchedulerKind = name.parse()?;
    let options = options.normalized(kind);
    if let Some(option) = options.present().into_iter().find(|option| !kind.accepts(option)) {
        return Err(SchedulerError::UnexpectedOption { scheduler: kind.name(), option });
    }

    let base_lrs = groups.group_lrs();
    let last_epoch = options.last_epoch.unwrap_or(-1);
    let warmup_steps = options.warmup_steps.unwrap_or(0);
    // A warmup wrapper resumes itself, so the scheduler it wraps starts fresh
    let inner_last_epoch = if warmup_steps > 0 { -1 } else { last_epoch };
    let scheduler: Box<dyn LRScheduler> = match kind {
        SchedulerKind::Cosine => Box::new(CosineAnnealingLR::new(
            base_lrs,
            required(options.t_max, kind, "T_max")?,
            options.eta_min.unwrap_or(0.0),
            inner_last_epoch,
        )?),
        SchedulerKind::CosineWithRestarts => Box::new(CosineAnnealingWarmRestarts::new(
            base_lrs,
            required(options.t_0, kind, "T_0")?,
            options.t_mult.unwrap_or(1),
            options.eta_min.unwrap_or(0.0),
            inner_last_epoch,
        )?),
        SchedulerKind::DecayingCosineWithRestarts => {
            let mut config = DecayingRestartsConfig::new(required(options.t_0, kind, "T_0")?)
                .with_last_epoch(inner_last_epoch);
            if let Some(t_mult) = options.t_mult {
                config = config.with_t_mult(t_mult);
            }
            if let Some(eta_min) = options.eta_min {
                config = config.with_eta_min(eta_min);
            }
            if let Some(restart_decay) = options.restart_decay {
                config = config.with_restart_decay(restart_decay);
            }
            Box::new(DecayingCosineWarmRestarts::new(base_lrs, config)?)
        }
        SchedulerKind::Step => Box::new(StepLR::new(
            base_lrs,
            required(options.step_size, kind, "step_size")?,
            options.gamma.unwrap_or(0.1),
            inner_last_epoch,
        )?),
        SchedulerKind::Constant => Box::new(ConstantLR::new(
            base_lrs,
            options.factor.unwrap_or(1.0),
            options.total_iters.unwrap_or(5),
            inner_last_epoch,
        )?),
        SchedulerKind::Linear => Box::new(LinearLR::new(
            base_lrs,
            options.start_factor.unwrap_or(1.0 / 3.0),
            options.end_factor.unwrap_or(1.0),
            options.total_iters.unwrap_or(5),
            inner_last_epoch,
        )?),
        SchedulerKind::ConstantWithWarmup => {
            let num_warmup_steps = options.num_warmup_steps.unwrap_or_else(|| {
                warn!(
                    default = DEFAULT_NUM_WARMUP_STEPS,
                    "num_warmup_steps not set for constant_with_warmup; using default"
                );
                DEFAULT_NUM_WARMUP_STEPS
            });
            let constant = ConstantLR::new(base_lrs, 1.0, 0, -1)?;
            Box::new(
                LinearWarmup::new(constant, num_warmup_steps, 0.0)?.with_last_epoch(last_epoch)?,
            )
        }
    };

    let scheduler = if warmup_steps > 0 {
        let start_factor = options.warmup_start_factor.unwrap_or(0.0);
        Box::new(
            LinearWarmup::new(scheduler, warmup_steps, start_factor)?
                .with_last_epoch(last_epoch)?,
        ) as Box<dyn LRScheduler>
    } else {
        scheduler
    };

    scheduler.apply(groups);
    Ok(scheduler)
}
