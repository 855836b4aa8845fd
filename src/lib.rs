//! Cosine annealing with warm restarts and per-restart decay.
//!
//! The central type is [`DecayingCosineWarmRestarts`]: a cosine schedule that
//! periodically restarts, growing each cycle by `T_mult` and scaling both the
//! peak and the floor rate by `restart_decay` at every restart. With
//! `restart_decay = 1.0` it reproduces [`CosineAnnealingWarmRestarts`].
//!
//! Schedulers compute one rate per parameter group and publish them into any
//! [`ParamGroups`] holder. [`get_lr_scheduler`] and [`SchedulerConfig`] build
//! schedulers by name from options or YAML.
//!
//! # Example
//!
//! ```
//! use cosine_restarts::{DecayingCosineWarmRestarts, DecayingRestartsConfig, LRScheduler};
//!
//! let mut group_lrs = vec![1e-4];
//! let config = DecayingRestartsConfig::new(100)
//!     .with_t_mult(2)
//!     .with_eta_min(1e-7)
//!     .with_restart_decay(0.8);
//! let mut scheduler = DecayingCosineWarmRestarts::from_groups(&mut group_lrs, config)?;
//!
//! for _ in 0..100 {
//!     scheduler.step_and_apply(&mut group_lrs);
//! }
//! assert!((group_lrs[0] - 8e-5).abs() < 1e-12);
//! # Ok::<(), cosine_restarts::SchedulerError>(())
//! ```

pub mod config;
pub mod error;
pub mod optim;

pub use config::SchedulerConfig;
pub use error::{Result, SchedulerError};
pub use optim::{
    get_lr_scheduler, ConstantLR, CosineAnnealingLR, CosineAnnealingWarmRestarts,
    DecayingCosineWarmRestarts, DecayingRestartsConfig, LRScheduler, LinearLR, LinearWarmup,
    ParamGroups, RestartState, SchedulerKind, SchedulerOptions, StepLR,
};
