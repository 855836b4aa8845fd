//! Optimizer-facing learning rate scheduling

mod param_groups;
pub mod scheduler;

pub use param_groups::ParamGroups;
pub use scheduler::{
    get_lr_scheduler, ConstantLR, CosineAnnealingLR, CosineAnnealingWarmRestarts,
    DecayingCosineWarmRestarts, DecayingRestartsConfig, LRScheduler, LinearLR, LinearWarmup,
    RestartState, SchedulerKind, SchedulerOptions, StepLR,
};
