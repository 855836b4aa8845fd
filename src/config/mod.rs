//! Declarative scheduler configuration

mod scheduler;

pub use scheduler::SchedulerConfig;
