//! Decaying Cosine Warm Restarts Integration Tests
//!
//! Drives schedulers through a toy optimizer the way a training loop would:
//! build from the optimizer's groups, step once per iteration, checkpoint and
//! resume mid-cycle.

use approx::assert_relative_eq;
use cosine_restarts::{
    get_lr_scheduler, DecayingCosineWarmRestarts, DecayingRestartsConfig, LRScheduler,
    ParamGroups, RestartState, SchedulerOptions,
};
use std::fs;

/// Optimizer stand-in with one weight per group, updated by plain gradient descent
struct ToyOptimizer {
    lrs: Vec<f64>,
    weights: Vec<f64>,
}

impl ToyOptimizer {
    fn new(lrs: &[f64]) -> Self {
        Self { lrs: lrs.to_vec(), weights: vec![1.0; lrs.len()] }
    }

    /// One descent step on f(w) = w^2 / 2
    fn step(&mut self) {
        for (w, lr) in self.weights.iter_mut().zip(&self.lrs) {
            *w -= lr * *w;
        }
    }
}

impl ParamGroups for ToyOptimizer {
    fn num_groups(&self) -> usize {
        self.lrs.len()
    }

    fn group_lr(&self, index: usize) -> f64 {
        self.lrs[index]
    }

    fn set_group_lr(&mut self, index: usize, lr: f64) {
        self.lrs[index] = lr;
    }
}

fn config() -> DecayingRestartsConfig {
    DecayingRestartsConfig::new(100).with_t_mult(2).with_eta_min(1e-7).with_restart_decay(0.8)
}

// ============================================================================
// Training loop
// ============================================================================

#[test]
fn training_loop_publishes_every_step() {
    let mut optimizer = ToyOptimizer::new(&[1e-4, 1e-3]);
    let mut scheduler = DecayingCosineWarmRestarts::from_groups(&mut optimizer, config()).unwrap();

    let mut history = Vec::new();
    for _ in 0..700 {
        optimizer.step();
        scheduler.step_and_apply(&mut optimizer);
        assert_eq!(optimizer.lrs, scheduler.get_last_lr());
        history.push(optimizer.lrs[0]);
    }

    // Restarts after iterations 100, 300 and 700
    assert_relative_eq!(history[99], 8e-5, max_relative = 0.01);
    assert_relative_eq!(history[299], 6.4e-5, max_relative = 0.01);
    assert_relative_eq!(history[699], 5.12e-5, max_relative = 0.01);
    assert_eq!(scheduler.cycle(), 3);

    // Second group keeps its 10x ratio
    assert_relative_eq!(optimizer.lrs[1], optimizer.lrs[0] * 10.0, max_relative = 1e-12);
    assert!(optimizer.weights.iter().all(|&w| w < 1.0 && w > 0.0));
}

#[test]
fn boxed_scheduler_from_factory_matches_direct() {
    let mut direct_groups = vec![1e-4];
    let mut direct = DecayingCosineWarmRestarts::from_groups(&mut direct_groups, config()).unwrap();

    let mut boxed_groups = vec![1e-4];
    let options = SchedulerOptions::new()
        .with_total_iters(100)
        .with_t_mult(2)
        .with_eta_min(1e-7)
        .with_restart_decay(0.8);
    let mut boxed =
        get_lr_scheduler("decaying_cosine_with_restarts", &mut boxed_groups, options).unwrap();

    assert_eq!(direct_groups, boxed_groups);
    for _ in 0..500 {
        direct.step_and_apply(&mut direct_groups);
        boxed.step_and_apply(&mut boxed_groups);
        assert_eq!(direct_groups, boxed_groups);
    }
}

// ============================================================================
// Checkpoint and resume
// ============================================================================

#[test]
fn checkpoint_resume_continues_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scheduler_state.json");

    let mut reference_groups = vec![1e-4];
    let mut reference =
        DecayingCosineWarmRestarts::from_groups(&mut reference_groups, config()).unwrap();
    for _ in 0..180 {
        reference.step_and_apply(&mut reference_groups);
    }
    fs::write(&path, serde_json::to_string_pretty(&reference.state()).unwrap()).unwrap();

    let state: RestartState = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let mut resumed_groups = vec![1e-4];
    let mut resumed =
        DecayingCosineWarmRestarts::from_groups(&mut resumed_groups, config()).unwrap();
    resumed.load_state(state).unwrap();
    resumed.apply(&mut resumed_groups);

    assert_eq!(resumed_groups, reference_groups);
    assert_eq!(resumed.current_base_lrs(), reference.current_base_lrs());
    for _ in 0..400 {
        reference.step_and_apply(&mut reference_groups);
        resumed.step_and_apply(&mut resumed_groups);
        assert_eq!(resumed_groups, reference_groups);
    }
}

#[test]
fn resume_by_last_epoch_matches_seek() {
    let mut seeker = DecayingCosineWarmRestarts::new(vec![1e-4], config()).unwrap();
    seeker.step_to(60.0).unwrap();

    let resumed =
        DecayingCosineWarmRestarts::new(vec![1e-4], config().with_last_epoch(59)).unwrap();
    assert_eq!(resumed.state(), seeker.state());
    assert_eq!(resumed.get_last_lr(), seeker.get_last_lr());
}

#[test]
fn load_state_from_other_schedule_is_rejected() {
    let mut other = DecayingCosineWarmRestarts::new(vec![1e-4], DecayingRestartsConfig::new(30))
        .unwrap();
    other.step_to(95.0).unwrap();

    let mut scheduler = DecayingCosineWarmRestarts::new(vec![1e-4], config()).unwrap();
    assert!(scheduler.load_state(other.state()).is_err());
    assert_eq!(scheduler.last_epoch(), 0);
}
