//! Parameter group learning rate slots

/// Per-group learning rate storage owned by an optimizer.
///
/// Schedulers read the initial rate of each group when they are built and
/// overwrite the slots with every rate they compute afterwards.
pub trait ParamGroups {
    /// Number of parameter groups
    fn num_groups(&self) -> usize;

    /// Get the learning rate of group `index`
    fn group_lr(&self, index: usize) -> f64;

    /// Set the learning rate of group `index`
    fn set_group_lr(&mut self, index: usize, lr: f64);

    /// Collect the learning rate of every group, in order
    fn group_lrs(&self) -> Vec<f64> {
        (0..self.num_groups()).map(|i| self.group_lr(i)).collect()
    }
}

impl ParamGroups for Vec<f64> {
    fn num_groups(&self) -> usize {
        self.len()
    }

    fn group_lr(&self, index: usize) -> f64 {
        self[index]
    }

    fn set_group_lr(&mut self, index: usize, lr: f64) {
        self[index] = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal optimizer holding named groups, for testing default trait methods
    struct TestOptimizer {
        groups: Vec<(&'static str, f64)>,
    }

    impl ParamGroups for TestOptimizer {
        fn num_groups(&self) -> usize {
            self.groups.len()
        }

        fn group_lr(&self, index: usize) -> f64 {
            self.groups[index].1
        }

        fn set_group_lr(&mut self, index: usize, lr: f64) {
            self.groups[index].1 = lr;
        }
    }

    #[test]
    fn test_vec_groups() {
        let mut groups = vec![0.1, 0.01];
        assert_eq!(groups.num_groups(), 2);
        groups.set_group_lr(1, 0.5);
        assert_eq!(groups.group_lr(1), 0.5);
        assert_eq!(groups.group_lrs(), vec![0.1, 0.5]);
    }

    #[test]
    fn test_group_lrs_default() {
        let opt = TestOptimizer { groups: vec![("backbone", 1e-4), ("head", 1e-3)] };
        assert_eq!(opt.group_lrs(), vec![1e-4, 1e-3]);
        assert_eq!(opt.groups[0].0, "backbone");
    }
}
