//! The reinforcement learning environment a controller is trained against.

use crate::interval::ObsSpace;
use core::fmt;
use serde::{Deserialize, Serialize};

/// One member of an environment's finite, ordered action space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Action(pub usize);

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvResponse {
    pub obs: Vec<f64>,
    pub reward: f64,
    pub is_terminal: bool,
}

pub trait Environment {
    fn obs_space(&self) -> &ObsSpace;

    /// Ordered, non-empty and free of duplicates. Covering and prediction arrays follow this order.
    fn action_space(&self) -> &[Action];

    /// Start a new episode, returning its first observation
    fn reset(&mut self) -> Vec<f64>;

    fn step(&mut self, action: Action) -> EnvResponse;

    fn is_terminal(&self) -> bool;
}

/// When a call to train stops. Counts are relative to the start of that call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingTarget {
    Steps(u64),
    Episodes(u64),
    GaCalls(u64),
}

/// Progress made by a single call to train
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingProgress {
    pub steps: u64,
    pub episodes: u64,
    pub ga_calls: u64,
}

impl TrainingTarget {
    pub fn satisfied(&self, progress: &TrainingProgress) -> bool {
        match *self {
            Self::Steps(t) => t <= progress.steps,
            Self::Episodes(t) => t <= progress.episodes,
            Self::GaCalls(t) => t <= progress.ga_calls,
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Every episode is one step from obs 5 over [0, 9]. Action 0 pays `reward`, anything else 0.
    pub(crate) struct SingleStep {
        obs_space: ObsSpace,
        actions: Vec<Action>,
        reward: f64,
        done: bool,
    }

    impl SingleStep {
        pub(crate) fn new(reward: f64) -> Self {
            Self {
                obs_space: ObsSpace::integer(&[(0, 9)]).unwrap(),
                actions: vec![Action(0), Action(1)],
                reward,
                done: false,
            }
        }
    }

    impl Environment for SingleStep {
        fn obs_space(&self) -> &ObsSpace {
            &self.obs_space
        }

        fn action_space(&self) -> &[Action] {
            &self.actions
        }

        fn reset(&mut self) -> Vec<f64> {
            self.done = false;
            vec![5.]
        }

        fn step(&mut self, action: Action) -> EnvResponse {
            self.done = true;
            EnvResponse {
                obs: vec![5.],
                reward: if action == Action(0) { self.reward } else { 0. },
                is_terminal: true,
            }
        }

        fn is_terminal(&self) -> bool {
            self.done
        }
    }

    /// Deterministic 1d walk over `[0, len)` starting at 0. Action 0 steps left, action 1 steps
    /// right, reaching the far end pays 1 and ends the episode.
    pub(crate) struct Corridor {
        obs_space: ObsSpace,
        actions: Vec<Action>,
        pos: i64,
        len: i64,
    }

    impl Corridor {
        pub(crate) fn new(len: i64) -> Self {
            Self {
                obs_space: ObsSpace::integer(&[(0, len - 1)]).unwrap(),
                actions: vec![Action(0), Action(1)],
                pos: 0,
                len,
            }
        }
    }

    impl Environment for Corridor {
        fn obs_space(&self) -> &ObsSpace {
            &self.obs_space
        }

        fn action_space(&self) -> &[Action] {
            &self.actions
        }

        fn reset(&mut self) -> Vec<f64> {
            self.pos = 0;
            vec![0.]
        }

        fn step(&mut self, action: Action) -> EnvResponse {
            self.pos = match action {
                Action(0) => (self.pos - 1).max(0),
                _ => (self.pos + 1).min(self.len - 1),
            };
            let is_terminal = self.is_terminal();
            EnvResponse {
                obs: vec![self.pos as f64],
                reward: if is_terminal { 1. } else { 0. },
                is_terminal,
            }
        }

        fn is_terminal(&self) -> bool {
            self.pos == self.len - 1
        }
    }

    #[test]
    fn test_training_target() {
        let progress = TrainingProgress {
            steps: 10,
            episodes: 2,
            ga_calls: 0,
        };
        assert!(TrainingTarget::Steps(10).satisfied(&progress));
        assert!(!TrainingTarget::Steps(11).satisfied(&progress));
        assert!(TrainingTarget::Episodes(2).satisfied(&progress));
        assert!(!TrainingTarget::GaCalls(1).satisfied(&progress));
    }

    #[test]
    fn test_corridor() {
        let mut env = Corridor::new(3);
        assert_eq!(env.reset(), vec![0.]);
        assert_eq!(env.step(Action(0)).obs, vec![0.]);
        assert!(!env.step(Action(1)).is_terminal);
        let last = env.step(Action(1));
        assert!(last.is_terminal);
        assert_eq!(last.reward, 1.);
    }
}
