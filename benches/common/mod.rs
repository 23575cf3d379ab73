use rand::Rng;
use xcsf::{Action, EnvResponse, Environment, ObsSpace, WyRng};

/// Single step environment over the unit square, paying `x + y` for action 0 and `x - y` for
/// action 1. Observations come from a seeded `WyRng` so benches are repeatable.
pub struct Plane {
    obs_space: ObsSpace,
    actions: Vec<Action>,
    rng: WyRng,
    obs: Vec<f64>,
}

impl Plane {
    pub fn new(seed: u64) -> Self {
        Self {
            obs_space: ObsSpace::real(&[(0., 1.), (0., 1.)]).unwrap(),
            actions: vec![Action(0), Action(1)],
            rng: WyRng::seeded(seed),
            obs: vec![0., 0.],
        }
    }
}

impl Environment for Plane {
    fn obs_space(&self) -> &ObsSpace {
        &self.obs_space
    }

    fn action_space(&self) -> &[Action] {
        &self.actions
    }

    fn reset(&mut self) -> Vec<f64> {
        self.obs = vec![self.rng.random::<f64>(), self.rng.random::<f64>()];
        self.obs.clone()
    }

    fn step(&mut self, action: Action) -> EnvResponse {
        let reward = match action {
            Action(0) => self.obs[0] + self.obs[1],
            _ => self.obs[0] - self.obs[1],
        };
        EnvResponse {
            obs: self.obs.clone(),
            reward,
            is_terminal: true,
        }
    }

    fn is_terminal(&self) -> bool {
        true
    }
}
