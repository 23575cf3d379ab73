//! The learning loop tying the population to an environment.

use crate::{
    action_selection::PredictionArr,
    augmentation::Augmentation,
    classifier::ClfrId,
    config::XcsfConfig,
    covering::{gen_match_set, CoveringCtx},
    encoding::Encoding,
    environment::{Action, Environment, TrainingProgress, TrainingTarget},
    error::{Result, XcsfError},
    ga,
    param_update::update_action_set,
    population::Population,
    random::WyRng,
};
use fxhash::FxHashSet;
use rulinalg::vector::Vector;
use tracing::{debug, trace};

/// What the previous, non terminal, step left to be reinforced once the next step's predictions
/// are known
#[derive(Debug, Clone)]
struct PrevStep {
    action_set: Vec<ClfrId>,
    reward: f64,
    aug_obs: Vector<f64>,
}

/// An XCSF learner bound to an environment. Training can stop at any step and pick up mid episode
/// on the next call.
pub struct Xcsf<E: Environment> {
    env: E,
    cfg: XcsfConfig,
    encoding: Encoding,
    augmentation: Augmentation,
    num_weights: usize,
    pop: Population,
    rng: WyRng,
    time_step: u64,
    num_episodes: u64,
    num_ga_calls: u64,
    curr_obs: Option<Vec<f64>>,
    prev: Option<PrevStep>,
}

impl<E: Environment> Xcsf<E> {
    pub fn new(env: E, cfg: XcsfConfig) -> Result<Self> {
        Self::with_population(env, cfg, Population::new())
    }

    /// Resume learning from a population snapshot
    pub fn with_population(env: E, cfg: XcsfConfig, pop: Population) -> Result<Self> {
        cfg.validate()?;

        let action_space = env.action_space();
        if action_space.is_empty() {
            return Err(XcsfError::InvalidConfig("empty action space".into()));
        }
        if action_space.iter().collect::<FxHashSet<_>>().len() != action_space.len() {
            return Err(XcsfError::InvalidConfig(
                "duplicate actions in action space".into(),
            ));
        }
        if cfg.max_population < action_space.len() {
            return Err(XcsfError::InvalidConfig(format!(
                "N = {} cannot cover {} actions",
                cfg.max_population,
                action_space.len()
            )));
        }

        let encoding = Encoding::new(env.obs_space().clone(), cfg.r_nought, cfg.m_nought)?;
        let augmentation = Augmentation::from_poly_order(cfg.poly_order)?;
        let num_weights = augmentation.num_weights(env.obs_space().len());

        for clfr in pop.iter() {
            if clfr.condition().len() != env.obs_space().len()
                || clfr.weight_vec().size() != num_weights
            {
                return Err(XcsfError::InvalidConfig(format!(
                    "classifier {} does not fit this environment and polynomial order",
                    clfr.id()
                )));
            }
        }

        let rng = WyRng::seeded(cfg.seed);
        Ok(Self {
            env,
            cfg,
            encoding,
            augmentation,
            num_weights,
            pop,
            rng,
            time_step: 0,
            num_episodes: 0,
            num_ga_calls: 0,
            curr_obs: None,
            prev: None,
        })
    }

    #[inline]
    pub fn population(&self) -> &Population {
        &self.pop
    }

    #[inline]
    pub fn config(&self) -> &XcsfConfig {
        &self.cfg
    }

    #[inline]
    pub fn env(&self) -> &E {
        &self.env
    }

    #[inline]
    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    #[inline]
    pub fn num_episodes(&self) -> u64 {
        self.num_episodes
    }

    #[inline]
    pub fn num_ga_calls(&self) -> u64 {
        self.num_ga_calls
    }

    pub fn into_population(self) -> Population {
        self.pop
    }

    /// Train until `target` is met, counting from this call
    pub fn train(&mut self, target: TrainingTarget) -> Result<TrainingProgress> {
        let mut progress = TrainingProgress::default();
        while !target.satisfied(&progress) {
            self.train_step(&mut progress)?;
        }
        Ok(progress)
    }

    pub fn train_for_steps(&mut self, num_steps: u64) -> Result<TrainingProgress> {
        self.train(TrainingTarget::Steps(num_steps))
    }

    pub fn train_for_episodes(&mut self, num_episodes: u64) -> Result<TrainingProgress> {
        self.train(TrainingTarget::Episodes(num_episodes))
    }

    pub fn train_for_ga_calls(&mut self, num_ga_calls: u64) -> Result<TrainingProgress> {
        self.train(TrainingTarget::GaCalls(num_ga_calls))
    }

    /// Greedy action for `obs` under the current population. Nothing is learned or covered.
    pub fn select_action(&self, obs: &[f64]) -> Result<Action> {
        self.gen_prediction_arr(obs)?.greedy_action()
    }

    /// Per action predictions for `obs`, without covering
    pub fn gen_prediction_arr(&self, obs: &[f64]) -> Result<PredictionArr> {
        self.check_obs(obs)?;
        let aug_obs = self.augmentation.augment(obs, self.cfg.x_nought);
        let match_set = self.pop.match_set(obs);
        Ok(PredictionArr::new(
            &self.pop,
            &match_set,
            &aug_obs,
            self.env.action_space(),
        ))
    }

    /// Covering can only match observations inside of the space, so anything else is refused
    fn check_obs(&self, obs: &[f64]) -> Result<()> {
        let expected = self.env.obs_space().len();
        if obs.len() != expected {
            return Err(XcsfError::ObsDimMismatch {
                expected,
                got: obs.len(),
            });
        }
        if !self.env.obs_space().contains(obs) {
            return Err(XcsfError::ObsOutOfSpace(obs.to_vec()));
        }
        Ok(())
    }

    fn train_step(&mut self, progress: &mut TrainingProgress) -> Result<()> {
        let obs = match self.curr_obs.take() {
            Some(obs) if !self.env.is_terminal() => obs,
            _ => self.env.reset(),
        };
        self.check_obs(&obs)?;
        let aug_obs = self.augmentation.augment(&obs, self.cfg.x_nought);

        let (action, action_set, prediction_arr) = {
            let ctx = CoveringCtx {
                encoding: &self.encoding,
                action_space: self.env.action_space(),
                num_weights: self.num_weights,
                time_step: self.time_step,
                cfg: &self.cfg,
            };
            let match_set = gen_match_set(&mut self.pop, &obs, &ctx, &mut self.rng);
            let prediction_arr =
                PredictionArr::new(&self.pop, &match_set, &aug_obs, ctx.action_space);
            let action = self.cfg.action_selection.select(
                &prediction_arr,
                ctx.action_space,
                self.time_step,
                &mut self.rng,
            )?;
            let action_set = match_set
                .iter()
                .map(|&idx| &self.pop.classifiers()[idx])
                .filter(|c| c.action() == action)
                .map(|c| c.id())
                .collect::<Vec<_>>();
            (action, action_set, prediction_arr)
        };
        trace!(time_step = self.time_step, %action, "act");

        let response = self.env.step(action);

        if let Some(prev) = self.prev.take() {
            let bootstrap = prediction_arr.max_prediction().unwrap_or(0.);
            let payoff = prev.reward + self.cfg.gamma * bootstrap;
            self.reinforce(&prev.action_set, payoff, &prev.aug_obs, progress);
        }

        if response.is_terminal {
            self.reinforce(&action_set, response.reward, &aug_obs, progress);
            self.curr_obs = None;
            self.num_episodes += 1;
            progress.episodes += 1;
            debug!(
                time_step = self.time_step,
                episodes = self.num_episodes,
                macros = self.pop.num_macros(),
                micros = self.pop.num_micros(),
                "episode end"
            );
        } else {
            self.prev = Some(PrevStep {
                action_set,
                reward: response.reward,
                aug_obs,
            });
            self.curr_obs = Some(response.obs);
        }

        self.time_step += 1;
        progress.steps += 1;
        Ok(())
    }

    /// Update an action set toward `payoff`, then give the GA a chance to run on it
    fn reinforce(
        &mut self,
        action_set: &[ClfrId],
        payoff: f64,
        aug_obs: &Vector<f64>,
        progress: &mut TrainingProgress,
    ) {
        update_action_set(&mut self.pop, action_set, payoff, aug_obs, &self.cfg);

        if ga::should_run(&self.pop, action_set, self.time_step, &self.cfg) {
            ga::run_ga(
                &mut self.pop,
                action_set,
                self.time_step,
                &self.encoding,
                self.env.action_space(),
                &self.cfg,
                &mut self.rng,
            );
            self.num_ga_calls += 1;
            progress.ga_calls += 1;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        action_selection::ActionSelection,
        environment::{
            test::{Corridor, SingleStep},
            EnvResponse,
        },
        interval::ObsSpace,
        prediction::PredictionStrategy,
        test_t,
    };

    fn greedy_cfg() -> XcsfConfig {
        XcsfConfig {
            action_selection: ActionSelection::FixedEpsilonGreedy { epsilon: 0. },
            ..XcsfConfig::default()
        }
    }

    #[test]
    fn test_single_terminal_step() {
        let mut xcsf = Xcsf::new(SingleStep::new(1.), greedy_cfg()).unwrap();
        let progress = xcsf.train_for_steps(1).unwrap();
        assert_eq!(progress.steps, 1);
        assert_eq!(progress.episodes, 1);
        assert_eq!(xcsf.time_step(), 1);

        let pop = xcsf.population();
        assert!(pop.num_macros() >= 2);
        let acted = pop.iter().find(|c| c.action() == Action(0)).unwrap();
        assert_eq!(acted.experience(), 1);
        assert!(pop
            .iter()
            .filter(|c| c.action() == Action(1))
            .all(|c| c.experience() == 0));
    }

    test_t!(deterministic[strategy: rls = PredictionStrategy::Rls, nlms = PredictionStrategy::Nlms]() {
        let cfg = XcsfConfig {
            seed: 42,
            max_population: 40,
            theta_ga: 5,
            prediction: strategy,
            ..XcsfConfig::default()
        };
        let mut l = Xcsf::new(Corridor::new(6), cfg.clone()).unwrap();
        let mut r = Xcsf::new(Corridor::new(6), cfg).unwrap();
        l.train_for_steps(400).unwrap();
        r.train_for_steps(400).unwrap();

        assert_eq!(l.num_episodes(), r.num_episodes());
        assert_eq!(l.num_ga_calls(), r.num_ga_calls());
        assert_eq!(l.population().ops(), r.population().ops());
        assert_eq!(l.population().num_macros(), r.population().num_macros());
        for (lc, rc) in l.population().iter().zip(r.population().iter()) {
            assert_eq!(lc.id(), rc.id());
            assert!(lc.full_eq(rc, 0.), "{lc} != {rc}");
        }
    });

    #[test]
    fn test_population_bounded() {
        let cfg = XcsfConfig {
            max_population: 10,
            theta_ga: 2,
            ..XcsfConfig::default()
        };
        let mut xcsf = Xcsf::new(Corridor::new(8), cfg).unwrap();
        for _ in 0..20 {
            xcsf.train_for_steps(25).unwrap();
            assert!(xcsf.population().num_micros() <= 10);
            assert!(xcsf.population().num_macros() >= 1);
            assert!(xcsf.population().iter().all(|c| c.error() >= 0.));
        }
        assert!(xcsf.num_ga_calls() > 0);
    }

    #[test]
    fn test_training_targets() {
        let mut xcsf = Xcsf::new(SingleStep::new(1.), XcsfConfig::default()).unwrap();
        let progress = xcsf.train_for_episodes(5).unwrap();
        assert_eq!(progress.steps, 5);
        assert_eq!(xcsf.num_episodes(), 5);

        let cfg = XcsfConfig {
            theta_ga: 0,
            ..XcsfConfig::default()
        };
        let mut xcsf = Xcsf::new(SingleStep::new(1.), cfg).unwrap();
        let progress = xcsf.train_for_ga_calls(3).unwrap();
        assert_eq!(progress.ga_calls, 3);
        assert_eq!(xcsf.num_ga_calls(), 3);
    }

    #[test]
    fn test_resumes_mid_episode() {
        let mut split = Xcsf::new(Corridor::new(10), greedy_cfg()).unwrap();
        let mut whole = Xcsf::new(Corridor::new(10), greedy_cfg()).unwrap();
        for _ in 0..30 {
            split.train_for_steps(1).unwrap();
        }
        whole.train_for_steps(30).unwrap();
        assert_eq!(split.time_step(), whole.time_step());
        assert_eq!(split.num_episodes(), whole.num_episodes());
        for (l, r) in split.population().iter().zip(whole.population().iter()) {
            assert!(l.full_eq(r, 0.));
        }
    }

    #[test]
    fn test_inference_is_pure() {
        let mut xcsf = Xcsf::new(SingleStep::new(1.), XcsfConfig::default()).unwrap();
        assert!(matches!(xcsf.select_action(&[5.]), Err(XcsfError::NoAction)));
        assert!(matches!(
            xcsf.select_action(&[5., 5.]),
            Err(XcsfError::ObsDimMismatch { expected: 1, got: 2 })
        ));

        xcsf.train_for_steps(200).unwrap();
        let ops = *xcsf.population().ops();
        let arr = xcsf.gen_prediction_arr(&[5.]).unwrap();
        assert_eq!(arr.entries().len(), 2);
        // action 0 pays 1 and action 1 pays nothing
        assert_eq!(xcsf.select_action(&[5.]).unwrap(), Action(0));
        assert_eq!(*xcsf.population().ops(), ops);
    }

    /// Integer space over [0, 9] whose every observation is `obs`
    struct Stuck {
        obs_space: ObsSpace,
        actions: Vec<Action>,
        obs: f64,
    }

    impl Environment for Stuck {
        fn obs_space(&self) -> &ObsSpace {
            &self.obs_space
        }

        fn action_space(&self) -> &[Action] {
            &self.actions
        }

        fn reset(&mut self) -> Vec<f64> {
            vec![self.obs]
        }

        fn step(&mut self, _: Action) -> EnvResponse {
            EnvResponse {
                obs: vec![self.obs],
                reward: 0.,
                is_terminal: true,
            }
        }

        fn is_terminal(&self) -> bool {
            true
        }
    }

    test_t!(obs_out_of_space[obs: above = 10., below = -1., fractional = 2.5, nan = f64::NAN]() {
        let env = Stuck {
            obs_space: ObsSpace::integer(&[(0, 9)]).unwrap(),
            actions: vec![Action(0), Action(1)],
            obs,
        };
        let cfg = XcsfConfig {
            max_population: 4,
            ..XcsfConfig::default()
        };
        let mut xcsf = Xcsf::new(env, cfg).unwrap();
        assert!(matches!(
            xcsf.train_for_steps(1),
            Err(XcsfError::ObsOutOfSpace(_))
        ));
        assert_eq!(xcsf.population().num_macros(), 0);
        assert_eq!(xcsf.time_step(), 0);
        assert!(matches!(
            xcsf.select_action(&[obs]),
            Err(XcsfError::ObsOutOfSpace(_))
        ));
    });

    #[test]
    fn test_learns_single_step_values() {
        let cfg = XcsfConfig {
            prediction: PredictionStrategy::Nlms,
            ..XcsfConfig::default()
        };
        let mut xcsf = Xcsf::new(SingleStep::new(1.), cfg).unwrap();
        xcsf.train_for_steps(500).unwrap();
        let arr = xcsf.gen_prediction_arr(&[5.]).unwrap();
        assert!((arr.get(Action(0)).unwrap() - 1.).abs() < 0.15);
        assert!(arr.get(Action(1)).unwrap().abs() < 0.15);
    }

    #[test]
    fn test_invalid_setups() {
        let cfg = XcsfConfig {
            max_population: 1,
            ..XcsfConfig::default()
        };
        assert!(matches!(
            Xcsf::new(SingleStep::new(1.), cfg),
            Err(XcsfError::InvalidConfig(_))
        ));

        let mut trained = Xcsf::new(Corridor::new(4), XcsfConfig::default()).unwrap();
        trained.train_for_steps(10).unwrap();
        let quadratic = XcsfConfig {
            poly_order: 2,
            ..XcsfConfig::default()
        };
        assert!(matches!(
            Xcsf::with_population(Corridor::new(4), quadratic, trained.into_population()),
            Err(XcsfError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_with_population() {
        let mut xcsf = Xcsf::new(Corridor::new(5), XcsfConfig::default()).unwrap();
        xcsf.train_for_steps(50).unwrap();
        let snapshot = Population::from_str(&xcsf.population().to_string().unwrap()).unwrap();
        let macros = snapshot.num_macros();

        let resumed =
            Xcsf::with_population(Corridor::new(5), XcsfConfig::default(), snapshot).unwrap();
        assert_eq!(resumed.population().num_macros(), macros);
        assert_eq!(
            resumed.select_action(&[0.]).unwrap(),
            xcsf.select_action(&[0.]).unwrap()
        );
    }
}
