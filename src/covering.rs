//! Match set formation with covering, so that every action is advocated for every observation.

use crate::{
    classifier::Classifier,
    config::XcsfConfig,
    deletion::deletion,
    encoding::Encoding,
    environment::Action,
    population::{Op, Population},
};
use fxhash::FxHashSet;
use rand::RngCore;
use tracing::trace;

/// Actions of the action space with no classifier in the match set, in action space order
pub fn find_actions_to_cover(
    pop: &Population,
    match_set: &[usize],
    action_space: &[Action],
) -> Vec<Action> {
    let covered = match_set
        .iter()
        .map(|&idx| pop.classifiers()[idx].action())
        .collect::<FxHashSet<_>>();
    action_space
        .iter()
        .copied()
        .filter(|a| !covered.contains(a))
        .collect()
}

/// Everything covering needs to know to build a new classifier
pub struct CoveringCtx<'a> {
    pub encoding: &'a Encoding,
    pub action_space: &'a [Action],
    pub num_weights: usize,
    pub time_step: u64,
    pub cfg: &'a XcsfConfig,
}

pub fn gen_covering_classifier(
    obs: &[f64],
    action: Action,
    ctx: &CoveringCtx,
    rng: &mut impl RngCore,
) -> Classifier {
    Classifier::new(
        ctx.encoding.gen_covering_condition(obs, rng),
        action,
        ctx.time_step,
        ctx.num_weights,
        ctx.cfg.prediction,
        ctx.cfg,
    )
}

/// Indices of the match set for `obs`, after covering every missing action. Deletion runs after
/// each covering classifier, and may take out a rule just added, so coverage is rechecked until
/// nothing is missing.
pub fn gen_match_set(
    pop: &mut Population,
    obs: &[f64],
    ctx: &CoveringCtx,
    rng: &mut impl RngCore,
) -> Vec<usize> {
    loop {
        let match_set = pop.match_set(obs);
        let missing = find_actions_to_cover(pop, &match_set, ctx.action_space);
        if missing.is_empty() {
            break match_set;
        }

        for action in missing {
            let clfr = gen_covering_classifier(obs, action, ctx, rng);
            let id = pop.add_new(clfr, Op::Covering);
            trace!(%id, %action, "covered");
            deletion(pop, ctx.cfg, rng);
        }
    }
}
