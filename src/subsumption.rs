//! Merging of accurate, experienced classifiers with the more specific rules they cover.

use crate::{
    classifier::{Classifier, ClfrId},
    config::XcsfConfig,
    population::{Op, Population},
};
use tracing::debug;

/// Experienced enough and accurate enough to absorb other rules
#[inline]
pub fn could_subsume(clfr: &Classifier, cfg: &XcsfConfig) -> bool {
    clfr.experience() > cfg.theta_sub && clfr.error() < cfg.epsilon_nought
}

pub fn does_subsume(subsumer: &Classifier, subsumee: &Classifier, cfg: &XcsfConfig) -> bool {
    subsumer.action() == subsumee.action()
        && could_subsume(subsumer, cfg)
        && subsumer.is_more_general(subsumee)
}

/// Pick the most general classifier of the action set able to subsume, and fold into it every
/// member it is more general than. Returns the number of macro-classifiers removed.
pub fn action_set_subsumption(
    pop: &mut Population,
    action_set: &[ClfrId],
    cfg: &XcsfConfig,
) -> usize {
    let members = pop.resolve(action_set);

    let mut best: Option<usize> = None;
    for &idx in &members {
        let clfr = &pop.classifiers()[idx];
        if !could_subsume(clfr, cfg) {
            continue;
        }
        best = match best {
            None => Some(idx),
            Some(b) => {
                let current = &pop.classifiers()[b];
                let replaces = clfr.generality() > current.generality()
                    || (clfr.generality() == current.generality()
                        && clfr.condition().does_subsume(current.condition()));
                if replaces && clfr.id() != current.id() {
                    Some(idx)
                } else {
                    Some(b)
                }
            }
        };
    }
    let Some(best) = best else {
        return 0;
    };

    let subsumer = &pop.classifiers()[best];
    let subsumer_id = subsumer.id();
    let subsumees = members
        .iter()
        .map(|&idx| &pop.classifiers()[idx])
        .filter(|c| subsumer.is_more_general(c))
        .map(|c| (c.id(), c.numerosity()))
        .collect::<Vec<_>>();

    for &(id, numerosity) in &subsumees {
        let Some(idx) = pop.position(id) else {
            continue;
        };
        pop.remove(idx, Op::AsSubsumption);
        if let Some(best) = pop.position(subsumer_id) {
            // counted once, by the removal
            let subsumer = pop.get_mut(best);
            subsumer.set_numerosity(subsumer.numerosity() + numerosity);
        }
    }

    if !subsumees.is_empty() {
        debug!(
            subsumer = %subsumer_id,
            merged = subsumees.len(),
            "action set subsumption"
        );
    }
    subsumees.len()
}
