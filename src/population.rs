use crate::{
    classifier::{Classifier, ClfrId},
    constants::XCSF_NUMEROSITY_MIN,
    error::Result,
};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::trace;

/// Population operations, tallied for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Covering,
    Insertion,
    Absorption,
    Deletion,
    GaSubsumption,
    AsSubsumption,
}

/// How many of each [Op] a population has gone through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationOps {
    pub covering: u64,
    pub insertion: u64,
    pub absorption: u64,
    pub deletion: u64,
    pub ga_subsumption: u64,
    pub as_subsumption: u64,
}

impl PopulationOps {
    fn record(&mut self, op: Op) {
        let counter = match op {
            Op::Covering => &mut self.covering,
            Op::Insertion => &mut self.insertion,
            Op::Absorption => &mut self.absorption,
            Op::Deletion => &mut self.deletion,
            Op::GaSubsumption => &mut self.ga_subsumption,
            Op::AsSubsumption => &mut self.as_subsumption,
        };
        *counter += 1;
    }
}

/// Ordered macro-classifiers. No two members share a (condition, action) when every rule enters
/// through [Population::insert] or covering, and every member has a unique [ClfrId].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Population {
    clfrs: Vec<Classifier>,
    next_id: u64,
    ops: PopulationOps,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn num_macros(&self) -> usize {
        self.clfrs.len()
    }

    pub fn num_micros(&self) -> u64 {
        self.clfrs.iter().map(|c| u64::from(c.numerosity())).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clfrs.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Classifier> {
        self.clfrs.iter()
    }

    #[inline]
    pub fn classifiers(&self) -> &[Classifier] {
        &self.clfrs
    }

    #[inline]
    pub fn ops(&self) -> &PopulationOps {
        &self.ops
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: usize) -> &mut Classifier {
        &mut self.clfrs[idx]
    }

    pub fn position(&self, id: ClfrId) -> Option<usize> {
        self.clfrs.iter().position(|c| c.id() == id)
    }

    pub fn by_id(&self, id: ClfrId) -> Option<&Classifier> {
        self.position(id).map(|idx| &self.clfrs[idx])
    }

    /// Current indices of `ids`, in the same order. Ids no longer in the population are skipped.
    pub fn resolve(&self, ids: &[ClfrId]) -> Vec<usize> {
        let index: FxHashMap<ClfrId, usize> = self
            .clfrs
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.id(), idx))
            .collect();
        ids.iter().filter_map(|id| index.get(id).copied()).collect()
    }

    /// Indices of every member whose condition matches `obs`
    pub fn match_set(&self, obs: &[f64]) -> Vec<usize> {
        self.clfrs
            .iter()
            .enumerate()
            .filter(|(_, c)| c.does_match(obs))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Append a rule under a fresh id. Callers ensure it duplicates no member.
    pub(crate) fn add_new(&mut self, mut clfr: Classifier, op: Op) -> ClfrId {
        let id = ClfrId(self.next_id);
        self.next_id += 1;
        clfr.id = id;
        trace!(op = ?op, "add {clfr}");
        self.clfrs.push(clfr);
        self.ops.record(op);
        id
    }

    pub(crate) fn alter_numerosity(&mut self, idx: usize, delta: i64, op: Op) {
        let clfr = &mut self.clfrs[idx];
        let numerosity = i64::from(clfr.numerosity()) + delta;
        assert!(
            numerosity >= i64::from(XCSF_NUMEROSITY_MIN),
            "numerosity of {} would fall to {numerosity}",
            clfr.id()
        );
        clfr.set_numerosity(numerosity as u32);
        trace!(op = ?op, delta, "alter {}", clfr.id());
        self.ops.record(op);
    }

    /// Remove a macro-classifier entirely, keeping the order of the rest
    pub(crate) fn remove(&mut self, idx: usize, op: Op) -> Classifier {
        let clfr = self.clfrs.remove(idx);
        trace!(op = ?op, "remove {}", clfr.id());
        self.ops.record(op);
        clfr
    }

    /// Absorb `clfr` into a member with the same (condition, action), or append it
    pub(crate) fn insert(&mut self, clfr: Classifier) -> ClfrId {
        match self.clfrs.iter().position(|c| c.is_duplicate_of(&clfr)) {
            Some(idx) => {
                self.alter_numerosity(idx, i64::from(clfr.numerosity()), Op::Absorption);
                self.clfrs[idx].id()
            }
            None => self.add_new(clfr, Op::Insertion),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_str(&fs::read_to_string(path)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Ok(fs::write(path, self.to_string()?)?)
    }
}
