//! Mapping between condition genotypes (alleles) and phenotypes (intervals), along with the
//! genetic operators that act on alleles.
//!
//! Both encodings are "unordered bound": each dimension is encoded by a pair of alleles, and the
//! interval is `[min(pair), max(pair)]`. Mutation may freely swap which allele is the lower
//! bound without ever producing an inverted interval.

use crate::{
    condition::Condition,
    error::{Result, XcsfError},
    interval::{DimKind, Dimension, Interval, ObsSpace},
    random::Happens,
};
use core::cmp::Ordering;
use rand::{seq::SliceRandom, Rng, RngCore};
use rand_distr::{Distribution, Uniform};

const GENERALITY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub enum Encoding {
    /// Alleles are whole numbers, intervals count the integers they contain
    IntegerUnorderedBound {
        dims: Vec<Dimension>,
        /// distance of a covering bound from the observation, `0..=r_nought`
        cover_noise: Uniform<i64>,
        /// magnitude of a mutation, `1..=m_nought`
        mutation_noise: Uniform<i64>,
    },
    /// Alleles are reals, noise is drawn relative to each dimension's span
    RealUnorderedBound {
        dims: Vec<Dimension>,
        /// per dimension, `0..=r_nought * span`
        cover_noise: Vec<Uniform<f64>>,
        /// per dimension, `0..=m_nought * span`
        mutation_noise: Vec<Uniform<f64>>,
    },
}

impl Encoding {
    /// Build the encoding matching the kind of `obs_space`.
    ///
    /// For integer spaces `r_nought` and `m_nought` are absolute whole distances. For real spaces
    /// they are fractions in (0, 1] of each dimension's span.
    pub fn new(obs_space: ObsSpace, r_nought: f64, m_nought: f64) -> Result<Self> {
        let dims = obs_space.dims().to_vec();
        match obs_space.kind() {
            DimKind::Integer => {
                if r_nought < 0. || r_nought.fract() != 0. {
                    return Err(XcsfError::InvalidConfig(format!(
                        "r_nought must be a whole number >= 0 for integer encoding, got {r_nought}"
                    )));
                }
                if m_nought < 1. || m_nought.fract() != 0. {
                    return Err(XcsfError::InvalidConfig(format!(
                        "m_nought must be a whole number >= 1 for integer encoding, got {m_nought}"
                    )));
                }
                Ok(Self::IntegerUnorderedBound {
                    dims,
                    cover_noise: uniform_int(0, r_nought as i64)?,
                    mutation_noise: uniform_int(1, m_nought as i64)?,
                })
            }
            DimKind::Real => {
                for (name, v) in [("r_nought", r_nought), ("m_nought", m_nought)] {
                    if !(v > 0. && v <= 1.) {
                        return Err(XcsfError::InvalidConfig(format!(
                            "{name} must be in (0, 1] for real encoding, got {v}"
                        )));
                    }
                }
                Ok(Self::RealUnorderedBound {
                    cover_noise: dims
                        .iter()
                        .map(|dim| uniform_real(r_nought * dim.span()))
                        .collect::<Result<_>>()?,
                    mutation_noise: dims
                        .iter()
                        .map(|dim| uniform_real(m_nought * dim.span()))
                        .collect::<Result<_>>()?,
                    dims,
                })
            }
        }
    }

    #[inline]
    pub fn dims(&self) -> &[Dimension] {
        match self {
            Self::IntegerUnorderedBound { dims, .. } | Self::RealUnorderedBound { dims, .. } => {
                dims
            }
        }
    }

    #[inline]
    pub fn kind(&self) -> DimKind {
        match self {
            Self::IntegerUnorderedBound { .. } => DimKind::Integer,
            Self::RealUnorderedBound { .. } => DimKind::Real,
        }
    }

    /// Cardinality of an interval: integer intervals count their endpoints
    #[inline]
    fn interval_span(&self, interval: &Interval) -> f64 {
        match self {
            Self::IntegerUnorderedBound { .. } => interval.span() + 1.,
            Self::RealUnorderedBound { .. } => interval.span(),
        }
    }

    #[inline]
    fn dim_span(&self, dim: &Dimension) -> f64 {
        match self {
            Self::IntegerUnorderedBound { .. } => dim.span() + 1.,
            Self::RealUnorderedBound { .. } => dim.span(),
        }
    }

    /// A condition matching `obs`, whose bounds sit a random distance either side of it
    pub fn gen_covering_condition(&self, obs: &[f64], rng: &mut impl RngCore) -> Condition {
        assert_eq!(obs.len(), self.dims().len(), "observation dimensionality");
        let mut alleles = Vec::with_capacity(obs.len() * 2);
        for (idx, (&v, dim)) in obs.iter().zip(self.dims()).enumerate() {
            let (lower, upper) = match self {
                Self::IntegerUnorderedBound { cover_noise, .. } => (
                    v - cover_noise.sample(rng) as f64,
                    v + cover_noise.sample(rng) as f64,
                ),
                Self::RealUnorderedBound { cover_noise, .. } => (
                    v - cover_noise[idx].sample(rng),
                    v + cover_noise[idx].sample(rng),
                ),
            };
            // insert in random order so neither allele of a pair is biased toward a bound
            let mut pair = [dim.clip(lower), dim.clip(upper)];
            pair.shuffle(rng);
            alleles.extend_from_slice(&pair);
        }
        Condition::new(alleles, self)
    }

    pub fn decode(&self, alleles: &[f64]) -> Vec<Interval> {
        assert_eq!(alleles.len() % 2, 0, "odd number of alleles");
        alleles
            .chunks_exact(2)
            .map(|pair| Interval::new(pair[0].min(pair[1]), pair[0].max(pair[1])))
            .collect()
    }

    /// Sum of interval spans normalized by the sum of dimension spans, as in Wilson '00
    pub fn calc_condition_generality(&self, phenotype: &[Interval]) -> f64 {
        assert_eq!(phenotype.len(), self.dims().len(), "phenotype dimensionality");
        let numer = phenotype
            .iter()
            .map(|i| self.interval_span(i))
            .sum::<f64>();
        let denom = self.dims().iter().map(|d| self.dim_span(d)).sum::<f64>();
        let generality = numer / denom;
        debug_assert!(
            (0. ..=1. + GENERALITY_TOLERANCE).contains(&generality),
            "generality {generality} out of range"
        );
        generality
    }

    /// Indices of the phenotype ordered by ascending span relative to the dimension's span
    pub fn calc_matching_idx_order(&self, phenotype: &[Interval]) -> Vec<usize> {
        let mut fracs = phenotype
            .iter()
            .zip(self.dims())
            .map(|(i, d)| self.interval_span(i) / self.dim_span(d))
            .enumerate()
            .collect::<Vec<_>>();
        fracs.sort_by(|(_, l), (_, r)| l.partial_cmp(r).unwrap_or(Ordering::Equal));
        fracs.into_iter().map(|(idx, _)| idx).collect()
    }

    /// Independently mutate each allele with probability `mu`, by adding signed noise and clipping
    /// to the bounds of the allele's dimension
    pub fn mutate_condition_alleles(
        &self,
        alleles: &[f64],
        mu: f64,
        rng: &mut impl RngCore,
    ) -> Vec<f64> {
        assert_eq!(alleles.len(), self.dims().len() * 2, "allele count");
        alleles
            .iter()
            .enumerate()
            .map(|(a_idx, &allele)| {
                if !rng.happens(mu) {
                    return allele;
                }
                let d_idx = a_idx / 2;
                let noise = match self {
                    Self::IntegerUnorderedBound { mutation_noise, .. } => {
                        mutation_noise.sample(rng) as f64
                    }
                    Self::RealUnorderedBound { mutation_noise, .. } => {
                        mutation_noise[d_idx].sample(rng)
                    }
                };
                let sign = if rng.random::<bool>() { 1. } else { -1. };
                self.dims()[d_idx].clip(allele + sign * noise)
            })
            .collect()
    }
}

fn uniform_int(low: i64, high: i64) -> Result<Uniform<i64>> {
    Uniform::new_inclusive(low, high)
        .map_err(|e| XcsfError::InvalidConfig(format!("noise range {low}..={high}: {e}")))
}

fn uniform_real(high: f64) -> Result<Uniform<f64>> {
    Uniform::new_inclusive(0., high)
        .map_err(|e| XcsfError::InvalidConfig(format!("noise range 0..={high}: {e}")))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{random::WyRng, test_t};

    fn integer() -> Encoding {
        Encoding::new(ObsSpace::integer(&[(0, 9), (-5, 5)]).unwrap(), 2., 3.).unwrap()
    }

    fn real() -> Encoding {
        Encoding::new(ObsSpace::real(&[(0., 1.), (-10., 10.)]).unwrap(), 0.1, 0.5).unwrap()
    }

    fn obs_for(enc: &Encoding, rng: &mut impl RngCore) -> Vec<f64> {
        enc.dims()
            .iter()
            .map(|d| match enc.kind() {
                DimKind::Integer => rng.random_range(d.lower as i64..=d.upper as i64) as f64,
                DimKind::Real => rng.random_range(d.lower..=d.upper),
            })
            .collect()
    }

    #[test]
    fn test_invalid_noise() {
        let int_space = ObsSpace::integer(&[(0, 9)]).unwrap();
        let real_space = ObsSpace::real(&[(0., 1.)]).unwrap();
        assert!(Encoding::new(int_space.clone(), 1.5, 1.).is_err());
        assert!(Encoding::new(int_space.clone(), 1., 0.).is_err());
        assert!(Encoding::new(int_space, 0., 1.).is_ok());
        assert!(Encoding::new(real_space.clone(), 0., 0.5).is_err());
        assert!(Encoding::new(real_space.clone(), 0.5, 1.5).is_err());
        assert!(Encoding::new(real_space, 1., 1.).is_ok());
    }

    test_t!(covering_matches[enc: integer = integer(), real = real()]() {
        let mut rng = WyRng::seeded(3);
        for _ in 0..1_000 {
            let obs = obs_for(&enc, &mut rng);
            let cond = enc.gen_covering_condition(&obs, &mut rng);
            assert!(cond.does_match(&obs), "{cond} does not match {obs:?}");
            assert_eq!(cond.alleles().len(), 2 * obs.len());
            for (i, d) in cond.phenotype().iter().zip(enc.dims()) {
                assert!(d.lower <= i.lower() && i.upper() <= d.upper);
            }
        }
    });

    #[test]
    fn test_integer_covering_radius() {
        let enc = integer();
        let mut rng = WyRng::seeded(9);
        for _ in 0..1_000 {
            let cond = enc.gen_covering_condition(&[5., 0.], &mut rng);
            for (i, v) in cond.phenotype().iter().zip([5., 0.]) {
                assert!(v - i.lower() <= 2. && i.upper() - v <= 2.);
                assert_eq!(i.lower().fract(), 0.);
                assert_eq!(i.upper().fract(), 0.);
            }
        }
    }

    #[test]
    fn test_covering_clipped() {
        let enc = integer();
        let mut rng = WyRng::seeded(11);
        for _ in 0..100 {
            let cond = enc.gen_covering_condition(&[0., 5.], &mut rng);
            assert_eq!(cond.phenotype()[0].lower(), 0.);
            assert_eq!(cond.phenotype()[1].upper(), 5.);
        }
    }

    #[test]
    fn test_generality() {
        let enc = integer();
        // (3 + 1) + (0 + 1) over (9 + 1) + (10 + 1)
        let cond = Condition::new(vec![2., 5., 1., 1.], &enc);
        assert!((cond.generality() - 5. / 21.).abs() < 1e-12);

        let enc = real();
        // 0.5 + 5 over 1 + 20
        let cond = Condition::new(vec![0.5, 0., 0., 5.], &enc);
        assert!((cond.generality() - 5.5 / 21.).abs() < 1e-12);

        // a real condition may collapse to a point
        let cond = Condition::new(vec![0.5, 0.5, 1., 1.], &enc);
        assert_eq!(cond.generality(), 0.);
    }

    test_t!(mutation_bounded[enc: integer = integer(), real = real()]() {
        let mut rng = WyRng::seeded(5);
        let obs = obs_for(&enc, &mut rng);
        let mut alleles = enc.gen_covering_condition(&obs, &mut rng).alleles().to_vec();
        for _ in 0..1_000 {
            alleles = enc.mutate_condition_alleles(&alleles, 0.5, &mut rng);
            assert_eq!(alleles.len() % 2, 0);
            assert_eq!(alleles.len(), 2 * enc.dims().len());
            let cond = Condition::new(alleles.clone(), &enc);
            for (i, d) in cond.phenotype().iter().zip(enc.dims()) {
                assert!(d.lower <= i.lower() && i.upper() <= d.upper);
                if enc.kind() == DimKind::Integer {
                    assert_eq!(i.lower().fract(), 0.);
                    assert_eq!(i.upper().fract(), 0.);
                }
            }
        }
    });

    test_t!(mutation_rate_zero[enc: integer = integer(), real = real()]() {
        let mut rng = WyRng::seeded(6);
        let obs = obs_for(&enc, &mut rng);
        let alleles = enc.gen_covering_condition(&obs, &mut rng).alleles().to_vec();
        assert_eq!(alleles, enc.mutate_condition_alleles(&alleles, 0., &mut rng));
    });

    #[test]
    fn test_integer_mutation_moves() {
        let enc = integer();
        let mut rng = WyRng::seeded(8);
        let alleles = vec![4., 5., 0., 0.];
        for _ in 0..100 {
            let mutated = enc.mutate_condition_alleles(&alleles, 1., &mut rng);
            for (before, after) in alleles.iter().zip(&mutated) {
                let moved = (before - after).abs();
                // noise is 1..=3, so an allele only stays put if clipping is impossible here
                assert!((1. ..=3.).contains(&moved), "{before} -> {after}");
            }
        }
    }
}
