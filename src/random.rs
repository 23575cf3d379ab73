//! The single source of randomness for a learning run. Every stochastic decision (covering noise,
//! selection, deletion, crossover, mutation, exploration) draws from one explicitly seeded
//! [WyRng] handed down by reference, so a run is reproducible from its seed alone.

use core::cmp::min;
use rand::RngCore;

/// Map a probability in [0, 1] onto the u64 range, so that a trial is one comparison against
/// [RngCore::next_u64]
pub fn chance(p: f64) -> u64 {
    debug_assert!((0. ..=1.).contains(&p), "probability {p} out of range");
    if p >= 1. {
        u64::MAX
    } else {
        (p * u64::MAX as f64) as u64
    }
}

pub trait Happens: RngCore {
    /// A bernoulli trial which succeeds with probability `p`
    fn happens(&mut self, p: f64) -> bool;
}

impl<T: RngCore> Happens for T {
    fn happens(&mut self, p: f64) -> bool {
        if p <= 0. {
            return false;
        }
        chance(p) >= self.next_u64()
    }
}

/// wyrand, a tiny and fast generator. There is deliberately no way to build one without a seed.
#[derive(Debug, Clone)]
pub struct WyRng {
    state: u64,
}

impl WyRng {
    pub fn seeded(state: u64) -> Self {
        Self { state }
    }
}

impl RngCore for WyRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        const WY_CONST_0: u64 = 0x2d35_8dcc_aa6c_78a5;
        const WY_CONST_1: u64 = 0x8bb8_4b93_962e_acc9;
        self.state = self.state.wrapping_add(WY_CONST_0);
        let t = u128::from(self.state) * u128::from(self.state ^ WY_CONST_1);
        (t as u64) ^ (t >> 64) as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut idx = 0;
        while idx < dst.len() {
            let lim = min(8, dst.len() - idx);
            dst[idx..idx + lim].copy_from_slice(&self.next_u64().to_ne_bytes()[..lim]);
            idx += lim;
        }
    }
}
