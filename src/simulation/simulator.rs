use crate::card::Card;
use crate::rng::DeckRng;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Trials per independently seeded chunk. Fixed so results do not depend on
/// how many threads rayon happens to use.
const TRIALS_PER_CHUNK: usize = 1024;

pub const DEFAULT_TRIALS: usize = 20_000;

/// Opening hand and early land drop percentages, each in [0, 100]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub trials: usize,
    pub keepable_7_pct: f64,
    pub keepable_6_pct: f64,
    pub at_least_2_lands_in_7_pct: f64,
    pub hit_3rd_land_by_turn_3_on_play_pct: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    keep7: usize,
    keep6: usize,
    two_in_7: usize,
    three_in_10: usize,
}

impl Tally {
    fn merge(self, other: Tally) -> Tally {
        Tally {
            keep7: self.keep7 + other.keep7,
            keep6: self.keep6 + other.keep6,
            two_in_7: self.two_in_7 + other.two_in_7,
            three_in_10: self.three_in_10 + other.three_in_10,
        }
    }
}

fn keepable(lands: usize) -> bool {
    (2..=4).contains(&lands)
}

fn run_chunk(is_land: &[bool], trials: usize, rng: &mut DeckRng) -> Tally {
    let mut order: Vec<usize> = (0..is_land.len()).collect();
    let mut tally = Tally::default();

    for _ in 0..trials {
        rng.shuffle(&mut order);
        let lands_in = |n: usize| order.iter().take(n).filter(|&&i| is_land[i]).count();

        let lands7 = lands_in(7);
        if keepable(lands7) {
            tally.keep7 += 1;
        }
        if lands7 >= 2 {
            tally.two_in_7 += 1;
        }
        if keepable(lands_in(6)) {
            tally.keep6 += 1;
        }
        // Opening seven plus three draws
        if lands_in(10) >= 3 {
            tally.three_in_10 += 1;
        }
    }
    tally
}

/// Monte Carlo estimate of opening hand quality over `trials` shuffles.
///
/// Trials are split into fixed-size chunks run in parallel; chunk `i` draws
/// from stream `i` of `seed`, so a given (deck, trials, seed) always yields
/// the same numbers.
pub fn simulate(deck: &[Card], trials: usize, seed: u64) -> SimulationStats {
    if trials == 0 || deck.is_empty() {
        return SimulationStats {
            trials,
            ..SimulationStats::default()
        };
    }

    let is_land: Vec<bool> = deck.iter().map(Card::is_land).collect();
    let chunks = trials.div_ceil(TRIALS_PER_CHUNK);
    debug!(
        "Simulating {} trials over {} cards ({} chunks, seed {})",
        trials,
        deck.len(),
        chunks,
        seed
    );

    let tally = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * TRIALS_PER_CHUNK;
            let n = TRIALS_PER_CHUNK.min(trials - start);
            let mut rng = DeckRng::for_stream(seed, chunk as u64);
            run_chunk(&is_land, n, &mut rng)
        })
        .reduce(Tally::default, Tally::merge);

    let pct = |hits: usize| hits as f64 * 100.0 / trials as f64;
    SimulationStats {
        trials,
        keepable_7_pct: pct(tally.keep7),
        keepable_6_pct: pct(tally.keep6),
        at_least_2_lands_in_7_pct: pct(tally.two_in_7),
        hit_3rd_land_by_turn_3_on_play_pct: pct(tally.three_in_10),
    }
}
