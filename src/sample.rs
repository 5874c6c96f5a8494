//! Deterministic synthetic microdata.
//!
//! Generates candidates with plausible score distributions, demographic
//! codes and per-day attendance so every pipeline has something to chew on
//! without the real (multi-gigabyte) files.

use crate::data::model::{Competency, Dataset, ExamDay, Presence, Record, StateCode, SCORE_RANGE};
use crate::labels::Variable;

/// Mean and standard deviation of each competency, by [`Competency::index`].
const SCORE_PROFILE: [(f64, f64); 5] = [
    (490.0, 75.0),
    (520.0, 80.0),
    (515.0, 70.0),
    (530.0, 110.0),
    (610.0, 170.0),
];

/// Rough share of candidates per state, in code order.
#[rustfmt::skip]
const STATE_WEIGHTS: [u32; 27] = [
    2, 9, 9, 2, 22, 17, 5, 6, 10, 11, 30, 5, 6, 15,
    8, 17, 7, 12, 24, 7, 4, 1, 12, 8, 5, 55, 3,
];

const LETTERS: [&str; 17] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q",
];

/// Generate `rows` candidates. The same seed always yields the same dataset.
pub fn synthetic_dataset(rows: usize, seed: u64) -> Dataset {
    let mut rng = SimpleRng::new(seed);
    let total_weight: u32 = STATE_WEIGHTS.iter().sum();

    let records = (0..rows)
        .map(|_| candidate(&mut rng, total_weight))
        .collect();
    let dataset = Dataset::from_records(records);
    log::debug!("generated {} synthetic candidates (seed {seed})", dataset.len());
    dataset
}

fn candidate(rng: &mut SimpleRng, total_weight: u32) -> Record {
    let state = pick_state(rng, total_weight);

    let income = rng.below(LETTERS.len() as u64) as usize;
    let mother = rng.below(8) as usize;
    let father = rng.below(8) as usize;
    let school_type = 1 + rng.below(3) as i64;
    // Advantage in score points from family background and private school.
    let private = if school_type == 3 { 45.0 } else { 0.0 };
    let advantage = income as f64 * 9.0 + mother as f64 * 4.0 + private;

    let mut rec = Record::new(state)
        .with_attribute(Variable::Sex, if rng.next_f64() < 0.58 { "F" } else { "M" })
        .with_attribute(Variable::Race, rng.below(7) as i64)
        .with_attribute(Variable::AgeBracket, 1 + rng.below(20) as i64)
        .with_attribute(Variable::Income, LETTERS[income])
        .with_attribute(Variable::MotherEducation, LETTERS[mother])
        .with_attribute(Variable::FatherEducation, LETTERS[father])
        .with_attribute(Variable::SchoolType, school_type);
    if school_type != 1 {
        let dependency = if school_type == 3 { 4 } else { 1 + rng.below(3) as i64 };
        rec = rec.with_attribute(Variable::SchoolDependency, dependency);
    }

    let day_one = presence(rng, 0.25);
    // Candidates who skipped day one rarely come back for day two.
    let day_two = if day_one == Presence::Absent && rng.next_f64() < 0.9 {
        Presence::Absent
    } else {
        presence(rng, 0.08)
    };
    rec = rec.with_presence(ExamDay::One, day_one).with_presence(ExamDay::Two, day_two);

    for c in Competency::ALL {
        let attended = rec.presence(c.exam_day()) == Some(Presence::Present);
        if !attended {
            continue;
        }
        let score = if c == Competency::Essay && rng.next_f64() < 0.02 {
            // blank or off-topic essay
            0.0
        } else {
            let (mean, std) = SCORE_PROFILE[c.index()];
            round_tenth(rng.gauss(mean + advantage - 60.0, std))
        };
        rec = rec.with_score(c, score.clamp(SCORE_RANGE.0, SCORE_RANGE.1));
    }
    rec
}

fn pick_state(rng: &mut SimpleRng, total_weight: u32) -> StateCode {
    let mut ticket = rng.below(total_weight as u64) as u32;
    for (state, weight) in StateCode::ALL.into_iter().zip(STATE_WEIGHTS) {
        if ticket < weight {
            return state;
        }
        ticket -= weight;
    }
    StateCode::SP
}

fn presence(rng: &mut SimpleRng, absent_rate: f64) -> Presence {
    let r = rng.next_f64();
    if r < absent_rate {
        Presence::Absent
    } else if r < absent_rate + 0.001 {
        Presence::Eliminated
    } else {
        Presence::Present
    }
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// PRNG
// ---------------------------------------------------------------------------

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        (self.next_f64() * n as f64) as u64 % n.max(1)
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}
