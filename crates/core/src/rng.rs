//! RNG module - the randomness source and weighted frequency tables
//!
//! Everything random in the engine goes through the [`Randomness`] trait so a
//! host can inject its own source. [`SimpleRng`] is a seeded LCG for
//! deterministic games; [`ScriptedRng`] replays fixed values for tests.
//!
//! Weighted draws use TetriNet frequency tables: 100 slots, each naming an
//! item, so drawing is a single uniform index into the table.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::pieces::piece;
use crate::types::{PieceKind, SpecialKind, FREQUENCY_SLOTS, NUM_COLORS};

/// Source of uniform random integers plus the weighted draws built on it
pub trait Randomness {
    /// Uniform integer in `[0, n)`; returns 0 when `n == 0`
    fn rand_int(&mut self, n: u32) -> u32;

    /// Uniform color id in `1..=NUM_COLORS`
    fn random_color(&mut self) -> u8 {
        1 + self.rand_int(NUM_COLORS as u32) as u8
    }

    fn random_piece(&mut self, table: &FrequencyTable<PieceKind>) -> PieceKind {
        table.pick(self.rand_int(FREQUENCY_SLOTS as u32) as usize)
    }

    fn random_special(&mut self, table: &FrequencyTable<SpecialKind>) -> SpecialKind {
        table.pick(self.rand_int(FREQUENCY_SLOTS as u32) as usize)
    }

    /// Uniform rotation state for a kind
    fn random_orientation(&mut self, kind: PieceKind) -> usize {
        self.rand_int(piece(kind).rotation_count() as u32) as usize
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales by the high bits; the low bits of an LCG have short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Current state (a seed that reproduces the remaining sequence)
    pub fn seed(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Randomness for SimpleRng {
    fn rand_int(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.next_range(n)
    }
}

/// Replays a fixed sequence of values, then returns 0 forever
///
/// Each value is reduced modulo the requested bound so scripts never go out of range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    values: VecDeque<u32>,
}

impl ScriptedRng {
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn push(&mut self, value: u32) {
        self.values.push_back(value);
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl Randomness for ScriptedRng {
    fn rand_int(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.values.pop_front().map(|v| v % n).unwrap_or(0)
    }
}

/// Items that can appear in a TetriNet frequency string
pub trait FrequencyItem: Copy + PartialEq + fmt::Debug {
    fn digit(self) -> char;
    fn from_digit(c: char) -> Option<Self>;
}

impl FrequencyItem for PieceKind {
    fn digit(self) -> char {
        PieceKind::digit(self)
    }

    fn from_digit(c: char) -> Option<Self> {
        PieceKind::from_digit(c)
    }
}

impl FrequencyItem for SpecialKind {
    fn digit(self) -> char {
        SpecialKind::digit(self)
    }

    fn from_digit(c: char) -> Option<Self> {
        SpecialKind::from_digit(c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrequencyError {
    #[error("frequency table needs 100 slots, got {0}")]
    WrongLength(usize),
    #[error("frequency weights sum to {0}, expected 100")]
    WrongTotal(u32),
    #[error("invalid frequency digit {0:?}")]
    BadDigit(char),
}

/// A 100-slot weighted table mapping a uniform index to an item
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable<T: FrequencyItem> {
    slots: [T; FREQUENCY_SLOTS],
}

impl<T: FrequencyItem> FrequencyTable<T> {
    /// Every slot holds the same item
    pub fn uniform(item: T) -> Self {
        Self {
            slots: [item; FREQUENCY_SLOTS],
        }
    }

    /// Build from `(item, weight)` pairs; weights must add up to 100
    pub fn from_weights(weights: &[(T, u8)]) -> Result<Self, FrequencyError> {
        let total: u32 = weights.iter().map(|&(_, w)| w as u32).sum();
        let Some(&(first, _)) = weights.first() else {
            return Err(FrequencyError::WrongTotal(0));
        };
        if total != FREQUENCY_SLOTS as u32 {
            return Err(FrequencyError::WrongTotal(total));
        }

        let mut slots = [first; FREQUENCY_SLOTS];
        let mut i = 0usize;
        for &(item, weight) in weights {
            for _ in 0..weight {
                slots[i] = item;
                i += 1;
            }
        }
        Ok(Self { slots })
    }

    /// Parse a 100-character digit string, one slot per character
    pub fn from_digits(s: &str) -> Result<Self, FrequencyError> {
        let len = s.chars().count();
        if len != FREQUENCY_SLOTS {
            return Err(FrequencyError::WrongLength(len));
        }

        let mut items = s.chars().map(|c| T::from_digit(c).ok_or(FrequencyError::BadDigit(c)));
        let first = items.next().ok_or(FrequencyError::WrongLength(0))??;
        let mut slots = [first; FREQUENCY_SLOTS];
        for (slot, item) in slots.iter_mut().skip(1).zip(items) {
            *slot = item?;
        }
        Ok(Self { slots })
    }

    /// Inverse of [`FrequencyTable::from_digits`]
    pub fn to_digits(&self) -> String {
        self.slots.iter().map(|s| s.digit()).collect()
    }

    /// Item at a slot index (taken modulo 100)
    pub fn pick(&self, index: usize) -> T {
        self.slots[index % FREQUENCY_SLOTS]
    }

    /// How many slots hold `item`
    pub fn weight(&self, item: T) -> usize {
        self.slots.iter().filter(|&&s| s == item).count()
    }
}

impl<T: FrequencyItem> Serialize for FrequencyTable<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_digits())
    }
}

impl<'de, T: FrequencyItem> Deserialize<'de> for FrequencyTable<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_digits(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_zero_seed_is_remapped() {
        let mut a = SimpleRng::new(0);
        let mut b = SimpleRng::new(1);
        assert_eq!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn test_rand_int_in_range() {
        let mut rng = SimpleRng::new(7);
        for n in 1..50 {
            for _ in 0..20 {
                assert!(rng.rand_int(n) < n);
            }
        }
        assert_eq!(rng.rand_int(0), 0);
    }

    #[test]
    fn test_rand_int_two_does_not_alternate() {
        let mut rng = SimpleRng::new(99);
        let draws: Vec<u32> = (0..64).map(|_| rng.rand_int(2)).collect();
        let alternating = draws.windows(2).all(|w| w[0] != w[1]);
        assert!(!alternating);
        assert!(draws.contains(&0) && draws.contains(&1));
    }

    #[test]
    fn test_random_color_range() {
        let mut rng = SimpleRng::new(3);
        for _ in 0..200 {
            let c = rng.random_color();
            assert!((1..=NUM_COLORS).contains(&c));
        }
    }

    #[test]
    fn test_scripted_rng_replays_then_zero() {
        let mut rng = ScriptedRng::new([3, 12, 7]);
        assert_eq!(rng.rand_int(10), 3);
        assert_eq!(rng.rand_int(10), 2);
        assert_eq!(rng.rand_int(100), 7);
        assert_eq!(rng.rand_int(100), 0);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_table_from_weights() {
        let table = FrequencyTable::from_weights(&[(PieceKind::I, 60), (PieceKind::T, 40)]).unwrap();
        assert_eq!(table.pick(0), PieceKind::I);
        assert_eq!(table.pick(59), PieceKind::I);
        assert_eq!(table.pick(60), PieceKind::T);
        assert_eq!(table.pick(99), PieceKind::T);
        assert_eq!(table.weight(PieceKind::T), 40);
    }

    #[test]
    fn test_table_rejects_bad_total() {
        let err = FrequencyTable::from_weights(&[(PieceKind::I, 60)]).unwrap_err();
        assert_eq!(err, FrequencyError::WrongTotal(60));
    }

    #[test]
    fn test_table_digits() {
        let digits = "9".repeat(50) + &"1".repeat(50);
        let table = FrequencyTable::<SpecialKind>::from_digits(&digits).unwrap();
        assert_eq!(table.pick(0), SpecialKind::BlockBomb);
        assert_eq!(table.pick(50), SpecialKind::AddLine);
        assert_eq!(table.to_digits(), digits);

        assert_eq!(
            FrequencyTable::<PieceKind>::from_digits("123").unwrap_err(),
            FrequencyError::WrongLength(3)
        );
        let bad = "8".repeat(100);
        assert_eq!(
            FrequencyTable::<PieceKind>::from_digits(&bad).unwrap_err(),
            FrequencyError::BadDigit('8')
        );
    }

    #[test]
    fn test_weighted_draw_respects_table() {
        let table = FrequencyTable::uniform(SpecialKind::Gravity);
        let mut rng = SimpleRng::new(5);
        for _ in 0..50 {
            assert_eq!(rng.random_special(&table), SpecialKind::Gravity);
        }
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_range_stays_below_max(seed in any::<u32>(), max in 1u32..1000) {
                let mut rng = SimpleRng::new(seed);
                for _ in 0..32 {
                    prop_assert!(rng.next_range(max) < max);
                }
            }

            #[test]
            fn weights_become_slot_counts(split in 0u8..=100) {
                let table = FrequencyTable::from_weights(&[
                    (PieceKind::S, split),
                    (PieceKind::Z, 100 - split),
                ])
                .unwrap();
                prop_assert_eq!(table.weight(PieceKind::S), split as usize);
                prop_assert_eq!(table.weight(PieceKind::Z), 100 - split as usize);
                prop_assert_eq!(table.weight(PieceKind::T), 0);
            }
        }
    }
}
