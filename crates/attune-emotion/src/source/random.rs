// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated readings: uniform label, uniform intensity in a sub-range.

use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use attune_core::{AttuneError, EmotionSample, EmotionSource, EmotionVocabulary, check_intensity};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::time::Interval;

use super::cadence_interval;

pub struct RandomSource {
    vocabulary: EmotionVocabulary,
    min: f64,
    max: f64,
    interval: Interval,
    rng: StdRng,
}

impl RandomSource {
    /// `range` must lie within `[0, 1]` with `start <= end`.
    pub fn new(
        vocabulary: EmotionVocabulary,
        range: RangeInclusive<f64>,
        cadence: Duration,
    ) -> Result<Self, AttuneError> {
        Self::with_rng(vocabulary, range, cadence, StdRng::from_entropy())
    }

    /// Deterministic variant for reproducible runs.
    pub fn seeded(
        vocabulary: EmotionVocabulary,
        range: RangeInclusive<f64>,
        cadence: Duration,
        seed: u64,
    ) -> Result<Self, AttuneError> {
        Self::with_rng(vocabulary, range, cadence, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        vocabulary: EmotionVocabulary,
        range: RangeInclusive<f64>,
        cadence: Duration,
        rng: StdRng,
    ) -> Result<Self, AttuneError> {
        let (min, max) = range.into_inner();
        check_intensity(min)?;
        check_intensity(max)?;
        if min > max {
            return Err(AttuneError::Validation(format!(
                "intensity range is inverted: {min} > {max}"
            )));
        }
        Ok(Self {
            vocabulary,
            min,
            max,
            interval: cadence_interval(cadence),
            rng,
        })
    }

    fn draw(&mut self) -> Option<EmotionSample> {
        let label = *self.vocabulary.labels().choose(&mut self.rng)?;
        let raw = self.rng.gen_range(self.min..=self.max);
        // Two decimals, kept inside the configured range.
        let intensity = ((raw * 100.0).round() / 100.0).clamp(self.min, self.max);
        EmotionSample::new(label, intensity).ok()
    }
}

#[async_trait]
impl EmotionSource for RandomSource {
    fn name(&self) -> &str {
        "random"
    }

    fn vocabulary(&self) -> EmotionVocabulary {
        self.vocabulary
    }

    async fn next_sample(&mut self) -> Option<EmotionSample> {
        self.interval.tick().await;
        self.draw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn samples_stay_in_vocabulary_and_range() {
        let mut source =
            RandomSource::seeded(EmotionVocabulary::Affect, 0.4..=1.0, Duration::from_millis(1), 7)
                .unwrap();
        for _ in 0..200 {
            let sample = source.next_sample().await.unwrap();
            assert!(EmotionVocabulary::Affect.contains(sample.label()));
            assert!((0.4..=1.0).contains(&sample.intensity()), "{}", sample.intensity());
            let cents = sample.intensity() * 100.0;
            assert!((cents - cents.round()).abs() < 1e-9, "not two decimals: {}", sample.intensity());
        }
    }

    #[tokio::test]
    async fn same_seed_same_sequence() {
        let mut a =
            RandomSource::seeded(EmotionVocabulary::Eeg, 0.0..=1.0, Duration::from_millis(1), 42)
                .unwrap();
        let mut b =
            RandomSource::seeded(EmotionVocabulary::Eeg, 0.0..=1.0, Duration::from_millis(1), 42)
                .unwrap();
        for _ in 0..10 {
            let (x, y) = (a.next_sample().await.unwrap(), b.next_sample().await.unwrap());
            assert_eq!((x.label(), x.intensity()), (y.label(), y.intensity()));
        }
    }

    #[test]
    fn rejects_bad_ranges() {
        let cadence = Duration::from_secs(1);
        assert!(RandomSource::new(EmotionVocabulary::Affect, 0.8..=0.2, cadence).is_err());
        assert!(RandomSource::new(EmotionVocabulary::Affect, 0.0..=1.5, cadence).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn emits_on_cadence() {
        let mut source =
            RandomSource::seeded(EmotionVocabulary::Affect, 0.4..=1.0, Duration::from_secs(5), 1)
                .unwrap();
        let start = tokio::time::Instant::now();
        source.next_sample().await.unwrap();
        source.next_sample().await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
