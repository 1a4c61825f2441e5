//! Synthetic EEG generator.
//!
//! Produces `eeg_data` frames the way the streaming backend's simulator does:
//! each channel is a sum of alpha, beta, theta and gamma sinusoids plus
//! Gaussian noise, with regional emphasis (motor channels carry more beta,
//! frontal more gamma, parietal more alpha). Seeded, so runs are reproducible.

use std::{collections::BTreeMap, f64::consts::TAU};

use neuroviz_core::AVAILABLE_CHANNELS;
use neuroviz_proto::EegFrame;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Sample rate of generated frames in Hz.
pub const SAMPLE_RATE: u32 = 250;

/// Duration of one frame in milliseconds.
pub const FRAME_MILLIS: u32 = 40;

/// Standard deviation of the additive noise.
pub const NOISE_SIGMA: f64 = 0.1;

/// (frequency Hz, amplitude) of each component.
const ALPHA: (f64, f64) = (10.0, 0.5);
const BETA: (f64, f64) = (20.0, 0.3);
const THETA: (f64, f64) = (6.0, 0.2);
const GAMMA: (f64, f64) = (35.0, 0.1);

/// Seeded generator of `eeg_data` frames.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    rng: ChaCha8Rng,
    channels: Vec<String>,
    next_sample: u64,
}

impl SignalGenerator {
    /// Generator over the full channel catalog.
    pub fn new(seed: u64) -> Self {
        Self::with_channels(seed, AVAILABLE_CHANNELS.iter().copied())
    }

    /// Generator over `channels`.
    pub fn with_channels<I, S>(seed: u64, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            channels: channels.into_iter().map(Into::into).collect(),
            next_sample: 0,
        }
    }

    /// Readings per frame.
    pub fn readings_per_frame() -> usize {
        (SAMPLE_RATE * FRAME_MILLIS / 1000) as usize
    }

    /// Produce the next 40 ms frame.
    pub fn next_frame(&mut self) -> EegFrame {
        let first = self.next_sample;
        let count = Self::readings_per_frame();
        self.next_sample += count as u64;

        let mut data = BTreeMap::new();
        for index in 0..self.channels.len() {
            let readings = (0..count as u64).map(|i| self.value(index, first + i)).collect();
            data.insert(self.channels[index].clone(), readings);
        }

        EegFrame {
            timestamp: Some(first as f64 * 1000.0 / f64::from(SAMPLE_RATE)),
            sample_rate: Some(SAMPLE_RATE),
            channels: Some(self.channels.clone()),
            data,
        }
    }

    fn value(&mut self, channel: usize, sample: u64) -> f64 {
        let t = sample as f64 / f64::from(SAMPLE_RATE);
        let wave = |(freq, amp): (f64, f64)| amp * (TAU * freq * t).sin();

        let (alpha_gain, beta_gain, gamma_gain) = match self.channels[channel].as_str() {
            "C3" | "C4" => (1.0, 1.5, 1.0),
            "Fz" | "F3" | "F4" => (1.0, 1.0, 1.3),
            "Pz" | "P3" | "P4" => (1.2, 1.0, 1.0),
            _ => (1.0, 1.0, 1.0),
        };

        alpha_gain * wave(ALPHA)
            + beta_gain * wave(BETA)
            + wave(THETA)
            + gamma_gain * wave(GAMMA)
            + self.gaussian() * NOISE_SIGMA
    }

    /// Standard normal sample (Box-Muller).
    fn gaussian(&mut self) -> f64 {
        let u1: f64 = self.rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = self.rng.gen_range(0.0..1.0);
        (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn frames_have_backend_shape() {
        let mut generator = SignalGenerator::new(7);
        let frame = generator.next_frame();

        assert_eq!(frame.sample_rate, Some(250));
        assert_eq!(frame.data.len(), AVAILABLE_CHANNELS.len());
        assert!(frame.data.values().all(|r| r.len() == 10));
        assert_eq!(frame.timestamp, Some(0.0));
        assert_eq!(generator.next_frame().timestamp, Some(40.0));
    }

    #[test]
    fn same_seed_same_signal() {
        let a = SignalGenerator::new(42).next_frame();
        let b = SignalGenerator::new(42).next_frame();
        let c = SignalGenerator::new(43).next_frame();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn amplitude_stays_plausible() {
        let mut generator = SignalGenerator::new(1);
        for _ in 0..50 {
            let frame = generator.next_frame();
            let peak = frame.data.values().flatten().fold(0.0f64, |m, v| m.max(v.abs()));
            // Components sum to at most 1.3 after gains; noise rarely exceeds 6 sigma
            assert!(peak < 2.0, "peak {peak}");
        }
    }

    #[test]
    fn motor_channels_carry_more_beta() {
        let mut generator = SignalGenerator::with_channels(3, ["C3", "Cz"]);
        let mut motor = 0.0;
        let mut central = 0.0;
        for _ in 0..200 {
            let frame = generator.next_frame();
            motor += neuroviz_core::band_power::mean_square(&frame.data["C3"]).unwrap();
            central += neuroviz_core::band_power::mean_square(&frame.data["Cz"]).unwrap();
        }
        assert!(motor > central);
    }
}
