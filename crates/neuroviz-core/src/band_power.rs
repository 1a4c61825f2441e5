//! Derived band-power summary.
//!
//! The split below is a fixed proportional allocation of a channel's mean
//! squared amplitude across five named bands. It is NOT a spectral estimate:
//! no frequency analysis happens here, and the numbers carry no physiological
//! meaning. Renderers rely on the exact weights, so they must not change.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{SelectedChannels, history::Sample};

/// Named frequency bands, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// Delta band.
    Delta,
    /// Theta band.
    Theta,
    /// Alpha band.
    Alpha,
    /// Beta band.
    Beta,
    /// Gamma band.
    Gamma,
}

impl Band {
    /// All bands, lowest first.
    pub const ALL: [Band; 5] = [Band::Delta, Band::Theta, Band::Alpha, Band::Beta, Band::Gamma];

    /// Share of total power assigned to this band.
    pub fn weight(self) -> f64 {
        match self {
            Self::Delta => 0.20,
            Self::Theta => 0.15,
            Self::Alpha => 0.30,
            Self::Beta => 0.25,
            Self::Gamma => 0.10,
        }
    }

    /// Lowercase band name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Delta => "delta",
            Self::Theta => "theta",
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Gamma => "gamma",
        }
    }
}

/// Band weights in [`Band::ALL`] order. Sums to 1.0.
pub const BAND_WEIGHTS: [f64; 5] = [0.20, 0.15, 0.30, 0.25, 0.10];

/// Mean of squared readings. `None` for an empty slice.
pub fn mean_square(readings: &[f64]) -> Option<f64> {
    if readings.is_empty() {
        return None;
    }
    let sum: f64 = readings.iter().map(|value| value * value).sum();
    Some(sum / readings.len() as f64)
}

/// Power of one channel split across the five bands.
///
/// All fields are non-negative whenever the source power is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BandPower {
    /// Delta share.
    pub delta: f64,
    /// Theta share.
    pub theta: f64,
    /// Alpha share.
    pub alpha: f64,
    /// Beta share.
    pub beta: f64,
    /// Gamma share.
    pub gamma: f64,
}

impl BandPower {
    /// Split `power` using [`Band::weight`].
    pub fn from_power(power: f64) -> Self {
        Self {
            delta: power * Band::Delta.weight(),
            theta: power * Band::Theta.weight(),
            alpha: power * Band::Alpha.weight(),
            beta: power * Band::Beta.weight(),
            gamma: power * Band::Gamma.weight(),
        }
    }

    /// Split the mean squared amplitude of `readings`. `None` if empty.
    pub fn from_readings(readings: &[f64]) -> Option<Self> {
        mean_square(readings).map(Self::from_power)
    }

    /// Power in one band.
    pub fn get(&self, band: Band) -> f64 {
        match band {
            Band::Delta => self.delta,
            Band::Theta => self.theta,
            Band::Alpha => self.alpha,
            Band::Beta => self.beta,
            Band::Gamma => self.gamma,
        }
    }

    /// Sum over all bands. Equals the source power up to rounding.
    pub fn total(&self) -> f64 {
        Band::ALL.iter().map(|&band| self.get(band)).sum()
    }
}

/// Band power per channel, derived from one sample.
///
/// Entries follow the channel selection order at derivation time. The
/// snapshot is replaced wholesale on every data frame; nothing accumulates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BandPowerSnapshot {
    entries: Vec<(String, BandPower)>,
}

impl BandPowerSnapshot {
    /// Empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive from `sample` for every selected channel that has readings.
    pub fn derive(sample: &Sample, selected: &SelectedChannels) -> Self {
        let entries = selected
            .iter()
            .filter_map(|channel| {
                let readings = sample.readings(channel)?;
                BandPower::from_readings(readings).map(|power| (channel.to_owned(), power))
            })
            .collect();
        Self { entries }
    }

    /// Band power for `channel`, if present.
    pub fn get(&self, channel: &str) -> Option<&BandPower> {
        self.entries.iter().find(|(name, _)| name == channel).map(|(_, power)| power)
    }

    /// Channels in display order.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BandPower)> {
        self.entries.iter().map(|(name, power)| (name.as_str(), power))
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no channel has power.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Copy into a map keyed by channel name.
    pub fn to_map(&self) -> BTreeMap<String, BandPower> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let sum: f64 = BAND_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);

        for (band, weight) in Band::ALL.iter().zip(BAND_WEIGHTS) {
            assert!((band.weight() - weight).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn mean_square_of_constant_signal() {
        assert_eq!(mean_square(&[2.0, -2.0, 2.0]), Some(4.0));
        assert_eq!(mean_square(&[]), None);
    }

    #[test]
    fn split_matches_fixed_weights() {
        let power = BandPower::from_readings(&[1.0, 3.0]).unwrap();

        // mean(1, 9) = 5
        assert!((power.delta - 1.0).abs() < 1e-12);
        assert!((power.theta - 0.75).abs() < 1e-12);
        assert!((power.alpha - 1.5).abs() < 1e-12);
        assert!((power.beta - 1.25).abs() < 1e-12);
        assert!((power.gamma - 0.5).abs() < 1e-12);
        assert!((power.total() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn band_names_are_lowercase() {
        let names: Vec<_> = Band::ALL.iter().map(|band| band.name()).collect();
        assert_eq!(names, vec!["delta", "theta", "alpha", "beta", "gamma"]);
    }
}
