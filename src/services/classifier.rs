//! Indoor/outdoor classification from GNSS satellite observations
//!
//! Stateless per epoch: every call is a pure function of the observation
//! set. The signal metric is a high percentile of the used-satellite SNR
//! list, which tracks the strongest sky-visible signals and is robust to a
//! couple of attenuated stragglers.

use crate::domain::types::{SatelliteObservation, SignalVerdict};
use crate::infra::config::ClassifierConfig;

/// Classifies one GNSS epoch as indoor or outdoor
#[derive(Debug, Clone)]
pub struct SignalQualityClassifier {
    cfg: ClassifierConfig,
}

impl SignalQualityClassifier {
    pub fn new(cfg: ClassifierConfig) -> Self {
        Self { cfg }
    }

    /// Raw three-valued verdict for one epoch
    ///
    /// `Ambiguous` means neither threshold pair matched; use [`classify`]
    /// for the resolved two-valued verdict.
    ///
    /// [`classify`]: SignalQualityClassifier::classify
    pub fn raw_verdict(&self, observations: &[SatelliteObservation]) -> SignalVerdict {
        let mut used_snrs: Vec<f64> = observations
            .iter()
            .filter(|o| o.used_in_fix && o.snr_dbhz > 0.0)
            .map(|o| o.snr_dbhz)
            .collect();

        // No usable signal implies an enclosed environment
        if used_snrs.is_empty() {
            return SignalVerdict::Indoor;
        }

        used_snrs.sort_by(f64::total_cmp);
        let snr_metric = percentile(&used_snrs, self.cfg.snr_percentile);
        let used_count = used_snrs.len();

        let is_indoor =
            snr_metric <= self.cfg.indoor_snr_dbhz && used_count <= self.cfg.max_indoor_sats;
        let is_outdoor =
            snr_metric >= self.cfg.outdoor_snr_dbhz && used_count >= self.cfg.min_outdoor_sats;

        match (is_indoor, is_outdoor) {
            (true, _) => SignalVerdict::Indoor,
            (_, true) => SignalVerdict::Outdoor,
            _ => SignalVerdict::Ambiguous,
        }
    }

    /// Verdict for one epoch with the ambiguous band resolved
    ///
    /// Tie-break: indoor iff the SNR metric sits at or below the indoor
    /// threshold. Never returns `Ambiguous`.
    pub fn classify(&self, observations: &[SatelliteObservation]) -> SignalVerdict {
        match self.raw_verdict(observations) {
            SignalVerdict::Ambiguous => {
                let mut used_snrs: Vec<f64> = observations
                    .iter()
                    .filter(|o| o.used_in_fix && o.snr_dbhz > 0.0)
                    .map(|o| o.snr_dbhz)
                    .collect();
                used_snrs.sort_by(f64::total_cmp);
                if percentile(&used_snrs, self.cfg.snr_percentile) <= self.cfg.indoor_snr_dbhz {
                    SignalVerdict::Indoor
                } else {
                    SignalVerdict::Outdoor
                }
            }
            verdict => verdict,
        }
    }
}

impl Default for SignalQualityClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

/// Value at the given percentile of a sorted non-empty list
///
/// Index is `ceil(p * len) - 1`, clamped to the valid range.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let index = (sorted.len() as f64 * p).ceil() as isize - 1;
    let index = index.clamp(0, sorted.len() as isize - 1) as usize;
    sorted[index]
}
