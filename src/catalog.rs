//! Track Catalog
//!
//! The fixed table of tracks a full run produces. Each [`TrackSpec`] is an
//! immutable description consumed once by the render driver; the synthesis
//! primitives themselves know nothing about it.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::synth::noise::NoiseKind;

/// Beat frequencies of the binaural tracks (Hz)
pub const BINAURAL_BEATS: [f64; 7] = [2.0, 3.0, 4.0, 6.0, 8.0, 10.0, 14.0];
/// Carrier shared by every binaural track (Hz)
pub const BINAURAL_CARRIER: f64 = 220.0;

/// Modulation frequencies of the isochronic tracks (Hz)
pub const ISOCHRONIC_RATES: [f64; 7] = [4.0, 6.0, 8.0, 10.0, 12.0, 16.0, 20.0];
/// Base tone shared by every isochronic track (Hz)
pub const ISOCHRONIC_BASE: f64 = 180.0;

/// "Om" drone fundamental (Hz)
pub const DRONE_FUNDAMENTAL: f64 = 136.1;
/// Harmonics used by the catalog drone
pub const DRONE_HARMONICS: usize = 5;
/// Pad partials: C2, G2, C3, G3 (Hz)
pub const PAD_FREQUENCIES: [f64; 4] = [65.4, 98.0, 130.8, 196.0];

/// How channels are normalized after generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// One gain for all channels, inter-channel balance kept
    Joint,
    /// Each channel reaches the target peak on its own
    PerChannel,
}

/// Brainwave band a binaural beat frequency falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainwaveBand {
    Delta,
    Theta,
    Alpha,
    Beta,
}

impl BrainwaveBand {
    /// Band of `beat_hz`: delta below 4 Hz, theta below 8, alpha below 13
    pub fn of(beat_hz: f64) -> Self {
        if beat_hz < 4.0 {
            BrainwaveBand::Delta
        } else if beat_hz < 8.0 {
            BrainwaveBand::Theta
        } else if beat_hz < 13.0 {
            BrainwaveBand::Alpha
        } else {
            BrainwaveBand::Beta
        }
    }
}

impl fmt::Display for BrainwaveBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BrainwaveBand::Delta => "delta",
            BrainwaveBand::Theta => "theta",
            BrainwaveBand::Alpha => "alpha",
            BrainwaveBand::Beta => "beta",
        };
        f.write_str(name)
    }
}

/// What a track is and the parameters of its generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackKind {
    Binaural { beat_hz: f64, carrier_hz: f64 },
    Isochronic { mod_hz: f64, base_hz: f64 },
    Noise { noise: NoiseKind },
    Drone { fundamental_hz: f64, harmonics: usize },
    Pad { frequencies: Vec<f64> },
}

impl TrackKind {
    /// Short label used in listings and the manifest
    pub fn label(&self) -> &'static str {
        match self {
            TrackKind::Binaural { .. } => "binaural",
            TrackKind::Isochronic { .. } => "isochronic",
            TrackKind::Noise { .. } => "noise",
            TrackKind::Drone { .. } => "drone",
            TrackKind::Pad { .. } => "pad",
        }
    }

    /// Binaural ears are balanced independently
    pub fn normalization(&self) -> Normalization {
        match self {
            TrackKind::Binaural { .. } => Normalization::PerChannel,
            _ => Normalization::Joint,
        }
    }

    /// Human-readable generator parameters
    pub fn describe(&self) -> String {
        match self {
            TrackKind::Binaural {
                beat_hz,
                carrier_hz,
            } => format!(
                "{} Hz beat on {} Hz carrier ({})",
                beat_hz,
                carrier_hz,
                BrainwaveBand::of(*beat_hz)
            ),
            TrackKind::Isochronic { mod_hz, base_hz } => {
                format!("{} Hz pulses on {} Hz tone", mod_hz, base_hz)
            }
            TrackKind::Noise { noise } => format!("{} noise", noise),
            TrackKind::Drone {
                fundamental_hz,
                harmonics,
            } => format!("{} Hz with {} harmonics", fundamental_hz, harmonics),
            TrackKind::Pad { frequencies } => {
                let parts: Vec<String> = frequencies.iter().map(|f| f.to_string()).collect();
                format!("{} Hz", parts.join("/"))
            }
        }
    }

    /// Output identifier, derived from the kind and its frequencies
    pub fn id(&self) -> String {
        match self {
            TrackKind::Binaural { beat_hz, .. } => {
                format!("{}-{}hz-binaural", BrainwaveBand::of(*beat_hz), beat_hz)
            }
            TrackKind::Isochronic { mod_hz, .. } => format!("{}hz-isochronic", mod_hz),
            TrackKind::Noise { noise } => match noise {
                NoiseKind::Ocean => "ocean-waves".to_string(),
                NoiseKind::Rain | NoiseKind::Wind => noise.to_string(),
                NoiseKind::Pink | NoiseKind::Brown => format!("{}-noise", noise),
            },
            TrackKind::Drone { .. } => "om-drone".to_string(),
            TrackKind::Pad { .. } => "low-harmonic-pad".to_string(),
        }
    }
}

/// One track to produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSpec {
    pub id: String,
    pub kind: TrackKind,
    pub duration_secs: f64,
}

impl TrackSpec {
    pub fn new(kind: TrackKind, duration_secs: f64) -> Self {
        Self {
            id: kind.id(),
            kind,
            duration_secs,
        }
    }

    /// WAV file name inside the output directory
    pub fn file_name(&self) -> String {
        format!("{}.wav", self.id)
    }
}

/// The 21 tracks of a full run, each `duration_secs` long
///
/// Seven binaural beats, seven isochronic tones, then drone, pad and the five
/// noise ambiences. The order is stable: per-track seeds derive from it.
pub fn standard_catalog(duration_secs: f64) -> Vec<TrackSpec> {
    let binaural = BINAURAL_BEATS.iter().map(|&beat_hz| TrackKind::Binaural {
        beat_hz,
        carrier_hz: BINAURAL_CARRIER,
    });
    let isochronic = ISOCHRONIC_RATES.iter().map(|&mod_hz| TrackKind::Isochronic {
        mod_hz,
        base_hz: ISOCHRONIC_BASE,
    });
    let ambient = [
        TrackKind::Drone {
            fundamental_hz: DRONE_FUNDAMENTAL,
            harmonics: DRONE_HARMONICS,
        },
        TrackKind::Pad {
            frequencies: PAD_FREQUENCIES.to_vec(),
        },
        TrackKind::Noise {
            noise: NoiseKind::Brown,
        },
        TrackKind::Noise {
            noise: NoiseKind::Pink,
        },
        TrackKind::Noise {
            noise: NoiseKind::Ocean,
        },
        TrackKind::Noise {
            noise: NoiseKind::Rain,
        },
        TrackKind::Noise {
            noise: NoiseKind::Wind,
        },
    ];

    binaural
        .chain(isochronic)
        .chain(ambient)
        .map(|kind| TrackSpec::new(kind, duration_secs))
        .collect()
}

/// Look up `id` in `catalog`
pub fn find<'a>(catalog: &'a [TrackSpec], id: &str) -> Option<&'a TrackSpec> {
    catalog.iter().find(|spec| spec.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use test_case::test_case;

    #[test]
    fn test_catalog_shape() {
        let catalog = standard_catalog(300.0);
        assert_eq!(catalog.len(), 21);

        let count = |label: &str| catalog.iter().filter(|s| s.kind.label() == label).count();
        assert_eq!(count("binaural"), 7);
        assert_eq!(count("isochronic"), 7);
        assert_eq!(count("noise"), 5);
        assert_eq!(count("drone"), 1);
        assert_eq!(count("pad"), 1);

        assert!(catalog.iter().all(|s| s.duration_secs == 300.0));
    }

    #[test]
    fn test_file_names_unique() {
        let catalog = standard_catalog(1.0);
        let names: HashSet<String> = catalog.iter().map(|s| s.file_name()).collect();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_ambient_file_names() {
        let names: Vec<String> = standard_catalog(1.0)[14..]
            .iter()
            .map(|s| s.file_name())
            .collect();
        assert_eq!(
            names,
            vec![
                "om-drone.wav",
                "low-harmonic-pad.wav",
                "brown-noise.wav",
                "pink-noise.wav",
                "ocean-waves.wav",
                "rain.wav",
                "wind.wav",
            ]
        );
    }

    #[test_case(2.0, "delta-2hz-binaural.wav")]
    #[test_case(3.0, "delta-3hz-binaural.wav")]
    #[test_case(4.0, "theta-4hz-binaural.wav")]
    #[test_case(6.0, "theta-6hz-binaural.wav")]
    #[test_case(8.0, "alpha-8hz-binaural.wav")]
    #[test_case(10.0, "alpha-10hz-binaural.wav")]
    #[test_case(14.0, "beta-14hz-binaural.wav")]
    fn test_binaural_file_name(beat_hz: f64, expected: &str) {
        let spec = TrackSpec::new(
            TrackKind::Binaural {
                beat_hz,
                carrier_hz: BINAURAL_CARRIER,
            },
            1.0,
        );
        assert_eq!(spec.file_name(), expected);
    }

    #[test_case(4.0, "4hz-isochronic.wav")]
    #[test_case(12.0, "12hz-isochronic.wav")]
    #[test_case(20.0, "20hz-isochronic.wav")]
    fn test_isochronic_file_name(mod_hz: f64, expected: &str) {
        let spec = TrackSpec::new(
            TrackKind::Isochronic {
                mod_hz,
                base_hz: ISOCHRONIC_BASE,
            },
            1.0,
        );
        assert_eq!(spec.file_name(), expected);
    }

    #[test]
    fn test_normalization_mode() {
        let catalog = standard_catalog(1.0);
        for spec in &catalog {
            let expected = if spec.kind.label() == "binaural" {
                Normalization::PerChannel
            } else {
                Normalization::Joint
            };
            assert_eq!(spec.kind.normalization(), expected, "{}", spec.id);
        }
    }

    #[test]
    fn test_find_and_serde() {
        let catalog = standard_catalog(1.0);
        let pad = find(&catalog, "low-harmonic-pad").unwrap();
        assert_eq!(
            pad.kind,
            TrackKind::Pad {
                frequencies: PAD_FREQUENCIES.to_vec()
            }
        );
        assert!(find(&catalog, "nope").is_none());

        let json = serde_json::to_string(&catalog[0].kind).unwrap();
        assert!(json.contains("\"type\":\"binaural\""));
    }
}
