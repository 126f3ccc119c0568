//! Immutable encoding configuration shared by every pipeline stage

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f64::consts::PI;
use thiserror::Error;

/// Sequence numbers of the pixel layers, in dense-index order
pub const DEFAULT_PIXEL_LAYERS: [u32; 10] = [0, 1, 2, 3, 14, 15, 16, 29, 30, 31];

/// PDG ids tracked by the species bitmask, in bit order
pub const DEFAULT_PARTICLE_SPECIES: [i32; 12] =
    [11, 13, 15, 22, 111, 211, 311, 321, 2212, 2112, 3122, 223];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the azimuthal difference between the two hits is post-processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaPhiRule {
    /// Training-time arithmetic: a difference above π is scaled by `2π - |Δφ|`
    #[default]
    Source,
    /// Any difference with magnitude above π is replaced by 1.0
    Sentinel,
    /// Circular difference folded into (-π, π]
    Wrapped,
}

impl DeltaPhiRule {
    /// Apply the rule to a raw `outer - inner` azimuth difference
    #[must_use]
    pub fn apply(self, delta: f64) -> f64 {
        match self {
            DeltaPhiRule::Source => {
                if delta > PI {
                    delta * (2.0 * PI - delta.abs())
                } else {
                    delta
                }
            }
            DeltaPhiRule::Sentinel => {
                if delta.abs() > PI {
                    1.0
                } else {
                    delta
                }
            }
            DeltaPhiRule::Wrapped => {
                if delta > PI {
                    delta - 2.0 * PI
                } else if delta <= -PI {
                    delta + 2.0 * PI
                } else {
                    delta
                }
            }
        }
    }
}

/// Constants of the doublet encoding
///
/// The trained model depends on every value here; the defaults are the ones
/// it was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubletConfig {
    /// Half-width of the pad window around the cluster centroid, in pixels
    pub pad_half_size: f32,
    /// Global pad normalization mean
    pub pad_mean: f64,
    /// Global pad normalization sigma
    pub pad_sigma: f64,
    /// Pixel layer sequence numbers; position in the list is the dense layer index
    pub pixel_layers: Vec<u32>,
    /// PDG ids reported in the truth species bitmask
    pub particle_species: Vec<i32>,
    /// Post-processing of Δφ
    pub delta_phi_rule: DeltaPhiRule,
    /// Use `z_out - z_in` for Δz instead of the constant 0.0 the model was trained on
    pub measured_delta_z: bool,
}

impl Default for DoubletConfig {
    fn default() -> Self {
        Self {
            pad_half_size: 8.0,
            pad_mean: 13382.001_132_1,
            pad_sigma: 10525.125_295_4,
            pixel_layers: DEFAULT_PIXEL_LAYERS.to_vec(),
            particle_species: DEFAULT_PARTICLE_SPECIES.to_vec(),
            delta_phi_rule: DeltaPhiRule::Source,
            measured_delta_z: false,
        }
    }
}

impl DoubletConfig {
    /// Side length of a pad in cells
    #[must_use]
    pub fn pad_size(&self) -> usize {
        (self.pad_half_size * 2.0) as usize
    }

    /// Number of cells in one pad
    #[must_use]
    pub fn pad_area(&self) -> usize {
        self.pad_size() * self.pad_size()
    }

    /// Number of pixel layers, i.e. image channels per hit role
    #[must_use]
    pub fn cnn_layers(&self) -> usize {
        self.pixel_layers.len()
    }

    /// Total image channels (inner block followed by outer block)
    #[must_use]
    pub fn channels(&self) -> usize {
        2 * self.cnn_layers()
    }

    /// Number of image values per doublet
    #[must_use]
    pub fn image_stride(&self) -> usize {
        self.channels() * self.pad_area()
    }

    /// Dense index of a layer sequence number, if it is a pixel layer
    #[must_use]
    pub fn dense_layer_index(&self, seq_num: u32) -> Option<usize> {
        self.pixel_layers.iter().position(|&s| s == seq_num)
    }

    /// Normalize a raw pad cell value
    #[must_use]
    #[inline]
    pub fn normalize_pad_value(&self, value: f32) -> f32 {
        ((f64::from(value) - self.pad_mean) / self.pad_sigma) as f32
    }

    /// Check the invariants the encoder relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pad_half_size > 0.0) || self.pad_half_size.fract() != 0.0 {
            return Err(ConfigError::Invalid(format!(
                "pad_half_size must be a positive whole number, got {}",
                self.pad_half_size
            )));
        }
        if !(self.pad_sigma.is_finite() && self.pad_sigma > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pad_sigma must be positive, got {}",
                self.pad_sigma
            )));
        }
        if !self.pad_mean.is_finite() {
            return Err(ConfigError::Invalid("pad_mean must be finite".to_string()));
        }
        if self.pixel_layers.is_empty() {
            return Err(ConfigError::Invalid(
                "pixel_layers must not be empty".to_string(),
            ));
        }
        let unique: HashSet<_> = self.pixel_layers.iter().collect();
        if unique.len() != self.pixel_layers.len() {
            return Err(ConfigError::Invalid(
                "pixel_layers contains duplicate sequence numbers".to_string(),
            ));
        }
        if self.particle_species.len() > 32 {
            return Err(ConfigError::Invalid(format!(
                "at most 32 particle species fit the bitmask, got {}",
                self.particle_species.len()
            )));
        }
        Ok(())
    }
}
