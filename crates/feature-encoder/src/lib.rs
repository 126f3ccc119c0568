//! Doublet feature encoding
//!
//! Turns pixel hit doublets into the inputs of the doublet classifier:
//! a 16×16 charge pad per hit and a 67-value feature vector per doublet.
//!
//! # Stages
//! - [`DoubletSelector`]: keeps pixel layer pairs and pixel-only doublets
//! - [`Pad`]: re-bins a cluster's pixels around its centroid
//! - [`FeatureEncoder`]: per-hit features plus the cross-hit scalars
//!
//! # Example
//! ```no_run
//! use doublet_common::{DoubletConfig, LayerPairDoublets};
//! use doublet_features::{DoubletSelector, FeatureEncoder};
//!
//! # fn encode(group: &LayerPairDoublets) {
//! let config = DoubletConfig::default();
//! let selector = DoubletSelector::new(&config);
//! let encoder = FeatureEncoder::new(&config);
//!
//! if let Some(selected) = selector.select(group) {
//!     for doublet in encoder.encode_layer_pair(&selected) {
//!         println!("{}: z0 = {}", doublet.index, doublet.cross.z0);
//!     }
//! }
//! # }
//! ```

pub mod encoder;
pub mod pad;
pub mod selector;

pub use encoder::{
    normalize_phi, CrossFeatures, EncodedDoublet, EncodedHit, FeatureEncoder, HitFeatures,
};
pub use pad::Pad;
pub use selector::{DoubletSelector, LayerPairIds, SelectedDoublet, SelectedLayerPair};
