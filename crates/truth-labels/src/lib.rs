//! Truth labels for pixel doublets
//!
//! A doublet is genuine when its inner and outer clusters were produced by a
//! common tracking particle. Every doublet gets a label and a 55-value truth
//! block, whether or not any association exists for its clusters.

pub mod block;
pub mod resolver;

pub use block::{ParticleBlock, TruthBlock};
pub use resolver::{LabelResolver, ParticleId, TruthMatch};
