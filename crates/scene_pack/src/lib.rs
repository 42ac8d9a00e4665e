//! # scene_pack
//!
//! Packing and reconstruction of entity graphs: converts live entity
//! forests from a [`scene_world::World`] into a portable, pointer-free
//! value model, renders that model as JSON documents, and rebuilds live
//! forests from it with all relationship edges re-resolved.
//!
//! The crate splits into four layers:
//!
//! - [`packed`] — the value model ([`PackedScene`], [`PackedEntity`],
//!   [`PackedComponent`], [`PackedPair`]), pure data with no live-world
//!   resources.
//! - [`codec`] — the per-component-type codec registry.
//! - [`document`] — JSON text rendering and parsing for the value model.
//! - [`pack`] / [`instantiate`] — the packer (live → packed, with the
//!   attachment classifier) and the two-phase reconstructor (packed →
//!   live, order-independent pair resolution).
//!
//! Recoverable conditions during packing or instantiation (a missing
//! codec, an unresolvable pair target, a name collision) are reported via
//! `tracing` and degraded locally; they never abort the surrounding
//! operation.

pub mod codec;
pub mod document;
pub mod instantiate;
pub mod pack;
pub mod packed;

pub use codec::{CodecError, CodecRegistry};
pub use document::{DocumentError, read_document, write_document, write_document_pretty};
pub use instantiate::{DeferredPair, Instantiator, SceneInstance};
pub use pack::{PackError, Packer};
pub use packed::{
    PackedComponent, PackedEntity, PackedExternalDependency, PackedPair, PackedScene,
    PackedSceneMetadata,
};
