//! # scene_world
//!
//! The live side of the scene packing engine: a dynamically-typed
//! entity-component world plus the stable identifier type that survives
//! serialisation.
//!
//! This crate provides:
//!
//! - [`Uuid`] — stable 64-bit identifiers with decimal/hex text encodings.
//! - [`Entity`] — lightweight world-local `u64` handles.
//! - [`World`] — entity storage with names, enabled flags, components, tags,
//!   relationship pairs and parent/child hierarchy.
//! - [`Attachment`] / [`PairPart`] — the introspection surface the packer's
//!   classifier consumes.

pub mod entity;
pub mod uuid;
pub mod world;

pub use entity::{Entity, EntityAllocator};
pub use uuid::Uuid;
pub use world::{Attachment, PairPart, PairRecord, TypeInfo, World, WorldError};
