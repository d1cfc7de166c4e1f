//! ridilint-core: Clause serialization for the ridilint supplementary linter
//!
//! This crate provides:
//! - `Entity` / `EntityKind`: one flattened declaration record with its
//!   lexical-context clause and source position
//! - `serialize()`: Walk a parsed PHP program and emit entities in visit order
//! - `PositionResolver`: Map entity byte offsets back to report columns

mod entity;
pub mod position;
pub mod serializer;

pub use entity::{Entity, EntityKind};
pub use position::{PositionError, PositionResolver};
pub use serializer::serialize;
