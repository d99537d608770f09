//! # Synthesis Graph Model
//!
//! The types that cross every boundary: slot ↔ constraint ↔ factory ↔ store ↔ user.
//!
//! Design rule: no store state and no I/O here. `Entity` carries its slots
//! (they live exactly as long as it does), but all orchestration — lazy
//! generation, constraint rebinding, assignment dispatch — belongs to the
//! `graph` module.

pub mod entity;
pub mod property;
pub mod value;

pub use entity::{Entity, EntityId, Kind};
pub use property::{PropertyId, PropertyMap, Record};
pub use value::Value;
