//! World object model: the closed set of kinds the store is allowed to hold.
//!
//! # Invariants
//! - Every object carries a non-negative integer id.
//! - The set of kinds is fixed at compile time; there is no runtime registry.

pub mod kinds;
pub mod types;

pub use kinds::{Command, Exit, Item, Npc, ObjectKind, Player, Room, StoredObject};
pub use types::{Identified, ObjectId, ParseKindError};

pub fn crate_info() -> &'static str {
    "worldstore-objects v0.1.0"
}
