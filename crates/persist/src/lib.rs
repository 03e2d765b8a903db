//! Persistence: a YAML document-stream object store.
//!
//! # Invariants
//! - Loading is all-or-nothing; a rejected document fails the whole open.
//! - Only tags in [`ObjectKind::ALL`](worldstore_objects::ObjectKind::ALL) decode.
//! - YAML aliases are rejected, never expanded.
//! - Every key in the store equals the id of the object stored under it.

pub mod bootstrap;
pub mod decode;
pub mod error;
pub mod persister;
pub mod store;

pub use bootstrap::SEED_WORLD;
pub use decode::decode_stream;
pub use error::{DecodeError, StoreError};
pub use store::{ObjectStore, StoreStats, backing_path};

pub fn crate_info() -> &'static str {
    "worldstore-persist v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("persist"));
    }
}
