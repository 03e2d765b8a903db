use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a stored object.
///
/// Serialized as a bare integer so the backing file stays hand-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// The id directly above this one, or `None` at `u64::MAX`.
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Anything the store can key by id.
pub trait Identified {
    fn id(&self) -> ObjectId;
}

/// Returned when a string does not name a permitted object kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown object kind `{0}`")]
pub struct ParseKindError(pub String);
