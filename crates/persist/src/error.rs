use std::path::PathBuf;
use worldstore_objects::{ObjectId, ObjectKind};
use yaml_rust2::scanner::ScanError;

/// Errors from decoding a document stream. Any of these aborts the whole load.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("stream is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("malformed YAML: {0}")]
    Scan(#[from] ScanError),
    #[error("document {document} uses an alias at line {line}; aliases are not permitted")]
    Alias { document: usize, line: usize },
    #[error("document {document}: {source}")]
    Syntax {
        document: usize,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("document {document} has a tag below its root at line {line}; only the root may be tagged")]
    NestedTag { document: usize, line: usize },
    #[error("document {document} has no type tag")]
    Untagged { document: usize },
    #[error("document {document} has type tag `{tag}`, which is not permitted")]
    DisallowedType { document: usize, tag: String },
    #[error("document {document} is not a valid {kind}: {source}")]
    Payload {
        document: usize,
        kind: ObjectKind,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors from opening or saving an object store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to find or build database {}: {source}", .path.display())]
    Bootstrap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("no object ids left above {high_water}")]
    IdsExhausted { high_water: ObjectId },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
