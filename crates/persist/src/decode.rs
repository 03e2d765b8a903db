//! Hardened decoding of a YAML document stream into [`StoredObject`]s.
//!
//! Decoding runs in two passes over the same text:
//!
//! 1. An event-level walk with `yaml-rust2` that validates the syntax of the
//!    whole stream and rejects any alias node or any tag below a document's
//!    root. Aliases are reported, never expanded, so a recursive alias bomb
//!    costs no more than its own bytes.
//! 2. A typed pass with `serde_yaml`, one document at a time. The root tag
//!    of each document is checked against [`ObjectKind::ALL`] before the
//!    payload is converted into its variant.
//!
//! The first failure in either pass aborts the decode; no partial result is
//! ever returned.

use crate::error::DecodeError;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;
use worldstore_objects::{Identified, ObjectKind, StoredObject};
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::Marker;

/// Decode every document in `bytes`, in stream order.
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<StoredObject>, DecodeError> {
    let text = std::str::from_utf8(bytes)?;
    scan_structure(text)?;

    let mut objects = Vec::new();
    for (document, de) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value =
            Value::deserialize(de).map_err(|source| DecodeError::Syntax { document, source })?;
        if value.is_null() {
            debug!(document, "skipping empty document");
            continue;
        }
        let object = decode_document(document, value)?;
        debug!(document, id = %object.id(), kind = %object.kind(), "decoded object");
        objects.push(object);
    }
    Ok(objects)
}

fn decode_document(document: usize, value: Value) -> Result<StoredObject, DecodeError> {
    let Value::Tagged(tagged) = value else {
        return Err(DecodeError::Untagged { document });
    };
    let tag = tagged.tag.to_string();
    let tag = tag.strip_prefix('!').unwrap_or(&tag);
    let kind = ObjectKind::from_tag(tag).ok_or_else(|| DecodeError::DisallowedType {
        document,
        tag: tag.to_string(),
    })?;

    serde_yaml::from_value(Value::Tagged(tagged)).map_err(|source| DecodeError::Payload {
        document,
        kind,
        source,
    })
}

/// Walks the event stream and records the first structural rejection.
///
/// Only a document's root node may carry a tag; the root tag itself is
/// checked against the allow-list in the typed pass.
#[derive(Default)]
struct StructureScan {
    documents: usize,
    depth: usize,
    rejection: Option<DecodeError>,
}

impl StructureScan {
    fn reject(&mut self, error: DecodeError) {
        if self.rejection.is_none() {
            self.rejection = Some(error);
        }
    }

    fn check_tag(&mut self, tagged: bool, line: usize) {
        if tagged && self.depth > 0 {
            let document = self.document();
            self.reject(DecodeError::NestedTag { document, line });
        }
    }

    fn document(&self) -> usize {
        self.documents.saturating_sub(1)
    }
}

impl MarkedEventReceiver for StructureScan {
    fn on_event(&mut self, event: Event, mark: Marker) {
        match event {
            Event::DocumentStart { .. } => {
                self.documents += 1;
                self.depth = 0;
            }
            Event::Alias { .. } => {
                let document = self.document();
                self.reject(DecodeError::Alias {
                    document,
                    line: mark.line(),
                });
            }
            Event::Scalar(_, _, _, tag) => self.check_tag(tag.is_some(), mark.line()),
            Event::SequenceStart(_, tag) | Event::MappingStart(_, tag) => {
                self.check_tag(tag.is_some(), mark.line());
                self.depth += 1;
            }
            Event::SequenceEnd | Event::MappingEnd => {
                self.depth = self.depth.saturating_sub(1);
            }
            _ => {}
        }
    }
}

fn scan_structure(text: &str) -> Result<(), DecodeError> {
    let mut scan = StructureScan::default();
    Parser::new(text.chars()).load(&mut scan, true)?;
    match scan.rejection {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
