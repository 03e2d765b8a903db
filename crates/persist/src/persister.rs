//! Streaming writer for the document-stream format.

use std::io::{self, Write};
use worldstore_objects::StoredObject;

/// Marks the start of every document in the stream.
pub const DOCUMENT_START: &[u8] = b"---\n";

/// Write each object as its own document and flush `out`.
///
/// Objects are serialized straight into `out` one at a time, so memory use
/// is bounded by the largest single object rather than the whole store.
/// Encoding failures surface as [`io::Error`]s. Returns the number of
/// documents written.
pub fn write_documents<'a, W, I>(out: &mut W, objects: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a StoredObject>,
{
    let mut count = 0;
    for object in objects {
        out.write_all(DOCUMENT_START)?;
        serde_yaml::to_writer(&mut *out, object).map_err(io::Error::other)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_stream;
    use worldstore_objects::{Command, Exit, ObjectId};

    fn sample() -> Vec<StoredObject> {
        vec![
            Exit {
                id: ObjectId(1),
                name: "up".into(),
                owner: None,
                location: Some(ObjectId(0)),
                to_room: Some(ObjectId(2)),
            }
            .into(),
            Command {
                id: ObjectId(2),
                name: "say".into(),
                cmd: "cmd_say".into(),
                help: "say <message>".into(),
            }
            .into(),
        ]
    }

    #[test]
    fn every_document_starts_with_delimiter() {
        let mut buf = Vec::new();
        let count = write_documents(&mut buf, &sample()).unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("---\n!Exit\n"), "got: {text}");
        assert_eq!(text.matches("---\n").count(), 2);
        assert!(text.contains("---\n!Command\n"), "got: {text}");
    }

    #[test]
    fn written_stream_decodes_back() {
        let objects = sample();
        let mut buf = Vec::new();
        write_documents(&mut buf, &objects).unwrap();
        assert_eq!(decode_stream(&buf).unwrap(), objects);
    }

    #[test]
    fn nothing_to_write() {
        let none: [StoredObject; 0] = [];
        let mut buf = Vec::new();
        assert_eq!(write_documents(&mut buf, &none).unwrap(), 0);
        assert!(buf.is_empty());
    }
}
