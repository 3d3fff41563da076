use bytes::{BufMut, Bytes, BytesMut};

const HEAD_MARKER: &[u8] = b"<<<<<<< HEAD\n";
const SEPARATOR_MARKER: &[u8] = b"=======\n";
const END_MARKER: &[u8] = b">>>>>>>\n";

/// Working copy content for a conflicted file
///
/// Both sides are written verbatim; a side where the file is absent
/// contributes nothing.
pub fn render_conflict(head: Option<&[u8]>, other: Option<&[u8]>) -> Bytes {
    let head = head.unwrap_or_default();
    let other = other.unwrap_or_default();

    let mut content = BytesMut::with_capacity(
        HEAD_MARKER.len() + head.len() + SEPARATOR_MARKER.len() + other.len() + END_MARKER.len(),
    );
    content.put_slice(HEAD_MARKER);
    content.put_slice(head);
    content.put_slice(SEPARATOR_MARKER);
    content.put_slice(other);
    content.put_slice(END_MARKER);

    content.freeze()
}
