use bytes::{BufMut, Bytes, BytesMut};

const DATA_PREFIX: &[u8] = b"data: ";
const DATA_SUFFIX: &[u8] = b"\n\n";

/// Wraps a published payload in the event-stream framing `data: <payload>\n\n`.
///
/// The payload is copied verbatim. Embedded newlines are not split into multiple
/// `data:` lines, so a payload containing a blank line will be seen by a strict
/// EventSource parser as more than one event.
pub fn encode(payload: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(DATA_PREFIX.len() + payload.len() + DATA_SUFFIX.len());
    frame.put_slice(DATA_PREFIX);
    frame.put_slice(payload);
    frame.put_slice(DATA_SUFFIX);
    frame.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_wraps_payload() {
        assert_eq!(&encode(b"hello")[..], b"data: hello\n\n");
    }

    #[test]
    fn encode_empty_payload() {
        assert_eq!(&encode(b"")[..], b"data: \n\n");
    }

    #[test]
    fn encode_does_not_touch_binary_payloads() {
        let payload = [0xffu8, 0x00, b'\n', 0x7f];
        let frame = encode(&payload);

        assert_eq!(&frame[6..10], &payload);
        assert_eq!(frame.len(), 6 + payload.len() + 2);
    }
}
