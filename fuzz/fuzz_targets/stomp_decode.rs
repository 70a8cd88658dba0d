//! The STOMP decoder must never panic on arbitrary input, and the buffered
//! path must agree with the one-shot path on the first frame.

#![no_main]

use libfuzzer_sys::fuzz_target;

use lexiwire_proto::{FrameBuffer, decode_first};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let first = decode_first(text);

    let mut buffer = FrameBuffer::new();
    let drained = buffer.push(text);

    // When the chunk holds at least one complete frame, the buffered path
    // must start with the frame decode_first sees.
    if text.contains('\0') {
        if let Some(frame) = first {
            assert_eq!(drained.first(), Some(&frame));
        }
    }
});
