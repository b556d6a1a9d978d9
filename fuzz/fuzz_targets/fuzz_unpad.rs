//! Fuzz target for block padding.
//!
//! Tests that padding/unpadding handles arbitrary data safely.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sealcast_crypto::{pad, unpad, BLOCK_SIZE};

fuzz_target!(|data: &[u8]| {
    // Unpadding arbitrary bytes must fail gracefully, never panic
    let _ = unpad(data);

    // Padding is total: any input pads to the next block boundary
    let padded = pad(data);
    assert_eq!(padded.len() % BLOCK_SIZE, 0);
    assert!(padded.len() > data.len());

    // Unpadding recovers the original data
    let unpadded = unpad(&padded).unwrap();
    assert_eq!(data, unpadded.as_slice());
});
