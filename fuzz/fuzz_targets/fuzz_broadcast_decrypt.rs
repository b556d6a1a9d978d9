//! Fuzz target for the sealed-stream scanner.
//!
//! Feeds arbitrary bytes to the decrypt scan. The codec should reject
//! malformed streams with an error but never panic, whatever the input
//! claims about key blocks, separator position, or content length.

#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use sealcast_protocol::{BroadcastCodec, RevocationRegistry};

fn registry() -> &'static RevocationRegistry {
    static REGISTRY: OnceLock<RevocationRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| RevocationRegistry::new(8).expect("8-leaf registry"))
}

fuzz_target!(|data: &[u8]| {
    let registry = registry();

    // Scan as a leaf device and as an internal node
    let _ = BroadcastCodec::decrypt(registry, registry.tree().first_leaf(), data);
    let _ = BroadcastCodec::decrypt(registry, 2, data);
});
