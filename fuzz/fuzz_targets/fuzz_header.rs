#![no_main]

use libfuzzer_sys::fuzz_target;
use peer_wire::{Header, Network};

fuzz_target!(|data: &[u8]| {
    // Header validation must never panic, whatever the length
    let _ = Header::decode(data, &Network::Main.profile());
});
