#![no_main]

use libfuzzer_sys::fuzz_target;
use peer_wire::{Network, Parser, RawCodec, ResyncPolicy};

fuzz_target!(|data: &[u8]| {
    // First byte picks the resync policy and chunk size, the rest is the stream
    let Some((&control, stream)) = data.split_first() else {
        return;
    };
    let policy = if control & 1 == 0 {
        ResyncPolicy::Reinterpret
    } else {
        ResyncPolicy::ScanForMagic
    };
    let chunk = usize::from(control >> 1).max(1);

    let mut parser = Parser::new(Network::Main.profile(), RawCodec).with_resync(policy);
    for piece in stream.chunks(chunk) {
        let _ = parser.feed(piece.to_vec());
        assert!(parser.buffered() < parser.awaiting());
    }
});
