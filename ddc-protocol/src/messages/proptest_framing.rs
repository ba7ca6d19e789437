//! Property tests for frame checksums and chunked string reassembly.

use super::frame::{checksum, decode, encode, DISPLAY_SOURCE, INBOUND_SEED, LENGTH_FLAG, OUTBOUND_SEED};
use super::types::VcpRequest;
use super::vcp::{parse_string_chunk, string_chunk_request};
use proptest::prelude::*;

fn display_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![DISPLAY_SOURCE, LENGTH_FLAG | payload.len() as u8];
    frame.extend_from_slice(payload);
    frame.push(checksum(INBOUND_SEED, &frame));
    frame
}

/// Split `text` at the given cut points and serve each piece as a chunk reply,
/// following the offsets the reader asks for.
fn reassemble(text: &[u8], cuts: &[usize]) -> Vec<u8> {
    let mut bounds: Vec<usize> = cuts.iter().map(|c| c % (text.len() + 1)).collect();
    bounds.push(0);
    bounds.push(text.len());
    bounds.sort_unstable();
    bounds.dedup();

    let request = VcpRequest::CAPABILITIES;
    let mut out = Vec::new();
    let mut offset: u16 = 0;
    loop {
        let req = string_chunk_request(request, offset);
        let start = usize::from(u16::from_be_bytes([req[1], req[2]]));
        let end = bounds
            .iter()
            .copied()
            .find(|&b| b > start)
            .unwrap_or(start);

        let mut payload = vec![request.response, req[1], req[2]];
        payload.extend_from_slice(&text[start..end]);
        let raw = display_frame(&payload);
        let decoded = decode(&raw, 64).unwrap();
        assert!(decoded.checksum_ok());

        match parse_string_chunk(request, offset, &decoded.payload).unwrap() {
            None => break,
            Some(data) => {
                out.extend_from_slice(data);
                offset += data.len() as u16;
            }
        }
    }
    out
}

proptest! {
    #[test]
    fn prop_host_frames_checksum_to_zero(payload in prop::collection::vec(any::<u8>(), 0..=32)) {
        let frame = encode(&payload).unwrap();
        prop_assert_eq!(frame.len(), payload.len() + 3);
        prop_assert_eq!(frame[1] & LENGTH_FLAG, LENGTH_FLAG);
        prop_assert_eq!(checksum(OUTBOUND_SEED, &frame), 0);
    }

    #[test]
    fn prop_display_frames_decode(payload in prop::collection::vec(any::<u8>(), 0..=32)) {
        let raw = display_frame(&payload);
        let decoded = decode(&raw, 32).unwrap();
        prop_assert!(decoded.checksum_ok());
        prop_assert_eq!(&decoded.payload[..], &payload[..]);
    }

    #[test]
    fn prop_single_bit_flip_is_detected(
        payload in prop::collection::vec(any::<u8>(), 1..=32),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut raw = display_frame(&payload);
        // Flip a bit in the payload or checksum; header bytes are validated separately.
        let pos = 2 + index.index(raw.len() - 2);
        raw[pos] ^= 1 << bit;
        let decoded = decode(&raw, 32).unwrap();
        prop_assert!(!decoded.checksum_ok());
    }

    #[test]
    fn prop_chunked_reassembly_ignores_chunk_boundaries(
        text in prop::collection::vec(1u8..=0x7F, 0..200),
        cuts in prop::collection::vec(any::<usize>(), 0..12),
    ) {
        // Keep every piece within the per-chunk data limit.
        let mut cuts = cuts;
        cuts.extend((1..=text.len() / 60).map(|i| i * 60));
        prop_assert_eq!(reassemble(&text, &cuts), text);
    }
}
