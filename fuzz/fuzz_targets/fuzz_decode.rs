#![no_main]
use entropy_stream::{AdaptiveBitModel, HuffmanModel, SymbolCodec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the alphabet size; the rest is treated as an
    // encoded stream. Decoding may report corruption but must not panic.
    let total_syms = 1 + usize::from(data[0]) * 8;
    let payload = &data[1..];

    let mut huff = HuffmanModel::new(false, total_syms, data[0] & 1 != 0, data[0] & 2 != 0)
        .expect("alphabet size in range");
    let mut bit_model = AdaptiveBitModel::new();

    let mut codec = SymbolCodec::new();
    codec.start_decoding(payload).unwrap();
    codec.start_arith_decoding();
    for _ in 0..1024 {
        let _ = codec.decode_bit(&mut bit_model, true);
        if codec.decode_symbol(&mut huff).is_err() {
            break;
        }
        let _ = codec.decode_bits(13);
    }
    let _ = codec.stop_decoding();
});
