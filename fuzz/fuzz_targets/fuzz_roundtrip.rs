#![no_main]
use entropy_stream::{AdaptiveBitModel, HuffmanModel, SymbolCodec};
use libfuzzer_sys::fuzz_target;

const ALPHABET: usize = 41;

fuzz_target!(|data: &[u8]| {
    // Interpret the input as a symbol program: two bits of kind, the rest
    // of each byte as the operand.
    let mut codec = SymbolCodec::new();
    let mut bit_model = AdaptiveBitModel::new();
    let mut huff = HuffmanModel::new(true, ALPHABET, false, false).unwrap();

    codec.start_encoding(data.len()).unwrap();
    codec.encode_arith_init();
    for &b in data {
        let operand = u32::from(b >> 2);
        match b & 3 {
            0 => codec.encode_bits(operand, 6),
            1 => codec.encode_bit(operand & 1 != 0, &mut bit_model, true),
            2 => codec.encode_symbol(operand % ALPHABET as u32, &mut huff),
            _ => codec.encode_align_to_byte(),
        }
    }
    codec.encode_align_to_byte();
    codec.encode_bits(0xC0DE_F00D, 32);
    codec.stop_encoding().unwrap();
    let buf = codec.take_output();

    let mut codec = SymbolCodec::new();
    let mut bit_model = AdaptiveBitModel::new();
    let mut huff = HuffmanModel::new(false, ALPHABET, false, false).unwrap();

    codec.start_decoding(&buf).unwrap();
    codec.start_arith_decoding();
    for &b in data {
        let operand = u32::from(b >> 2);
        match b & 3 {
            0 => assert_eq!(codec.decode_bits(6), operand),
            1 => assert_eq!(codec.decode_bit(&mut bit_model, true), operand & 1 != 0),
            2 => assert_eq!(
                codec.decode_symbol(&mut huff).unwrap(),
                operand % ALPHABET as u32
            ),
            _ => codec.decode_align_to_byte(),
        }
    }
    codec.decode_align_to_byte();
    assert_eq!(codec.decode_bits(32), 0xC0DE_F00D);
    assert_eq!(codec.decode_bits_remaining(), 0);
});
