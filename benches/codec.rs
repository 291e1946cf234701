//! Benchmarks for entropy codec throughput.
//!
//! Run with: `cargo bench`
//! Compare with baseline: `cargo bench -- --save-baseline main`
//! Compare against baseline: `cargo bench -- --baseline main`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use entropy_stream::{AdaptiveBitModel, HuffmanModel, SymbolCodec};

/// Deterministic skewed symbol source (roughly geometric over 256).
fn skewed_symbols(n: usize) -> Vec<u32> {
    let mut state = 0x2545_F491u32;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let r = state % 1000;
            if r < 600 {
                state % 8
            } else if r < 900 {
                8 + state % 32
            } else {
                40 + state % 216
            }
        })
        .collect()
}

fn encode_all(syms: &[u32]) -> Vec<u8> {
    let mut codec = SymbolCodec::new();
    let mut model = HuffmanModel::new(true, 256, false, false).unwrap();
    codec.start_encoding(syms.len()).unwrap();
    for &s in syms {
        codec.encode_symbol(s, &mut model);
    }
    codec.encode_align_to_byte();
    codec.stop_encoding().unwrap();
    codec.take_output()
}

fn bench_huffman_encode(c: &mut Criterion) {
    let syms = skewed_symbols(100_000);
    let mut group = c.benchmark_group("huffman_encode");
    group.throughput(Throughput::Elements(syms.len() as u64));
    group.bench_function("100k_syms_256_alphabet", |b| {
        b.iter(|| black_box(encode_all(black_box(&syms))));
    });
    group.finish();
}

fn bench_huffman_decode(c: &mut Criterion) {
    let syms = skewed_symbols(100_000);
    let buf = encode_all(&syms);
    let mut group = c.benchmark_group("huffman_decode");
    group.throughput(Throughput::Bytes(buf.len() as u64));
    group.bench_function("100k_syms_256_alphabet", |b| {
        b.iter(|| {
            let mut codec = SymbolCodec::new();
            let mut model = HuffmanModel::new(false, 256, false, false).unwrap();
            codec.start_decoding(black_box(&buf)).unwrap();
            let mut acc = 0u32;
            for _ in 0..syms.len() {
                acc ^= codec.decode_symbol(&mut model).unwrap();
            }
            black_box(acc)
        });
    });
    group.finish();
}

fn bench_arith_bits(c: &mut Criterion) {
    let mut state = 0xBEEFu32;
    let bits: Vec<bool> = (0..100_000)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            state % 100 < 20
        })
        .collect();

    let encode = |bits: &[bool]| {
        let mut codec = SymbolCodec::new();
        let mut model = AdaptiveBitModel::new();
        codec.start_encoding(bits.len() / 4).unwrap();
        codec.encode_arith_init();
        for &bit in bits {
            codec.encode_bit(bit, &mut model, true);
        }
        codec.stop_encoding().unwrap();
        codec.take_output()
    };

    let mut group = c.benchmark_group("arith_bits");
    group.throughput(Throughput::Elements(bits.len() as u64));
    group.bench_function("encode_100k", |b| {
        b.iter(|| black_box(encode(black_box(&bits))));
    });

    let buf = encode(&bits);
    group.bench_function("decode_100k", |b| {
        b.iter(|| {
            let mut codec = SymbolCodec::new();
            let mut model = AdaptiveBitModel::new();
            codec.start_decoding(black_box(&buf)).unwrap();
            codec.start_arith_decoding();
            let mut ones = 0u32;
            for _ in 0..bits.len() {
                ones += u32::from(codec.decode_bit(&mut model, true));
            }
            black_box(ones)
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_huffman_encode,
    bench_huffman_decode,
    bench_arith_bits
);
criterion_main!(benches);
