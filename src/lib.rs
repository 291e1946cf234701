//! Adaptive entropy coding engine.
//!
//! One byte stream, three symbol kinds: raw fixed-width bit fields,
//! arithmetic-coded binary decisions against [`AdaptiveBitModel`]s, and
//! Huffman-coded alphabet symbols against quasi-adaptive
//! [`HuffmanModel`]s. A [`SymbolCodec`] drives either one encode pass or
//! one decode pass; the caller owns the models and mirrors them between
//! the two sides.
//!
//! The layer above decides *what* to encode; this crate only knows *how*:
//! MSB-first bit packing, 32-bit interval arithmetic with carry
//! propagation, canonical code rebuilds, and streaming decode through a
//! pull callback.
//!
//! ## Round Trip
//!
//! ```rust
//! use entropy_stream::{AdaptiveBitModel, HuffmanModel, SymbolCodec};
//!
//! let mut codec = SymbolCodec::new();
//! let mut flag = AdaptiveBitModel::new();
//! let mut syms = HuffmanModel::new(true, 16, false, false).unwrap();
//!
//! codec.start_encoding(64).unwrap();
//! codec.encode_arith_init();
//! codec.encode_bits(0x2A, 8);
//! codec.encode_bit(true, &mut flag, true);
//! codec.encode_symbol(7, &mut syms);
//! codec.encode_align_to_byte();
//! codec.stop_encoding().unwrap();
//! let buf = codec.take_output();
//!
//! // Decode with freshly seeded mirror models, in the same call order.
//! let mut codec = SymbolCodec::new();
//! let mut flag = AdaptiveBitModel::new();
//! let mut syms = HuffmanModel::new(false, 16, false, false).unwrap();
//!
//! codec.start_decoding(&buf).unwrap();
//! codec.start_arith_decoding();
//! assert_eq!(codec.decode_bits(8), 0x2A);
//! assert!(codec.decode_bit(&mut flag, true));
//! assert_eq!(codec.decode_symbol(&mut syms).unwrap(), 7);
//! codec.stop_decoding().unwrap();
//! ```
//!
//! ## Streaming Decode
//!
//! Input does not have to be in memory at once: see
//! [`SymbolCodec::start_decoding_streaming`] and [`RefillFn`]. Past end
//! of stream, missing bytes read as zero rather than failing, so
//! trailing reads are well-defined.

pub mod codec;
pub mod cost;
pub mod error;

pub use codec::{AdaptiveBitModel, BitTreeModel, HuffmanModel, RefillFn, SymbolCodec};
pub use cost::{
    prob_cost, BitCost, BIT_COST_ONE, BIT_COST_SCALE_SHIFT, PROB_BITS, PROB_HALF_SCALE,
    PROB_MOVE_BITS, PROB_SCALE,
};
pub use error::{CodecError, Result};
