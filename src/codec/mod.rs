//! Entropy coding engine.
//!
//! A bitstream assembler/disassembler combined with two statistical
//! coders: a binary arithmetic coder driven by adaptive bit
//! probabilities, and a quasi-adaptive canonical Huffman coder with
//! periodically rebuilt codes and a table-driven fast decode path.
//!
//! ## Symbol Kinds
//!
//! | Kind | Encode | Decode | Model |
//! |------|--------|--------|-------|
//! | Raw bit field | `encode_bits` | `decode_bits` | none |
//! | Arithmetic bit | `encode_bit` | `decode_bit` | [`AdaptiveBitModel`] |
//! | Alphabet symbol | `encode_symbol` | `decode_symbol` | [`HuffmanModel`] |
//!
//! ## Architecture
//!
//! ```text
//!           encode side                       decode side
//!
//!  encode_* calls                      SymbolCodec::decode_*
//!        ↓                                    ↑
//!  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!  │ OutputSymbol │  │ ArithEncoder │  │ BitReader    │← refill callback
//!  │ log          │  │ (side buffer)│  │ + arith state│
//!  └──────────────┘  └──────────────┘  └──────────────┘
//!        ↓ stop_encoding       ↓               ↑
//!  ┌─────────────────────────────┐      ┌──────────────┐
//!  │ assembly: replay log,       │      │ DecodeTable /│
//!  │ splice arith bytes at the   │      │ bit models   │
//!  │ decoder's pull points       │      └──────────────┘
//!  └─────────────────────────────┘
//!        ↓
//!  one MSB-first byte stream
//! ```
//!
//! Correctness rests on a single invariant: encoder and decoder drive
//! identical model update sequences in identical call order. The models
//! carry no self-checks in the hot path; a desynchronized model produces
//! wrong-but-plausible output, which is why mirrored construction and
//! call order are part of every model's contract.

mod arith;
mod bit_model;
mod bit_reader;
mod bit_writer;
mod huffman;
mod prefix;
mod symbol_codec;


pub use bit_model::{AdaptiveBitModel, BitTreeModel};
pub use bit_reader::RefillFn;
pub use huffman::HuffmanModel;
pub use symbol_codec::SymbolCodec;
