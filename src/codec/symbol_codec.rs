//! Symbol codec facade: one bitstream, three symbol kinds.
//!
//! The codec is driven symbol by symbol from above — raw fixed-width bit
//! fields, arithmetic-coded binary decisions and Huffman-coded alphabet
//! symbols all land in the same byte stream. Encoding is deferred: each
//! `encode_*` call appends to a symbol log while the arithmetic coder
//! runs into a side buffer, and `stop_encoding` performs the single pass
//! that interleaves everything. The arithmetic sub-stream's byte
//! boundaries are only known once its carries have settled, so the
//! assembly pass simulates the arithmetic *decoder* against the finished
//! side buffer and drops its bytes at exactly the positions the real
//! decoder will pull them from.
//!
//! Decoding is immediate: a bit register over the input buffer, refilled
//! through an optional pull callback, with the arithmetic interval state
//! threaded through inlined hot-path methods.

use log::debug;

use crate::cost::PROB_BITS;
use crate::error::{CodecError, Result};

use super::arith::{ArithEncoder, MAX_INTERVAL, MIN_INTERVAL};
use super::bit_model::AdaptiveBitModel;
use super::bit_reader::BitReader;
use super::bit_writer::BitWriter;
use super::huffman::HuffmanModel;
use super::prefix::MAX_CODE_SIZE;

/// One deferred encode call.
#[derive(Debug, Clone, Copy)]
enum OutputSymbol {
    /// Raw field, or a Huffman code resolved at encode time.
    Bits { value: u32, width: u8 },
    /// Arithmetic-coded bit. The probability snapshot predates the model
    /// update so assembly can replay the decoder's view of the interval.
    ArithBit { prob0: u16 },
    AlignToByte,
    /// Start of the arithmetic sub-stream; assembly emits the decoder's
    /// four priming bytes here.
    ArithInit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Encoding,
    Decoding,
}

/// Entropy codec facade owning the bit register, the arithmetic interval
/// state and the output symbol log.
///
/// One instance drives one encode pass or one decode pass at a time; the
/// models are owned by the caller and passed into each call, mirrored
/// between the two sides. The `'buf` lifetime is the decode input
/// buffer's; a codec used only for encoding can be `SymbolCodec<'static>`.
pub struct SymbolCodec<'buf> {
    mode: Mode,

    // Encode side.
    writer: BitWriter,
    syms: Vec<OutputSymbol>,
    arith_enc: ArithEncoder,
    arith_used: bool,

    // Decode side.
    reader: BitReader<'buf>,
    arith_value: u32,
    arith_length: u32,

    total_model_updates: u64,
}

impl<'buf> SymbolCodec<'buf> {
    pub fn new() -> Self {
        Self {
            mode: Mode::Idle,
            writer: BitWriter::new(),
            syms: Vec::new(),
            arith_enc: ArithEncoder::new(),
            arith_used: false,
            reader: BitReader::empty(),
            arith_value: 0,
            arith_length: 0,
            total_model_updates: 0,
        }
    }

    /// Huffman code rebuilds triggered through this codec in the current
    /// session.
    pub fn total_model_updates(&self) -> u64 {
        self.total_model_updates
    }

    // ---------------------------------------------------------------
    // Encoding
    // ---------------------------------------------------------------

    /// Begin an encode session. `expected_size` pre-sizes the output
    /// buffer; reservation failure aborts the session.
    pub fn start_encoding(&mut self, expected_size: usize) -> Result<()> {
        if self.mode != Mode::Idle {
            return Err(CodecError::SessionActive);
        }
        self.writer.reset();
        self.writer.reserve(expected_size)?;
        self.syms.clear();
        self.arith_enc.reset();
        self.arith_used = false;
        self.total_model_updates = 0;
        self.mode = Mode::Encoding;
        debug!("encode session started, expecting ~{expected_size} bytes");
        Ok(())
    }

    /// Append the `width` (0..=32) low bits of `value` verbatim.
    #[inline]
    pub fn encode_bits(&mut self, value: u32, width: u32) {
        debug_assert_eq!(self.mode, Mode::Encoding);
        debug_assert!(width <= 32);
        debug_assert!(width == 32 || u64::from(value) < (1u64 << width));
        if width == 0 {
            return;
        }
        self.syms.push(OutputSymbol::Bits {
            value,
            width: width as u8,
        });
    }

    /// Pad the stream with zero bits to the next byte boundary.
    pub fn encode_align_to_byte(&mut self) {
        debug_assert_eq!(self.mode, Mode::Encoding);
        self.syms.push(OutputSymbol::AlignToByte);
    }

    /// Mark the start of the arithmetic sub-stream. Must precede every
    /// `encode_bit` call of the session; the decoder mirrors it with
    /// `start_arith_decoding`.
    pub fn encode_arith_init(&mut self) {
        debug_assert_eq!(self.mode, Mode::Encoding);
        debug_assert!(!self.arith_used, "arithmetic sub-stream already started");
        self.arith_used = true;
        self.syms.push(OutputSymbol::ArithInit);
    }

    /// Encode one bit against an adaptive model. `update_model = false`
    /// codes against the current probability without adapting it.
    #[inline]
    pub fn encode_bit(&mut self, bit: bool, model: &mut AdaptiveBitModel, update_model: bool) {
        debug_assert_eq!(self.mode, Mode::Encoding);
        debug_assert!(self.arith_used, "encode_arith_init must come first");
        self.syms.push(OutputSymbol::ArithBit { prob0: model.prob0 });
        self.arith_enc.encode(bit, model.prob0);
        if update_model {
            model.update(bit);
        }
    }

    /// Encode one alphabet symbol against a Huffman model.
    #[inline]
    pub fn encode_symbol(&mut self, sym: u32, model: &mut HuffmanModel) {
        debug_assert_eq!(self.mode, Mode::Encoding);
        debug_assert!((sym as usize) < model.total_syms());
        let (code, width) = model.code_for(sym);
        self.syms.push(OutputSymbol::Bits {
            value: code,
            width: width as u8,
        });
        if model.tally(sym) {
            self.total_model_updates += 1;
        }
    }

    /// Close the session: resolve the arithmetic sub-stream, interleave
    /// everything into the output buffer and flush it byte-aligned.
    /// Returns the total number of bits written.
    pub fn stop_encoding(&mut self) -> Result<u64> {
        if self.mode != Mode::Encoding {
            return Err(CodecError::NoSession("encode"));
        }
        if self.arith_used {
            self.arith_enc.finish();
        }
        self.assemble();
        self.mode = Mode::Idle;
        debug!(
            "encode session closed: {} bits into {} bytes",
            self.writer.total_bits(),
            self.writer.buf().len()
        );
        Ok(self.writer.total_bits())
    }

    /// Encoded bytes of the last completed session.
    pub fn output(&self) -> &[u8] {
        self.writer.buf()
    }

    /// Take ownership of the encoded bytes, leaving the codec reusable.
    pub fn take_output(&mut self) -> Vec<u8> {
        self.writer.take_buf()
    }

    /// Replay the symbol log into the bit register. The arithmetic
    /// decoder is simulated against the finished side buffer: wherever it
    /// would pull a byte, that byte is spliced into the unified stream.
    fn assemble(&mut self) {
        let arith_buf = self.arith_enc.buf();
        let mut ofs = 0usize;
        let mut value = 0u32;
        let mut length = 0u32;

        for sym in &self.syms {
            match *sym {
                OutputSymbol::Bits { value: v, width } => {
                    self.writer.put_bits(v, u32::from(width));
                }
                OutputSymbol::AlignToByte => self.writer.align_to_byte(),
                OutputSymbol::ArithInit => {
                    value = 0;
                    length = MAX_INTERVAL;
                    for _ in 0..4 {
                        let c = arith_buf.get(ofs).copied().unwrap_or(0);
                        ofs += 1;
                        value = (value << 8) | u32::from(c);
                        self.writer.put_bits(u32::from(c), 8);
                    }
                }
                OutputSymbol::ArithBit { prob0 } => {
                    while length < MIN_INTERVAL {
                        let c = arith_buf.get(ofs).copied().unwrap_or(0);
                        ofs += 1;
                        value = (value << 8) | u32::from(c);
                        length <<= 8;
                        self.writer.put_bits(u32::from(c), 8);
                    }
                    let x = u32::from(prob0) * (length >> PROB_BITS);
                    if value >= x {
                        value -= x;
                        length -= x;
                    } else {
                        length = x;
                    }
                }
            }
        }
        self.writer.align_to_byte();
    }

    // ---------------------------------------------------------------
    // Decoding
    // ---------------------------------------------------------------

    /// Begin a decode session over a complete in-memory buffer.
    pub fn start_decoding(&mut self, buf: &'buf [u8]) -> Result<()> {
        self.begin_decoding(BitReader::new(buf, true, None))
    }

    /// Begin a decode session that pulls further input on demand.
    ///
    /// `refill` is invoked synchronously whenever the register runs out
    /// of buffered bytes before `eof` has been signalled; see
    /// [`crate::RefillFn`] for the contract.
    pub fn start_decoding_streaming<F>(
        &mut self,
        first_chunk: &'buf [u8],
        eof: bool,
        refill: F,
    ) -> Result<()>
    where
        F: FnMut(usize) -> (&'buf [u8], bool) + 'buf,
    {
        self.begin_decoding(BitReader::new(first_chunk, eof, Some(Box::new(refill))))
    }

    fn begin_decoding(&mut self, reader: BitReader<'buf>) -> Result<()> {
        if self.mode != Mode::Idle {
            return Err(CodecError::SessionActive);
        }
        self.reader = reader;
        self.arith_value = 0;
        self.arith_length = 0;
        self.total_model_updates = 0;
        self.mode = Mode::Decoding;
        Ok(())
    }

    /// Prime the arithmetic decoder from the next four stream bytes.
    /// Mirrors `encode_arith_init`.
    pub fn start_arith_decoding(&mut self) {
        debug_assert_eq!(self.mode, Mode::Decoding);
        self.arith_length = MAX_INTERVAL;
        self.arith_value = 0;
        for _ in 0..4 {
            self.arith_value = (self.arith_value << 8) | self.reader.get_bits(8);
        }
    }

    /// Read a raw fixed-width field.
    #[inline]
    pub fn decode_bits(&mut self, width: u32) -> u32 {
        debug_assert_eq!(self.mode, Mode::Decoding);
        self.reader.get_bits(width)
    }

    /// Look at the next `width` bits without consuming them.
    #[inline]
    pub fn decode_peek_bits(&mut self, width: u32) -> u32 {
        debug_assert_eq!(self.mode, Mode::Decoding);
        self.reader.peek_bits(width)
    }

    /// Consume bits previously peeked.
    #[inline]
    pub fn decode_remove_bits(&mut self, width: u32) {
        debug_assert_eq!(self.mode, Mode::Decoding);
        self.reader.peek_bits(width);
        self.reader.remove_bits(width);
    }

    /// Discard bits up to the next byte boundary.
    pub fn decode_align_to_byte(&mut self) {
        debug_assert_eq!(self.mode, Mode::Decoding);
        self.reader.align_to_byte();
    }

    /// Pop one whole byte out of the bit register, if one is buffered.
    pub fn decode_byte_from_register(&mut self) -> Option<u8> {
        debug_assert_eq!(self.mode, Mode::Decoding);
        self.reader.take_byte()
    }

    /// Decode one bit against an adaptive model. Mirrors `encode_bit`.
    #[inline]
    pub fn decode_bit(&mut self, model: &mut AdaptiveBitModel, update_model: bool) -> bool {
        debug_assert_eq!(self.mode, Mode::Decoding);
        debug_assert!(self.arith_length != 0, "start_arith_decoding must come first");
        while self.arith_length < MIN_INTERVAL {
            self.arith_value = (self.arith_value << 8) | self.reader.get_bits(8);
            self.arith_length <<= 8;
        }
        let x = u32::from(model.prob0) * (self.arith_length >> PROB_BITS);
        let bit = self.arith_value >= x;
        if bit {
            self.arith_value -= x;
            self.arith_length -= x;
        } else {
            self.arith_length = x;
        }
        if update_model {
            model.update(bit);
        }
        bit
    }

    /// Decode one alphabet symbol. Mirrors `encode_symbol`.
    ///
    /// Fails with [`CodecError::CorruptStream`] when the buffered bits
    /// match no code of the model's current assignment.
    #[inline]
    pub fn decode_symbol(&mut self, model: &mut HuffmanModel) -> Result<u32> {
        debug_assert_eq!(self.mode, Mode::Decoding);
        let k = self.reader.peek_bits(16) + 1;
        let table = model.table();

        let sym;
        let width;
        if table.table_max_code > 0 && k <= table.table_max_code {
            let entry = table.lookup[(self.reader.peek_bits(table.table_bits)) as usize];
            sym = entry & 0xFFFF;
            width = entry >> 16;
        } else {
            let mut len = table.decode_start_code_size as usize;
            while k > table.max_codes[len - 1] {
                len += 1;
            }
            if len > MAX_CODE_SIZE {
                return Err(CodecError::CorruptStream);
            }
            let idx =
                table.val_ptrs[len - 1] + (self.reader.peek_bits(len as u32) as i32);
            if idx < 0 || idx as usize >= table.sorted_symbols.len() {
                return Err(CodecError::CorruptStream);
            }
            sym = u32::from(table.sorted_symbols[idx as usize]);
            width = len as u32;
        }
        self.reader.remove_bits(width);
        if model.tally(sym) {
            self.total_model_updates += 1;
        }
        Ok(sym)
    }

    /// Total bytes pulled from the input so far.
    pub fn decode_bytes_consumed(&self) -> u64 {
        self.reader.bytes_consumed()
    }

    /// Unread input bits, counting both the current chunk and the
    /// register.
    pub fn decode_bits_remaining(&self) -> u64 {
        self.reader.bits_remaining()
    }

    /// Debug view of the decode-side interval length.
    #[cfg(test)]
    pub(crate) fn arith_interval(&self) -> u32 {
        self.arith_length
    }

    /// Close the decode session. Returns the total bits consumed.
    pub fn stop_decoding(&mut self) -> Result<u64> {
        if self.mode != Mode::Decoding {
            return Err(CodecError::NoSession("decode"));
        }
        self.mode = Mode::Idle;
        let bits = self.reader.bits_consumed();
        debug!("decode session closed: {bits} bits consumed");
        Ok(bits)
    }
}

impl Default for SymbolCodec<'_> {
    fn default() -> Self {
        Self::new()
    }
}
