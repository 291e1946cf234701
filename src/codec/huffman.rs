//! Quasi-adaptive canonical Huffman model.
//!
//! Symbol frequencies accumulate while coding runs; codes are rebuilt
//! only every `update_cycle` symbols, and the cycle stretches toward a
//! ceiling as the statistics stabilize, trading rebuild cost against
//! responsiveness. Encoder and decoder instances seeded identically and
//! driven with the same symbol sequence rebuild identical codes at
//! identical points; nothing checks that at run time.

use log::trace;

use crate::cost::{BitCost, BIT_COST_SCALE_SHIFT};
use crate::error::{CodecError, Result};

use super::prefix::{self, DecodeTable};

/// Frequency total that forces a rescale before the next code rebuild.
/// Together with [`CYCLE_CEILING`] this keeps every 16-bit counter from
/// ever overflowing: a post-rebuild total is below the threshold, and one
/// cycle adds at most the ceiling on top.
const RESCALE_THRESHOLD: u32 = 1 << 15;

/// Hard cap on the adaptive update cycle.
const CYCLE_CEILING: u32 = 1 << 14;

/// Quasi-adaptive canonical Huffman model over a fixed alphabet.
///
/// Construct one per coding context, mirrored on the encode and decode
/// sides. The decode table is owned exclusively by its model; cloning a
/// model deep-clones the table.
#[derive(Debug, Clone)]
pub struct HuffmanModel {
    sym_freq: Vec<u16>,
    code_sizes: Vec<u8>,
    /// Canonical codes, materialized on the encode side only.
    codes: Vec<u16>,
    /// Fast decode table, materialized on the decode side only.
    decode_table: Option<Box<DecodeTable>>,
    total_count: u32,
    update_cycle: u32,
    symbols_until_update: u32,
    max_cycle: u32,
    encoding: bool,
    fast_update: bool,
    polar_codes: bool,
}

impl HuffmanModel {
    /// New model over `total_syms` symbols (1..=8192), starting from
    /// uniform statistics.
    ///
    /// `encoding` selects which side's tables are materialized.
    /// `fast_update` shortens the rebuild schedule for models whose
    /// statistics drift quickly; `polar_codes` swaps the length
    /// assignment for the cheaper power-of-two variant.
    pub fn new(
        encoding: bool,
        total_syms: usize,
        fast_update: bool,
        polar_codes: bool,
    ) -> Result<Self> {
        if total_syms == 0 || total_syms > prefix::MAX_SYMBOLS {
            return Err(CodecError::AlphabetSize { total_syms });
        }
        let max_cycle =
            ((total_syms as u32 + 6) << if fast_update { 3 } else { 4 }).min(CYCLE_CEILING);
        let mut model = Self {
            sym_freq: vec![0; total_syms],
            code_sizes: vec![0; total_syms],
            codes: if encoding { vec![0; total_syms] } else { Vec::new() },
            decode_table: (!encoding).then(|| {
                Box::new(DecodeTable::new(prefix::decoder_table_bits(total_syms)))
            }),
            total_count: 0,
            update_cycle: 0,
            symbols_until_update: 0,
            max_cycle,
            encoding,
            fast_update,
            polar_codes,
        };
        model.reset();
        Ok(model)
    }

    pub fn total_syms(&self) -> usize {
        self.sym_freq.len()
    }

    /// Estimated cost of coding `sym` with the current code.
    #[inline]
    pub fn cost(&self, sym: u32) -> BitCost {
        BitCost::from(self.code_sizes[sym as usize]) << BIT_COST_SCALE_SHIFT
    }

    /// Back to uniform statistics, fresh codes and a short update cycle.
    pub fn reset(&mut self) {
        self.sym_freq.fill(1);
        self.total_count = self.sym_freq.len() as u32;
        self.rebuild();
        let initial = self.initial_cycle();
        self.update_cycle = initial;
        self.symbols_until_update = initial;
    }

    fn initial_cycle(&self) -> u32 {
        if self.fast_update {
            4
        } else {
            8
        }
    }

    /// Restart the cycle growth without touching the statistics; call
    /// when the input is suspected to have shifted and the model should
    /// re-adapt quickly.
    pub fn reset_update_rate(&mut self) {
        self.update_cycle = self.initial_cycle();
        self.symbols_until_update = self.symbols_until_update.min(self.update_cycle);
    }

    /// Halve every frequency, keeping each at least 1. The statistical
    /// shape survives while the totals shrink back into range.
    pub fn rescale(&mut self) {
        let mut total = 0u32;
        for f in &mut self.sym_freq {
            let halved = ((u32::from(*f) + 1) >> 1) as u16;
            *f = halved;
            total += u32::from(halved);
        }
        self.total_count = total;
    }

    /// Record one coded symbol. Returns `true` when the cycle expired and
    /// the codes were rebuilt.
    #[inline]
    pub(crate) fn tally(&mut self, sym: u32) -> bool {
        self.sym_freq[sym as usize] += 1;
        self.symbols_until_update -= 1;
        if self.symbols_until_update == 0 {
            self.update();
            true
        } else {
            false
        }
    }

    /// Rebuild codes from the accumulated statistics and stretch the
    /// cycle.
    pub(crate) fn update(&mut self) {
        self.total_count += self.update_cycle;
        if self.total_count >= RESCALE_THRESHOLD {
            self.rescale();
        }
        self.rebuild();
        // Fast models double the cycle, normal ones grow by 5/4.
        let next = if self.fast_update {
            self.update_cycle * 2
        } else {
            (self.update_cycle * 5) >> 2
        };
        self.update_cycle = next.clamp(1, self.max_cycle);
        self.symbols_until_update = self.update_cycle;
    }

    fn rebuild(&mut self) {
        if self.polar_codes {
            prefix::polar_code_sizes(&self.sym_freq, &mut self.code_sizes);
        } else {
            prefix::huffman_code_sizes(&self.sym_freq, &mut self.code_sizes);
        }
        if self.encoding {
            prefix::generate_codes(&self.code_sizes, &mut self.codes);
        } else if let Some(table) = self.decode_table.as_mut() {
            table.build(&self.code_sizes);
        }
        trace!(
            "rebuilt {} codes (total_count={}, cycle={})",
            self.sym_freq.len(),
            self.total_count,
            self.update_cycle
        );
    }

    /// Current canonical code and width for `sym` (encode side).
    #[inline]
    pub(crate) fn code_for(&self, sym: u32) -> (u32, u32) {
        debug_assert!(self.encoding, "model was constructed for decoding");
        (
            u32::from(self.codes[sym as usize]),
            u32::from(self.code_sizes[sym as usize]),
        )
    }

    /// Current decode table (decode side).
    #[inline]
    pub(crate) fn table(&self) -> &DecodeTable {
        debug_assert!(!self.encoding, "model was constructed for encoding");
        self.decode_table
            .as_deref()
            .unwrap_or(&EMPTY_DECODE_TABLE)
    }

    #[cfg(test)]
    pub(crate) fn frequencies(&self) -> &[u16] {
        &self.sym_freq
    }

    /// Install explicit code sizes, bypassing the statistics. Lets tests
    /// build codes with gaps that frequency-derived Huffman assignments
    /// rarely produce.
    #[cfg(test)]
    pub(crate) fn force_code_sizes(&mut self, sizes: &[u8]) {
        assert_eq!(sizes.len(), self.code_sizes.len());
        self.code_sizes.copy_from_slice(sizes);
        if self.encoding {
            prefix::generate_codes(&self.code_sizes, &mut self.codes);
        } else if let Some(table) = self.decode_table.as_mut() {
            table.build(&self.code_sizes);
        }
    }

    #[cfg(test)]
    pub(crate) fn update_cycle(&self) -> u32 {
        self.update_cycle
    }

    #[cfg(test)]
    pub(crate) fn max_cycle(&self) -> u32 {
        self.max_cycle
    }
}

/// Fallback for the impossible encode-side `table()` call in release
/// builds; decodes nothing but keeps the hot path free of panics.
static EMPTY_DECODE_TABLE: DecodeTable = DecodeTable {
    table_bits: 0,
    table_max_code: 0,
    decode_start_code_size: 1,
    max_codes: [u32::MAX; prefix::MAX_CODE_SIZE + 1],
    val_ptrs: [0; prefix::MAX_CODE_SIZE + 1],
    lookup: Vec::new(),
    sorted_symbols: Vec::new(),
};
