//! Canonical prefix-code construction and the fast decode table.
//!
//! Code lengths are derived from symbol frequencies — optimally (Huffman)
//! or with a faster power-of-two approximation ("polar") — then turned
//! into canonical codes: within each length, codes are assigned in symbol
//! order, so the whole assignment can be rebuilt from lengths alone.
//! Decoding uses a direct lookup table for codes short enough to index
//! it, and a per-length search for the longer tail.

use std::cmp::Reverse;

/// Longest supported code, in bits.
pub(crate) const MAX_CODE_SIZE: usize = 16;

/// Upper bound on the direct lookup table's index width.
pub(crate) const MAX_TABLE_BITS: u32 = 11;

/// Largest supported alphabet.
pub(crate) const MAX_SYMBOLS: usize = 8192;

/// Kraft sum of a complete prefix code, in units of `2^-MAX_CODE_SIZE`.
const KRAFT_TARGET: u64 = 1 << MAX_CODE_SIZE;

pub(crate) fn ceil_log2(v: u32) -> u32 {
    debug_assert!(v > 0);
    32 - (v - 1).leading_zeros()
}

/// Index width of the direct lookup table for an alphabet of `total_syms`.
/// Tiny alphabets skip the table; the per-length search is already cheap.
pub(crate) fn decoder_table_bits(total_syms: usize) -> u32 {
    if total_syms <= 16 {
        0
    } else {
        (1 + ceil_log2(total_syms as u32)).min(MAX_TABLE_BITS)
    }
}

/// Canonical Huffman code lengths from symbol frequencies.
///
/// Zero-frequency symbols get no code. Ties are broken by symbol index so
/// encoder and decoder always derive identical assignments. Lengths are
/// capped at [`MAX_CODE_SIZE`].
pub(crate) fn huffman_code_sizes(freqs: &[u16], sizes: &mut [u8]) {
    debug_assert_eq!(freqs.len(), sizes.len());
    debug_assert!(freqs.len() <= MAX_SYMBOLS);
    sizes.fill(0);

    let mut order: Vec<u16> = (0..freqs.len() as u16)
        .filter(|&s| freqs[s as usize] > 0)
        .collect();
    order.sort_unstable_by_key(|&s| (freqs[s as usize], s));

    match order.len() {
        0 => return,
        1 => {
            sizes[order[0] as usize] = 1;
            return;
        }
        _ => {}
    }

    // Two-queue Huffman merge: the sorted leaves form one non-decreasing
    // queue, internal nodes are created in non-decreasing order and form
    // the other, so each step takes the two cheapest fronts in O(1).
    let n = order.len();
    let mut freq_q: Vec<u64> = Vec::with_capacity(2 * n - 1);
    freq_q.extend(order.iter().map(|&s| u64::from(freqs[s as usize])));
    freq_q.resize(2 * n - 1, 0);
    let mut parent = vec![0u32; 2 * n - 1];

    let mut leaf = 0usize;
    let mut internal = n;
    for next_node in n..2 * n - 1 {
        for _ in 0..2 {
            let pick = if leaf < n && (internal == next_node || freq_q[leaf] <= freq_q[internal]) {
                leaf += 1;
                leaf - 1
            } else {
                internal += 1;
                internal - 1
            };
            freq_q[next_node] += freq_q[pick];
            parent[pick] = next_node as u32;
        }
    }

    // Depths fall out of a reverse walk: parents always sit above their
    // children in index order.
    let mut depth = vec![0u16; 2 * n - 1];
    for node in (0..2 * n - 2).rev() {
        depth[node] = depth[parent[node] as usize] + 1;
    }
    for (slot, &sym) in order.iter().enumerate() {
        sizes[sym as usize] = depth[slot].min(MAX_CODE_SIZE as u16) as u8;
    }

    limit_code_sizes(freqs, sizes);
}

/// Alternate "polar" length assignment: each used symbol gets
/// `ceil(log2(total / freq))`, then the lengths are repaired to a valid
/// prefix code. Cheaper to compute than Huffman and close in rate on
/// smooth distributions.
pub(crate) fn polar_code_sizes(freqs: &[u16], sizes: &mut [u8]) {
    debug_assert_eq!(freqs.len(), sizes.len());
    sizes.fill(0);

    let total: u32 = freqs.iter().map(|&f| u32::from(f)).sum();
    if total == 0 {
        return;
    }
    for (sym, &f) in freqs.iter().enumerate() {
        if f > 0 {
            let ratio = total.div_ceil(u32::from(f));
            sizes[sym] = ceil_log2(ratio).clamp(1, MAX_CODE_SIZE as u32) as u8;
        }
    }

    limit_code_sizes(freqs, sizes);
    tighten_code_sizes(freqs, sizes);
}

fn kraft_sum(sizes: &[u8]) -> u64 {
    sizes
        .iter()
        .filter(|&&s| s > 0)
        .map(|&s| 1u64 << (MAX_CODE_SIZE - s as usize))
        .sum()
}

/// Cap lengths at [`MAX_CODE_SIZE`] and restore the Kraft inequality by
/// stretching the longest still-stretchable codes.
fn limit_code_sizes(freqs: &[u16], sizes: &mut [u8]) {
    for s in sizes.iter_mut() {
        if *s as usize > MAX_CODE_SIZE {
            *s = MAX_CODE_SIZE as u8;
        }
    }
    let mut kraft = kraft_sum(sizes);
    while kraft > KRAFT_TARGET {
        // Always satisfiable: even every code at MAX_CODE_SIZE fits an
        // alphabet of MAX_SYMBOLS.
        let Some(sym) = (0..sizes.len())
            .filter(|&i| sizes[i] > 0 && (sizes[i] as usize) < MAX_CODE_SIZE)
            .max_by_key(|&i| (sizes[i], Reverse(freqs[i]), i))
        else {
            break;
        };
        kraft -= 1u64 << (MAX_CODE_SIZE - sizes[sym] as usize - 1);
        sizes[sym] += 1;
    }
}

/// Hand spare code space back to the most frequent symbols.
fn tighten_code_sizes(freqs: &[u16], sizes: &mut [u8]) {
    let mut kraft = kraft_sum(sizes);
    let mut order: Vec<usize> = (0..sizes.len()).filter(|&i| sizes[i] > 0).collect();
    order.sort_unstable_by_key(|&i| (Reverse(freqs[i]), i));
    loop {
        let mut changed = false;
        for &sym in &order {
            while sizes[sym] > 1 {
                let gain = 1u64 << (MAX_CODE_SIZE - sizes[sym] as usize);
                if kraft + gain > KRAFT_TARGET {
                    break;
                }
                kraft += gain;
                sizes[sym] -= 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

/// Canonical codes from lengths: shorter lengths first, symbol order
/// within a length.
pub(crate) fn generate_codes(sizes: &[u8], codes: &mut [u16]) {
    debug_assert_eq!(sizes.len(), codes.len());
    let mut num_codes = [0u32; MAX_CODE_SIZE + 1];
    for &s in sizes {
        num_codes[s as usize] += u32::from(s > 0);
    }

    let mut next_code = [0u32; MAX_CODE_SIZE + 1];
    let mut code = 0u32;
    for len in 1..=MAX_CODE_SIZE {
        code = (code + num_codes[len - 1]) << 1;
        next_code[len] = code;
    }

    for (sym, &s) in sizes.iter().enumerate() {
        if s > 0 {
            codes[sym] = next_code[s as usize] as u16;
            next_code[s as usize] += 1;
        }
    }
}

/// Entry marking an index the canonical code never reaches.
const UNUSED_ENTRY: u32 = u32::MAX;

/// Fast canonical-code decode table.
///
/// `lookup` resolves every code of length `<= table_bits` from the top
/// `table_bits` stream bits, packing `(length << 16) | symbol` per entry.
/// Longer codes walk `max_codes` length by length: canonical codes tile
/// the 16-bit left-justified key space contiguously, so a code's length
/// is the first `len` whose upper bound covers the key, and its symbol
/// sits at `val_ptrs[len] + key_prefix` in `sorted_symbols`.
#[derive(Debug, Clone)]
pub(crate) struct DecodeTable {
    pub table_bits: u32,
    /// Largest `peek16 + 1` key the direct lookup covers.
    pub table_max_code: u32,
    /// First length the per-length walk probes.
    pub decode_start_code_size: u32,
    /// Exclusive upper bound of each length's key range, 16-bit
    /// normalized; a sentinel in the last slot terminates the walk.
    pub max_codes: [u32; MAX_CODE_SIZE + 1],
    /// Offset of each length's run in `sorted_symbols`, biased by the
    /// length's first canonical code.
    pub val_ptrs: [i32; MAX_CODE_SIZE + 1],
    pub lookup: Vec<u32>,
    pub sorted_symbols: Vec<u16>,
}

impl DecodeTable {
    pub fn new(table_bits: u32) -> Self {
        debug_assert!(table_bits <= MAX_TABLE_BITS);
        Self {
            table_bits,
            table_max_code: 0,
            decode_start_code_size: 0,
            max_codes: [0; MAX_CODE_SIZE + 1],
            val_ptrs: [0; MAX_CODE_SIZE + 1],
            lookup: Vec::new(),
            sorted_symbols: Vec::new(),
        }
    }

    /// Rebuild the table for a new set of code lengths.
    pub fn build(&mut self, sizes: &[u8]) {
        let mut num_codes = [0u32; MAX_CODE_SIZE + 1];
        for &s in sizes {
            if s > 0 {
                num_codes[s as usize] += 1;
            }
        }

        let mut min_codes = [0u32; MAX_CODE_SIZE];
        let mut sorted_positions = [0usize; MAX_CODE_SIZE + 1];
        let mut next_code = 0u32;
        let mut total_used = 0usize;
        let mut min_code_size = 0usize;
        let mut max_code_size = 0usize;

        for len in 1..=MAX_CODE_SIZE {
            let n = num_codes[len];
            if n == 0 {
                self.max_codes[len - 1] = 0;
                self.val_ptrs[len - 1] = 0;
            } else {
                if min_code_size == 0 {
                    min_code_size = len;
                }
                max_code_size = len;
                min_codes[len - 1] = next_code;
                let max_code = next_code + n - 1;
                self.max_codes[len - 1] = (max_code + 1) << (MAX_CODE_SIZE - len);
                self.val_ptrs[len - 1] = total_used as i32 - next_code as i32;
                sorted_positions[len] = total_used;
                next_code += n;
                total_used += n as usize;
            }
            next_code <<= 1;
        }
        // Sentinel: the walk always terminates, and a key that lands here
        // is reported as corruption by the caller's range check.
        self.max_codes[MAX_CODE_SIZE] = u32::MAX;
        self.val_ptrs[MAX_CODE_SIZE] = 0;

        self.sorted_symbols.clear();
        self.sorted_symbols.resize(total_used, 0);
        for (sym, &s) in sizes.iter().enumerate() {
            if s > 0 {
                self.sorted_symbols[sorted_positions[s as usize]] = sym as u16;
                sorted_positions[s as usize] += 1;
            }
        }

        self.table_max_code = 0;
        self.decode_start_code_size = min_code_size as u32;

        if self.table_bits == 0 {
            self.lookup.clear();
            return;
        }

        self.lookup.clear();
        self.lookup.resize(1 << self.table_bits, UNUSED_ENTRY);
        let covered = (self.table_bits as usize).min(max_code_size);
        for len in 1..=covered {
            if num_codes[len] == 0 {
                continue;
            }
            let fill_shift = self.table_bits as usize - len;
            let min_code = min_codes[len - 1];
            let max_code = min_code + num_codes[len] - 1;
            for code in min_code..=max_code {
                let slot = (self.val_ptrs[len - 1] + code as i32) as usize;
                let entry = ((len as u32) << 16) | u32::from(self.sorted_symbols[slot]);
                let start = (code as usize) << fill_shift;
                for t in &mut self.lookup[start..start + (1 << fill_shift)] {
                    *t = entry;
                }
            }
            self.table_max_code = self.max_codes[len - 1];
        }

        if self.table_max_code > 0 {
            // The walk only ever starts past the table's reach.
            self.decode_start_code_size = self.table_bits + 1;
            for len in self.table_bits as usize + 1..=max_code_size {
                if num_codes[len] > 0 {
                    self.decode_start_code_size = len as u32;
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huffman_sizes_for_skewed_frequencies() {
        let freqs = [100u16, 10, 1, 1];
        let mut sizes = [0u8; 4];
        huffman_code_sizes(&freqs, &mut sizes);
        assert_eq!(sizes, [1, 2, 3, 3]);
    }

    #[test]
    fn huffman_sizes_for_uniform_frequencies() {
        let freqs = [1u16; 4];
        let mut sizes = [0u8; 4];
        huffman_code_sizes(&freqs, &mut sizes);
        assert_eq!(sizes, [2, 2, 2, 2]);
    }

    #[test]
    fn single_symbol_gets_a_one_bit_code() {
        let freqs = [7u16];
        let mut sizes = [0u8; 1];
        huffman_code_sizes(&freqs, &mut sizes);
        assert_eq!(sizes, [1]);
    }

    #[test]
    fn zero_frequency_symbols_get_no_code() {
        let freqs = [5u16, 0, 3, 0];
        let mut sizes = [0u8; 4];
        huffman_code_sizes(&freqs, &mut sizes);
        assert_eq!(sizes[1], 0);
        assert_eq!(sizes[3], 0);
        assert_eq!(sizes[0], 1);
        assert_eq!(sizes[2], 1);
    }

    #[test]
    fn lengths_respect_the_cap() {
        // Fibonacci-ish frequencies force very deep Huffman trees.
        let mut freqs = [0u16; 24];
        let (mut a, mut b) = (1u32, 1u32);
        for f in freqs.iter_mut() {
            *f = a.min(u32::from(u16::MAX)) as u16;
            let next = (a + b).min(1 << 14);
            a = b;
            b = next;
        }
        let mut sizes = [0u8; 24];
        huffman_code_sizes(&freqs, &mut sizes);
        assert!(sizes.iter().all(|&s| s > 0 && s as usize <= MAX_CODE_SIZE));
        assert!(kraft_sum(&sizes) <= KRAFT_TARGET);
    }

    #[test]
    fn polar_sizes_form_a_valid_code() {
        let freqs = [1000u16, 200, 50, 9, 3, 1, 1, 1];
        let mut sizes = [0u8; 8];
        polar_code_sizes(&freqs, &mut sizes);
        assert!(sizes.iter().all(|&s| s > 0 && s as usize <= MAX_CODE_SIZE));
        assert!(kraft_sum(&sizes) <= KRAFT_TARGET);
        // More frequent symbols never get longer codes.
        for w in 0..7 {
            assert!(sizes[w] <= sizes[w + 1]);
        }
    }

    #[test]
    fn canonical_codes_match_the_textbook_layout() {
        let sizes = [1u8, 2, 2];
        let mut codes = [0u16; 3];
        generate_codes(&sizes, &mut codes);
        assert_eq!(codes, [0b0, 0b10, 0b11]);
    }

    #[test]
    fn canonical_codes_tie_break_by_symbol_index() {
        let sizes = [2u8, 1, 2];
        let mut codes = [0u16; 3];
        generate_codes(&sizes, &mut codes);
        assert_eq!(codes[1], 0b0);
        assert_eq!(codes[0], 0b10);
        assert_eq!(codes[2], 0b11);
    }

    /// Decode one symbol from a left-justified 16-bit key, the same way
    /// the codec's hot path does.
    fn decode_key(table: &DecodeTable, key16: u32) -> Option<(u32, u32)> {
        let k = key16 + 1;
        if table.table_max_code > 0 && k <= table.table_max_code {
            let t = table.lookup[(key16 >> (16 - table.table_bits)) as usize];
            assert_ne!(t, UNUSED_ENTRY);
            return Some((t & 0xFFFF, t >> 16));
        }
        let mut len = table.decode_start_code_size as usize;
        while k > table.max_codes[len - 1] {
            len += 1;
        }
        if len > MAX_CODE_SIZE {
            return None;
        }
        let idx = table.val_ptrs[len - 1] + (key16 >> (16 - len)) as i32;
        if idx < 0 || idx as usize >= table.sorted_symbols.len() {
            return None;
        }
        Some((u32::from(table.sorted_symbols[idx as usize]), len as u32))
    }

    #[test]
    fn decode_table_resolves_every_code() {
        let sizes = [1u8, 3, 3, 4, 4, 4, 4];
        let mut codes = [0u16; 7];
        generate_codes(&sizes, &mut codes);

        let mut table = DecodeTable::new(2);
        table.build(&sizes);

        for sym in 0..7u32 {
            let len = u32::from(sizes[sym as usize]);
            // Left-justify the code and fill the tail with ones to prove
            // the suffix is ignored.
            let key = (u32::from(codes[sym as usize]) << (16 - len)) | ((1 << (16 - len)) - 1);
            assert_eq!(decode_key(&table, key), Some((sym, len)), "symbol {sym}");
        }
    }

    #[test]
    fn decode_table_direct_path_covers_short_codes() {
        let sizes = [2u8; 4];
        let mut table = DecodeTable::new(4);
        table.build(&sizes);
        // Every 16-bit key starts with one of the four codes.
        assert_eq!(table.table_max_code, 1 << 16);
        for key in [0x0000u32, 0x5555, 0xABCD, 0xFFFF] {
            let (sym, len) = decode_key(&table, key).unwrap();
            assert_eq!(len, 2);
            assert_eq!(sym, key >> 14);
        }
    }

    #[test]
    fn decode_table_rejects_keys_past_the_code_space() {
        // Lengths [1, 2]: codes 0 and 10; keys starting 11... match nothing.
        let sizes = [1u8, 2];
        let mut table = DecodeTable::new(0);
        table.build(&sizes);
        assert_eq!(decode_key(&table, 0xFFFF), None);
    }
}
