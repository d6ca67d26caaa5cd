//! Packed Nucleotide Encoding
//!
//! 2-bit packed nucleotide format (ncbi2na) shared by the query and the
//! subject of an extension pass.
//!
//! # Encoding Scheme
//! - A = 0b00 (0)
//! - C = 0b01 (1)
//! - G = 0b10 (2)
//! - T/U = 0b11 (3)
//!
//! # Packing Order
//! 4 nucleotides are packed into each byte, most significant bits first:
//! - Base 0: bits 6-7 (shift 6)
//! - Base 1: bits 4-5 (shift 4)
//! - Base 2: bits 2-3 (shift 2)
//! - Base 3: bits 0-1 (shift 0)
//!
//! Because of this order, XOR-ing two packed bytes leaves a zero 2-bit field
//! exactly where the two bases agree, which is what the approximate
//! extension's score table is keyed on.

/// Compression ratio: 4 nucleotides per byte
pub const COMPRESSION_RATIO: usize = 4;

/// Bit mask for extracting a single 2-bit base
pub const NCBI2NA_MASK: u8 = 0x03;

// IUPAC letter -> BLASTNA code. The low two bits of every ambiguity code
// land on one of the four concrete bases.
const IUPACNA_TO_BLASTNA: [u8; 128] = [
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
    15,  0, 10,  1, 11, 15, 15,  2, 12, 15, 15,  7, 15,  6, 14, 15,
    15, 15,  4,  9,  3,  3, 13,  8, 15,  5, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15,
];

/// Lookup table for decoding 2-bit codes to ASCII nucleotides
const DECODE_TABLE: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Extract base `n` (counted from the least significant pair) of a packed byte
#[inline(always)]
pub fn unpack_base_n(byte: u8, n: usize) -> u8 {
    (byte >> (2 * n)) & NCBI2NA_MASK
}

/// Pack four 2-bit codes into one byte, first code in the high bits
#[inline(always)]
pub fn pack_word(q: &[u8]) -> u8 {
    (q[0] << 6) | (q[1] << 4) | (q[2] << 2) | q[3]
}

/// Encode a single ASCII nucleotide to its ncbi2na code.
///
/// Ambiguity codes are reduced to a concrete base instead of being
/// rejected, so every position of a packed sequence carries a base.
#[inline]
pub fn encode_base(base: u8) -> u8 {
    let idx = base.to_ascii_uppercase() as usize;
    let code = if idx < IUPACNA_TO_BLASTNA.len() {
        IUPACNA_TO_BLASTNA[idx]
    } else {
        15
    };
    code & NCBI2NA_MASK
}

/// Encode an ASCII sequence to ncbi2na codes, one base per byte
pub fn encode_iupac_to_ncbi2na(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| encode_base(b)).collect()
}

/// A 2-bit packed nucleotide sequence
///
/// Immutable once built; extension passes only ever borrow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSequence {
    data: Vec<u8>,
    len: usize,
}

impl PackedSequence {
    /// Pack an ASCII nucleotide sequence (case-insensitive, IUPAC allowed)
    pub fn new(seq: &[u8]) -> Self {
        let codes = encode_iupac_to_ncbi2na(seq);
        Self::from_ncbi2na(&codes)
    }

    /// Pack a sequence that is already in ncbi2na codes (values 0..=3)
    pub fn from_ncbi2na(codes: &[u8]) -> Self {
        let len = codes.len();
        let mut data = vec![0u8; (len + COMPRESSION_RATIO - 1) / COMPRESSION_RATIO];

        let mut chunks = codes.chunks_exact(COMPRESSION_RATIO);
        for (byte, chunk) in data.iter_mut().zip(&mut chunks) {
            *byte = pack_word(chunk);
        }
        let tail = chunks.remainder();
        if !tail.is_empty() {
            let last = data.len() - 1;
            for (i, &code) in tail.iter().enumerate() {
                data[last] |= (code & NCBI2NA_MASK) << (6 - 2 * i);
            }
        }

        Self { data, len }
    }

    /// Length of the sequence in nucleotides
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed bytes; the last byte may be partially filled
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 2-bit code of the base at `pos`
    #[inline(always)]
    pub fn get_base(&self, pos: usize) -> u8 {
        debug_assert!(pos < self.len, "base {} past sequence end {}", pos, self.len);
        let byte = self.data[pos / COMPRESSION_RATIO];
        unpack_base_n(byte, 3 - (pos % COMPRESSION_RATIO))
    }

    /// The four bases starting at `pos`, packed into one byte.
    ///
    /// Aligned offsets read a stored byte directly; unaligned offsets
    /// splice the two bytes the window straddles.
    #[inline(always)]
    pub fn byte_at(&self, pos: usize) -> u8 {
        debug_assert!(pos + COMPRESSION_RATIO <= self.len);
        let idx = pos / COMPRESSION_RATIO;
        let rem = pos % COMPRESSION_RATIO;
        if rem == 0 {
            return self.data[idx];
        }
        let pair = ((self.data[idx] as u16) << 8) | self.data[idx + 1] as u16;
        (pair >> (8 - 2 * rem)) as u8
    }

    /// Word of `k` bases starting at `pos`, first base in the high bits
    #[inline]
    pub fn extract_word(&self, pos: usize, k: usize) -> Option<u64> {
        if k > 32 || pos + k > self.len {
            return None;
        }
        let mut word = 0u64;
        for i in 0..k {
            word = (word << 2) | self.get_base(pos + i) as u64;
        }
        Some(word)
    }

    pub fn reverse_complement(&self) -> Self {
        let codes: Vec<u8> = (0..self.len)
            .rev()
            .map(|i| NCBI2NA_MASK - self.get_base(i))
            .collect();
        Self::from_ncbi2na(&codes)
    }

    /// Unpack back to ASCII; ambiguity codes come back as their reduced base
    pub fn unpack(&self) -> Vec<u8> {
        (0..self.len)
            .map(|i| DECODE_TABLE[self.get_base(i) as usize])
            .collect()
    }
}
