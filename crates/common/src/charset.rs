//! Byte-class membership sets used by CHARSET and SPAN.

/// Size of an encoded charset: one bit per byte value.
pub const CHARSET_BYTES: usize = 256 / 8;

/// A fixed-size bitset with one bit per byte value (0–255).
///
/// Bit `b` lives in byte `b >> 3` at position `b & 7`, which is also the
/// order used by the binary encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Charset {
    bits: [u8; CHARSET_BYTES],
}

impl Charset {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from its raw 32-byte representation.
    pub fn from_bytes(bits: [u8; CHARSET_BYTES]) -> Self {
        Self { bits }
    }

    /// The raw 32-byte representation.
    pub fn as_bytes(&self) -> &[u8; CHARSET_BYTES] {
        &self.bits
    }

    /// Add a single byte value.
    pub fn insert(&mut self, byte: u8) {
        self.bits[(byte >> 3) as usize] |= 1 << (byte & 7);
    }

    /// Add every byte value in `lo..=hi`. Empty if `lo > hi`.
    pub fn insert_range(&mut self, lo: u8, hi: u8) {
        for byte in lo..=hi {
            self.insert(byte);
        }
    }

    /// Membership test for a byte value.
    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.bits[(byte >> 3) as usize] & (1 << (byte & 7)) != 0
    }

    /// Membership test for a code unit. Values above 255 are never members.
    #[inline]
    pub fn contains_unit(&self, unit: u32) -> bool {
        u8::try_from(unit).is_ok_and(|byte| self.contains(byte))
    }

    /// Set union.
    pub fn union(&self, other: &Charset) -> Charset {
        let mut bits = self.bits;
        for (dst, src) in bits.iter_mut().zip(other.bits.iter()) {
            *dst |= src;
        }
        Charset { bits }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=255u8).filter(move |&b| self.contains(b))
    }

    /// Members collapsed into maximal inclusive ranges, ascending.
    pub fn ranges(&self) -> Vec<(u8, u8)> {
        let mut ranges: Vec<(u8, u8)> = Vec::new();
        for byte in self.iter() {
            match ranges.last_mut() {
                Some((_, hi)) if *hi as u16 + 1 == byte as u16 => *hi = byte,
                _ => ranges.push((byte, byte)),
            }
        }
        ranges
    }
}

impl FromIterator<u8> for Charset {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Charset::new();
        for byte in iter {
            set.insert(byte);
        }
        set
    }
}

impl std::fmt::Debug for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Charset(")?;
        for (i, (lo, hi)) in self.ranges().into_iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if lo == hi {
                write!(f, "{lo:02x}")?;
            } else {
                write!(f, "{lo:02x}-{hi:02x}")?;
            }
        }
        write!(f, ")")
    }
}
