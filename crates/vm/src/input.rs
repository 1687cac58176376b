//! Code units the engine can match against.

/// The atomic comparison element of an input sequence.
///
/// The engine only ever compares code units by their numeric value, so any
/// slice of bytes, UTF-16 units, UTF-32 units or `char`s can be matched.
pub trait CodeUnit: Copy {
    fn code(self) -> u32;
}

impl CodeUnit for u8 {
    #[inline]
    fn code(self) -> u32 {
        self as u32
    }
}

impl CodeUnit for u16 {
    #[inline]
    fn code(self) -> u32 {
        self as u32
    }
}

impl CodeUnit for u32 {
    #[inline]
    fn code(self) -> u32 {
        self
    }
}

impl CodeUnit for char {
    #[inline]
    fn code(self) -> u32 {
        self as u32
    }
}
