//! Helpers related to parsing

#[derive(PartialEq, Eq)]
pub(crate) struct Scan<'a>(&'a [u8]);

impl<'a> Scan<'a> {
    /// Create a new scanner from a byte slice.
    pub(crate) fn new(inner: &'a [u8]) -> Self {
        Self(inner)
    }

    /// Return the next byte in the scanner without consuming it.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.0.first().copied()
    }

    /// Consume the next byte in the scanner.
    pub(crate) fn next(&mut self) -> Option<u8> {
        let (&a, rest) = self.0.split_first()?;
        self.0 = rest;
        Some(a)
    }

    /// Return the rest of the scanner as a byte slice.
    pub(crate) fn rest(&self) -> &'a [u8] {
        self.0
    }

    /// Take the next `n` bytes from the scanner IF they exist.
    pub(crate) fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let (a, b) = self.0.split_at_checked(n)?;
        self.0 = b;
        Some(a)
    }

    /// Take the next `N` bytes as a fixed-size array, IF they exist.
    pub(crate) fn take_array<const N: usize>(&mut self) -> Option<&'a [u8; N]> {
        let (a, b) = self.0.split_first_chunk::<N>()?;
        self.0 = b;
        Some(a)
    }

    /// Consume a big-endian `u32`.
    pub(crate) fn be_u32(&mut self) -> Option<u32> {
        self.take_array().map(|b| u32::from_be_bytes(*b))
    }

    /// Consume a big-endian, two's complement `i32`.
    pub(crate) fn be_i32(&mut self) -> Option<i32> {
        self.take_array().map(|b| i32::from_be_bytes(*b))
    }

    /// Consume a big-endian, two's complement `i64`.
    pub(crate) fn be_i64(&mut self) -> Option<i64> {
        self.take_array().map(|b| i64::from_be_bytes(*b))
    }

    /// Advance the scanner only if the next byte is the expected one.
    /// Some(true) -> the expected byte was consumed
    /// Some(false) -> the expected byte was not consumed
    /// None -> the scanner is empty
    pub(crate) fn advance_on(&mut self, x: u8) -> Option<bool> {
        self.peek().map(|b| {
            if b == x {
                self.0 = &self.0[1..];
                true
            } else {
                false
            }
        })
    }

    /// Take bytes from the scanner until a predicate is true.
    /// Returns None if the predicate is never true.
    pub(crate) fn take_until<F>(&mut self, mut f: F) -> Option<&'a [u8]>
    where
        F: FnMut(u8) -> bool,
    {
        self.rest()
            .iter()
            .position(|&b| f(b))
            .and_then(|i| self.take(i))
    }

    /// Return the remaining length of the scanner.
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}
