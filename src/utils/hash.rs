//! Content hashing using blake3.
//!
//! Production filenames and coalesced bundle names are derived from these
//! hashes, so identical bytes always produce identical names across builds.

use std::fmt;

/// Number of hex characters used in hashed filenames.
pub const FILENAME_HEX_LEN: usize = 20;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash a byte slice.
    #[inline]
    pub fn of<T: AsRef<[u8]> + ?Sized>(data: &T) -> Self {
        Self(*blake3::hash(data.as_ref()).as_bytes())
    }

    /// Get the raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// Shortened hex used as a file stem (`<stem><ext>`).
    pub fn file_stem(self) -> String {
        self.to_hex()[..FILENAME_HEX_LEN].to_string()
    }

    /// Hashed filename with the given extension (`.css`, `.js`, ...).
    pub fn file_name(self, ext: &str) -> String {
        format!("{}{}", self.file_stem(), ext)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display first 16 chars of hex for brevity
        write!(f, "{}", &self.to_hex()[..16])
    }
}
