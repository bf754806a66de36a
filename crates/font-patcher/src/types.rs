//! Domain-specific newtypes.

use std::fmt::{self, Display, Formatter};

/// A Unicode codepoint
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codepoint(pub u32);

impl Codepoint {
    pub const fn new(cp: u32) -> Self {
        Self(cp)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// Convert to a Rust char if valid
    pub fn to_char(self) -> Option<char> {
        char::from_u32(self.0)
    }

    /// Whether the codepoint lies in one of the Private Use Areas.
    pub const fn is_private_use(self) -> bool {
        matches!(self.0, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD)
    }

    /// Default glyph name for a codepoint without one (`uniE0B0`, `u1F600`).
    pub fn glyph_name(self) -> String {
        if self.0 <= 0xFFFF { format!("uni{:04X}", self.0) } else { format!("u{:05X}", self.0) }
    }
}

impl From<u32> for Codepoint {
    fn from(cp: u32) -> Self {
        Self(cp)
    }
}

impl From<Codepoint> for u32 {
    fn from(cp: Codepoint) -> Self {
        cp.0
    }
}

impl Display for Codepoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "U+{:04X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codepoint_display() {
        assert_eq!(Codepoint::new(0xE0B0).to_string(), "U+E0B0");
        assert_eq!(Codepoint::new(0x41).to_string(), "U+0041");
        assert_eq!(Codepoint::new(0xF0001).to_string(), "U+F0001");
    }

    #[test]
    fn test_private_use() {
        assert!(Codepoint::new(0xE0A0).is_private_use());
        assert!(Codepoint::new(0xF1AF0).is_private_use());
        assert!(!Codepoint::new(0x2665).is_private_use());
    }

    #[test]
    fn test_glyph_name() {
        assert_eq!(Codepoint::new(0xE0B0).glyph_name(), "uniE0B0");
        assert_eq!(Codepoint::new(0xF0001).glyph_name(), "uF0001");
    }
}
