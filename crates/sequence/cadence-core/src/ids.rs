//! Identifiers and a simple allocator for tokens.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub u32);

/// Monotonic allocator for TokenId.
/// IDs are opaque externally; they only show up in logs and introspection.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_token: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_token(&mut self) -> TokenId {
        let id = TokenId(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "token#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_token(), TokenId(0));
        assert_eq!(alloc.alloc_token(), TokenId(1));
        alloc.reset();
        assert_eq!(alloc.alloc_token(), TokenId(0));
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(TokenId(7).to_string(), "token#7");
    }
}
