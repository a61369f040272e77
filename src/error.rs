use thiserror::Error;

/// A structural problem found by [`crate::Trie::check_invariants`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("child array under `{}` has {len} slots, expected a power of two up to 256", .key.escape_ascii())]
    ChildArrayLen { key: Vec<u8>, len: usize },

    #[error("child array under `{}` starts at {base:#04x}, not a multiple of its length {len}", .key.escape_ascii())]
    MisalignedBase { key: Vec<u8>, base: u8, len: usize },

    #[error("found {counted} live values, but the trie records {recorded}")]
    LenMismatch { counted: usize, recorded: usize },
}
