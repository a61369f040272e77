//! # edge-trie
//!
//! An ordered map from byte strings to values, stored as an edge-compressed
//! radix (PATRICIA) trie. Lookups, insertions and prefix queries cost time
//! proportional to the key length, and iteration yields keys in byte order.
//!
//! ## Example
//!
//! ```rust
//! use edge_trie::Trie;
//!
//! let mut trie: Trie<u64> = Trie::new();
//! trie.insert(b"fooaaaa", 1);
//! trie.insert(b"foocdef", 2);
//!
//! assert_eq!(trie.get(b"fooaaaa"), Some(&1));
//! assert_eq!(trie.find_prefix(b"fooaaaabcd"), Some((&b"fooaaaa"[..], &1)));
//! assert_eq!(trie.find_prefix(b"foocd"), None);
//! ```

#![deny(unsafe_code)]

use std::fmt;
use std::ops::ControlFlow;

mod debug;
mod error;
mod iter;
mod node;
mod window;

pub use debug::{Dump, Shape};
pub use error::InvariantError;
pub use iter::Iter;
pub use node::Node;

/// An ordered byte-string map.
///
/// The trie is its root [`Node`]; this type adds a count of live values.
/// Removing a key clears its value but keeps the nodes that led to it.
pub struct Trie<V> {
    root: Node<V>,
    len: usize,
}

impl<V> Trie<V> {
    pub fn new() -> Self {
        Self {
            root: Node::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> &Node<V> {
        &self.root
    }

    /// Stores `value` under `key`, or removes the key when `value` is `None`.
    /// Returns the previous value.
    pub fn put(&mut self, key: impl AsRef<[u8]>, value: Option<V>) -> Option<V> {
        let storing = value.is_some();
        let old = self.root.put(key.as_ref(), value);
        match (old.is_some(), storing) {
            (false, true) => self.len += 1,
            (true, false) => self.len -= 1,
            _ => {}
        }
        old
    }

    pub fn insert(&mut self, key: impl AsRef<[u8]>, value: V) -> Option<V> {
        self.put(key, Some(value))
    }

    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Option<V> {
        self.put(key, None)
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&V> {
        self.root.get(key.as_ref())
    }

    pub fn get_mut(&mut self, key: impl AsRef<[u8]>) -> Option<&mut V> {
        self.root.get_mut(key.as_ref())
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.get(key).is_some()
    }

    /// The longest stored key that is a prefix of `key` (possibly `key` itself).
    pub fn find_prefix<'k, K>(&self, key: &'k K) -> Option<(&'k [u8], &V)>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.root.find_prefix(key.as_ref())
    }

    /// Every stored key that is a prefix of `key`, longest first.
    pub fn find_all_prefixes<'k, K>(&self, key: &'k K) -> Vec<(&'k [u8], &V)>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.root.find_all_prefixes(key.as_ref())
    }

    /// Calls `f` on every entry in increasing key order. Returning
    /// `ControlFlow::Break` stops the traversal.
    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&[u8], &V) -> ControlFlow<()>,
    {
        self.root.for_each(f)
    }

    pub fn for_each_with_prefix<F>(&self, prefix: impl AsRef<[u8]>, f: F)
    where
        F: FnMut(&[u8], &V) -> ControlFlow<()>,
    {
        self.root.for_each_with_prefix(prefix.as_ref(), f)
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter::seeded(&self.root, Vec::new())
    }

    /// Entries whose keys start with `prefix`, in increasing key order.
    pub fn iter_prefix(&self, prefix: impl AsRef<[u8]>) -> Iter<'_, V> {
        let prefix = prefix.as_ref();
        match self.root.locate(prefix) {
            Some((node, consumed)) => {
                Iter::seeded(node, prefix[..prefix.len() - consumed].to_vec())
            }
            None => Iter::empty(),
        }
    }

    pub fn shape(&self) -> Shape {
        self.root.shape()
    }

    /// Approximate bytes used by the trie, including the `Trie` itself.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.root.heap_bytes()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let counted = self.root.check(&mut Vec::new())?;
        if counted != self.len {
            return Err(InvariantError::LenMismatch {
                counted,
                recorded: self.len,
            });
        }
        Ok(())
    }
}

impl<V: fmt::Debug> Trie<V> {
    pub fn dump(&self) -> Dump<'_, V> {
        self.root.dump()
    }
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for Trie<V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Trie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in self.iter() {
            map.entry(&format_args!("{}", key.escape_ascii()), value);
        }
        map.finish()
    }
}

/// Renders one `key:value` line per entry inside `trie{` and `}`.
impl<V: fmt::Display> fmt::Display for Trie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "trie{{")?;
        for (key, value) in self.iter() {
            writeln!(f, "\t{}:{}", key.escape_ascii(), value)?;
        }
        write!(f, "}}")
    }
}

impl<'a, V> IntoIterator for &'a Trie<V> {
    type Item = (Vec<u8>, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: AsRef<[u8]>, V> Extend<(K, V)> for Trie<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: AsRef<[u8]>, V> FromIterator<(K, V)> for Trie<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut trie = Trie::new();
        trie.extend(iter);
        trie
    }
}


#[cfg(test)]
mod proptests;
