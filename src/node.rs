//! The recursive trie node.
//!
//! Every node owns an edge segment (`suffix`), an optional value, and a window
//! of children addressed by the byte that follows the segment. The byte used to
//! select a child is consumed by the parent and never repeated in the child's
//! segment, so a node's key is the concatenation of every selector byte and
//! segment on the path from the root.

use std::fmt;
use std::ops::ControlFlow;

use smallvec::SmallVec;
use tracing::trace;

use crate::window;

/// Segments up to this many bytes are stored inline in the node.
pub(crate) const INLINE_SUFFIX: usize = 16;

pub(crate) type Suffix = SmallVec<[u8; INLINE_SUFFIX]>;

/// Length of the longest common prefix of `a` and `b`.
#[inline]
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[derive(Clone)]
pub struct Node<V> {
    suffix: Suffix,
    value: Option<V>,
    /// Child for byte `c` is at `children[c - base]`. Empty for a leaf.
    children: Vec<Node<V>>,
    base: u8,
}

impl<V> Default for Node<V> {
    fn default() -> Self {
        Self {
            suffix: Suffix::new(),
            value: None,
            children: Vec::new(),
            base: 0,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("suffix", &format_args!("{}", self.suffix.escape_ascii()))
            .field("value", &self.value)
            .field("base", &self.base)
            .field("children", &self.children)
            .finish()
    }
}

impl<V> Node<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The edge segment consumed within this node.
    pub fn suffix(&self) -> &[u8] {
        &self.suffix
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// A node with neither a value nor children holds nothing, and the next
    /// insertion that reaches it overwrites its segment.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }

    /// Children paired with their selector bytes, in increasing byte order.
    pub fn children(
        &self,
    ) -> impl DoubleEndedIterator<Item = (u8, &Node<V>)> + ExactSizeIterator + '_ {
        let base = self.base;
        // base + len <= 256, so the selector never overflows.
        self.children
            .iter()
            .enumerate()
            .map(move |(i, child)| (base + i as u8, child))
    }

    #[inline]
    fn child(&self, byte: u8) -> Option<&Node<V>> {
        window::slot(self.base, self.children.len(), byte).map(|i| &self.children[i])
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Stores `value` under `key`, or clears it when `value` is `None`.
    /// Returns the value previously stored under `key`.
    pub fn put(&mut self, key: &[u8], value: Option<V>) -> Option<V> {
        match value {
            Some(value) => self.insert(key, value),
            None => self.remove(key),
        }
    }

    /// Clears the value under `key` without reclaiming any nodes.
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        self.value_slot_mut(key)?.take()
    }

    pub fn insert(&mut self, key: &[u8], value: V) -> Option<V> {
        if self.is_empty() {
            self.suffix = Suffix::from_slice(key);
            self.value = Some(value);
            return None;
        }

        let s = common_prefix_len(&self.suffix, key);
        if s < self.suffix.len() {
            self.split(s, key.get(s).copied());
        }

        let Some(&byte) = key.get(s) else {
            return self.value.replace(value);
        };
        let idx = self.reserve_child(byte);
        self.children[idx].insert(&key[s + 1..], value)
    }

    /// Cuts the segment at `at`, pushing the node's current contents down into a
    /// child selected by `suffix[at]`. When the key being inserted continues with
    /// `next`, the new child array is already sized to hold its slot as well.
    fn split(&mut self, at: usize, next: Option<u8>) {
        let Node {
            suffix,
            value,
            children,
            base,
        } = std::mem::take(self);

        let divergent = suffix[at];
        let (new_base, len) = match next {
            Some(byte) => window::grow(divergent, 1, byte),
            None => (divergent, 1),
        };
        trace!(split_at = at, divergent, len, "splitting edge");

        let mut slots = empty_slots(len);
        slots[(divergent - new_base) as usize] = Node {
            suffix: Suffix::from_slice(&suffix[at + 1..]),
            value,
            children,
            base,
        };

        *self = Node {
            suffix: Suffix::from_slice(&suffix[..at]),
            value: None,
            children: slots,
            base: new_base,
        };
    }

    /// Index of the child slot for `byte`, allocating or widening the window
    /// as needed. Existing children keep their selector bytes.
    fn reserve_child(&mut self, byte: u8) -> usize {
        if self.children.is_empty() {
            self.children = empty_slots(1);
            self.base = byte;
            return 0;
        }

        let len = self.children.len();
        if let Some(idx) = window::slot(self.base, len, byte) {
            return idx;
        }

        let (base, new_len) = window::grow(self.base, len, byte);
        trace!(
            old_base = self.base,
            old_len = len,
            base,
            len = new_len,
            "widening child window"
        );
        let offset = (self.base - base) as usize;
        let old = std::mem::take(&mut self.children);
        let mut grown = Vec::with_capacity(new_len);
        grown.resize_with(offset, Node::default);
        grown.extend(old);
        grown.resize_with(new_len, Node::default);

        self.children = grown;
        self.base = base;
        (byte - base) as usize
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn get(&self, key: &[u8]) -> Option<&V> {
        let rest = key.strip_prefix(self.suffix.as_slice())?;
        match rest.split_first() {
            None => self.value.as_ref(),
            Some((&byte, rest)) => self.child(byte)?.get(rest),
        }
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        self.value_slot_mut(key)?.as_mut()
    }

    fn value_slot_mut(&mut self, key: &[u8]) -> Option<&mut Option<V>> {
        let rest = key.strip_prefix(self.suffix.as_slice())?;
        match rest.split_first() {
            None => Some(&mut self.value),
            Some((&byte, rest)) => {
                let idx = window::slot(self.base, self.children.len(), byte)?;
                self.children[idx].value_slot_mut(rest)
            }
        }
    }

    /// The longest stored key that is a prefix of `key`, returned as a slice of
    /// `key` together with its value.
    pub fn find_prefix<'k>(&self, key: &'k [u8]) -> Option<(&'k [u8], &V)> {
        self.longest_prefix(key, 0).map(|(end, v)| (&key[..end], v))
    }

    /// `ofs` is where this node's segment starts within `key`.
    fn longest_prefix(&self, key: &[u8], ofs: usize) -> Option<(usize, &V)> {
        let rest = key[ofs..].strip_prefix(self.suffix.as_slice())?;
        let end = ofs + self.suffix.len();
        let own = self.value.as_ref().map(|v| (end, v));

        // Deeper matches are longer, so they win over this node's own value.
        rest.first()
            .and_then(|&byte| self.child(byte))
            .and_then(|child| child.longest_prefix(key, end + 1))
            .or(own)
    }

    /// Every stored key that is a prefix of `key`, longest first.
    pub fn find_all_prefixes<'k>(&self, key: &'k [u8]) -> Vec<(&'k [u8], &V)> {
        let mut found = Vec::new();
        self.collect_prefixes(key, 0, &mut found);
        found
            .into_iter()
            .map(|(end, v)| (&key[..end], v))
            .collect()
    }

    fn collect_prefixes<'a>(&'a self, key: &[u8], ofs: usize, out: &mut Vec<(usize, &'a V)>) {
        let Some(rest) = key[ofs..].strip_prefix(self.suffix.as_slice()) else {
            return;
        };
        let end = ofs + self.suffix.len();
        if let Some(child) = rest.first().and_then(|&byte| self.child(byte)) {
            child.collect_prefixes(key, end + 1, out);
        }
        if let Some(v) = &self.value {
            out.push((end, v));
        }
    }

    /// Finds the node holding every key that starts with `prefix`.
    ///
    /// `prefix` may end partway through the returned node's segment. The second
    /// element is how many bytes of that segment `prefix` already covers, so the
    /// path leading into the node is `prefix[..prefix.len() - consumed]`.
    pub fn locate(&self, prefix: &[u8]) -> Option<(&Node<V>, usize)> {
        if self.is_empty() {
            return None;
        }
        let s = common_prefix_len(&self.suffix, prefix);
        if s == prefix.len() {
            return Some((self, s));
        }
        if s < self.suffix.len() {
            return None;
        }
        self.child(prefix[s])?.locate(&prefix[s + 1..])
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Calls `f` on every key and value below this node in increasing key order
    /// until it returns `ControlFlow::Break`.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&[u8], &V) -> ControlFlow<()>,
    {
        let mut buf = Vec::new();
        let _ = self.walk(&mut buf, &mut f);
    }

    /// Like [`Node::for_each`], restricted to keys starting with `prefix`.
    pub fn for_each_with_prefix<F>(&self, prefix: &[u8], mut f: F)
    where
        F: FnMut(&[u8], &V) -> ControlFlow<()>,
    {
        let Some((node, consumed)) = self.locate(prefix) else {
            return;
        };
        let mut buf = Vec::with_capacity(prefix.len());
        buf.extend_from_slice(&prefix[..prefix.len() - consumed]);
        let _ = node.walk(&mut buf, &mut f);
    }

    /// Pre-order walk. `buf` holds the path up to (not including) this node's
    /// segment and is restored before returning `Continue`.
    pub(crate) fn walk<F>(&self, buf: &mut Vec<u8>, f: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&[u8], &V) -> ControlFlow<()>,
    {
        if self.is_empty() {
            return ControlFlow::Continue(());
        }

        let mark = buf.len();
        buf.extend_from_slice(&self.suffix);

        // A node's own key sorts before every key below it.
        if let Some(v) = &self.value {
            f(buf.as_slice(), v)?;
        }

        if !self.children.is_empty() {
            let at = buf.len();
            buf.push(self.base);
            for (byte, child) in self.children() {
                buf[at] = byte;
                child.walk(buf, f)?;
            }
        }

        buf.truncate(mark);
        ControlFlow::Continue(())
    }

    // =========================================================================
    // Accounting
    // =========================================================================

    pub(crate) fn base(&self) -> u8 {
        self.base
    }

    pub(crate) fn child_slots(&self) -> usize {
        self.children.len()
    }

    /// Heap bytes owned below this node, excluding the node itself.
    pub(crate) fn heap_bytes(&self) -> usize {
        let suffix = if self.suffix.spilled() {
            self.suffix.capacity()
        } else {
            0
        };
        let slots = self.children.capacity() * std::mem::size_of::<Node<V>>();
        suffix + slots + self.children.iter().map(Node::heap_bytes).sum::<usize>()
    }
}

fn empty_slots<V>(len: usize) -> Vec<Node<V>> {
    let mut slots = Vec::with_capacity(len);
    slots.resize_with(len, Node::default);
    slots
}
