use std::iter::FusedIterator;

use crate::node::Node;

struct Pending<'a, V> {
    node: &'a Node<V>,
    /// Key length before this node's selector byte.
    depth: usize,
    selector: Option<u8>,
}

/// Sorted iterator over the entries of a [`crate::Trie`] or one of its subtrees.
pub struct Iter<'a, V> {
    stack: Vec<Pending<'a, V>>,
    key: Vec<u8>,
}

impl<'a, V> Iter<'a, V> {
    /// Iterates `node` and everything below it. `key` is the path leading into
    /// the node, excluding its own segment.
    pub(crate) fn seeded(node: &'a Node<V>, key: Vec<u8>) -> Self {
        let depth = key.len();
        Self {
            stack: vec![Pending {
                node,
                depth,
                selector: None,
            }],
            key,
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            stack: Vec::new(),
            key: Vec::new(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Vec<u8>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(Pending {
            node,
            depth,
            selector,
        }) = self.stack.pop()
        {
            self.key.truncate(depth);
            self.key.extend(selector);
            self.key.extend_from_slice(node.suffix());

            let depth = self.key.len();
            for (byte, child) in node.children().rev() {
                if !child.is_empty() {
                    self.stack.push(Pending {
                        node: child,
                        depth,
                        selector: Some(byte),
                    });
                }
            }

            if let Some(value) = node.value() {
                return Some((self.key.clone(), value));
            }
        }
        None
    }
}

impl<V> FusedIterator for Iter<'_, V> {}
