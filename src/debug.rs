//! Debug utilities: structural dump, shape statistics and invariant checks.

use std::fmt;

use crate::error::InvariantError;
use crate::node::Node;
use crate::window;

/// Counts gathered over a node and everything below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shape {
    /// Live values.
    pub values: usize,
    /// Node slots, including empty ones left in child windows.
    pub nodes: usize,
}

impl<V> Node<V> {
    pub fn shape(&self) -> Shape {
        let mut shape = Shape {
            values: usize::from(self.value().is_some()),
            nodes: 1,
        };
        for (_, child) in self.children() {
            let s = child.shape();
            shape.values += s.values;
            shape.nodes += s.nodes;
        }
        shape
    }

    /// Checks the child window invariants below this node and returns the
    /// number of live values found. `path` is the key leading into this node.
    pub(crate) fn check(&self, path: &mut Vec<u8>) -> Result<usize, InvariantError> {
        let mark = path.len();
        path.extend_from_slice(self.suffix());
        let mut values = usize::from(self.value().is_some());

        let len = self.child_slots();
        if len > 0 {
            if !len.is_power_of_two() || len > 256 {
                return Err(InvariantError::ChildArrayLen {
                    key: path.clone(),
                    len,
                });
            }
            if !window::is_aligned(self.base(), len) {
                return Err(InvariantError::MisalignedBase {
                    key: path.clone(),
                    base: self.base(),
                    len,
                });
            }

            let at = path.len();
            for (byte, child) in self.children() {
                path.truncate(at);
                path.push(byte);
                values += child.check(path)?;
            }
        }

        path.truncate(mark);
        Ok(values)
    }

    /// Indented view of the node structure, one line per non-empty node.
    pub fn dump(&self) -> Dump<'_, V> {
        Dump(self)
    }
}

pub struct Dump<'a, V>(&'a Node<V>);

impl<V: fmt::Debug> Dump<'_, V> {
    fn write(node: &Node<V>, level: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": ", node.suffix().escape_ascii())?;
        match node.value() {
            Some(v) => writeln!(f, "{v:?}")?,
            None => writeln!(f, "-")?,
        }

        let indent = "    ".repeat(level);
        if node.child_slots() > 0 {
            writeln!(f, "{indent}<{}>", node.child_slots())?;
        }
        for (byte, child) in node.children() {
            if child.is_empty() {
                continue;
            }
            if byte.is_ascii_graphic() {
                write!(f, "{indent}['{}']", byte as char)?;
            } else {
                write!(f, "{indent}[{byte}]")?;
            }
            Self::write(child, level + 1, f)?;
        }
        Ok(())
    }
}

impl<V: fmt::Debug> fmt::Display for Dump<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write(self.0, 1, f)
    }
}
