//! Fixed-capacity bump arenas backing the expansion trie.
//!
//! Both arenas hand out slots sequentially and never free them one at a
//! time. The only way to reclaim space is a full `reset()`, which makes
//! every previously issued handle meaningless.

use crate::limits::ALPHABET_SIZE;
use std::fmt;

/// Which arena ran out of space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaKind {
    Node,
    Text,
}

impl fmt::Display for ArenaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaKind::Node => write!(f, "trie node pool"),
            ArenaKind::Text => write!(f, "text pool"),
        }
    }
}

/// Index of a node in the node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u16);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Location of one stored expansion inside the text arena.
///
/// `capacity` is the size reserved at allocation time; `len` is what the
/// current text occupies. A replacement no longer than `capacity` reuses
/// the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSlot {
    offset: usize,
    capacity: usize,
    len: usize,
}

impl TextSlot {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

/// One trie node: an edge per alphabet symbol, plus the expansion when the
/// node terminates a short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieNode {
    pub children: [Option<NodeId>; ALPHABET_SIZE],
    pub text: Option<TextSlot>,
    pub terminal: bool,
}

impl TrieNode {
    const EMPTY: TrieNode = TrieNode {
        children: [None; ALPHABET_SIZE],
        text: None,
        terminal: false,
    };
}

/// Node pool with monotonic allocation
#[derive(Debug)]
pub struct NodeArena {
    nodes: Box<[TrieNode]>,
    used: usize,
}

impl NodeArena {
    /// Create a pool of `capacity` nodes (at least one, for the root).
    ///
    /// Capacity is also bounded by what a `NodeId` can address.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, u16::MAX as usize + 1);
        Self {
            nodes: vec![TrieNode::EMPTY; capacity].into_boxed_slice(),
            used: 0,
        }
    }

    /// Discard every node and hand out a fresh root.
    ///
    /// Cannot fail: the pool always holds at least one node.
    pub fn reset_with_root(&mut self) -> NodeId {
        self.nodes[0] = TrieNode::EMPTY;
        self.used = 1;
        NodeId(0)
    }

    /// Allocate a cleared node, or `None` if the pool is exhausted
    pub fn alloc(&mut self) -> Option<NodeId> {
        if self.used >= self.nodes.len() {
            return None;
        }
        let id = NodeId(u16::try_from(self.used).ok()?);
        self.nodes[id.index()] = TrieNode::EMPTY;
        self.used += 1;
        Some(id)
    }

    pub fn get(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut TrieNode {
        &mut self.nodes[id.index()]
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.used
    }
}

/// Byte pool for expansion text
#[derive(Debug)]
pub struct TextArena {
    bytes: Box<[u8]>,
    used: usize,
}

impl TextArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
            used: 0,
        }
    }

    /// Copy `text` into a new slot sized exactly to it
    pub fn alloc(&mut self, text: &str) -> Option<TextSlot> {
        let len = text.len();
        if len > self.remaining() {
            return None;
        }
        let offset = self.used;
        self.bytes[offset..offset + len].copy_from_slice(text.as_bytes());
        self.used += len;
        Some(TextSlot {
            offset,
            capacity: len,
            len,
        })
    }

    /// Overwrite `slot` with `text` if it fits the reserved capacity.
    ///
    /// Returns false (and leaves the slot untouched) when it does not fit.
    pub fn overwrite(&mut self, slot: &mut TextSlot, text: &str) -> bool {
        if text.len() > slot.capacity {
            return false;
        }
        self.bytes[slot.offset..slot.offset + text.len()].copy_from_slice(text.as_bytes());
        slot.len = text.len();
        true
    }

    pub fn get(&self, slot: &TextSlot) -> Option<&str> {
        std::str::from_utf8(&self.bytes[slot.offset..slot.offset + slot.len]).ok()
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.used
    }
}

#[cfg(test)]
#[path = "arena_test.rs"]
mod tests;
