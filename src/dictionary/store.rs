// Expansion store - maps short codes to expansion text through a character trie
// All memory comes from two fixed arenas sized at build time. Nothing is freed
// individually: unregister only unmarks a node, and a longer replacement text
// orphans the old bytes until clear_all resets both arenas.

use super::arena::{ArenaKind, NodeArena, NodeId, TextArena};
use crate::limits::{MAX_EXPANDED_LEN, MAX_SHORT_LEN, NODE_ARENA_CAPACITY, TEXT_ARENA_CAPACITY};
use serde::Serialize;

/// Error types for expansion store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Bad length or characters in a short code or expansion
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// One of the arenas has no room left
    #[error("Out of memory: {0} exhausted")]
    OutOfMemory(ArenaKind),
    /// No expansion is registered for the short code
    #[error("No expansion registered for '{0}'")]
    NotFound(String),
}

/// What a successful register did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    Updated,
}

/// Snapshot of arena usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub entries: usize,
    pub nodes_used: usize,
    pub node_capacity: usize,
    pub text_bytes_used: usize,
    pub text_capacity: usize,
    /// Bytes left unreachable by replacements that did not fit their slot
    pub orphaned_bytes: usize,
}

/// Map a short-code character to its edge index: `a`-`z` then `0`-`9`
pub fn trie_index(c: char) -> Option<usize> {
    match c {
        'a'..='z' => Some(c as usize - 'a' as usize),
        '0'..='9' => Some(26 + (c as usize - '0' as usize)),
        _ => None,
    }
}

fn validate_code(code: &str) -> Result<(), StoreError> {
    if code.is_empty() || code.len() >= MAX_SHORT_LEN {
        return Err(StoreError::InvalidArgument(format!(
            "short code length {} outside 1..={}",
            code.len(),
            MAX_SHORT_LEN - 1
        )));
    }
    if let Some(c) = code.chars().find(|c| trie_index(*c).is_none()) {
        return Err(StoreError::InvalidArgument(format!(
            "short code '{}' contains invalid character {:?}, must be lowercase letters or digits",
            code, c
        )));
    }
    Ok(())
}

fn validate_text(text: &str) -> Result<(), StoreError> {
    if text.is_empty() || text.len() >= MAX_EXPANDED_LEN {
        return Err(StoreError::InvalidArgument(format!(
            "expansion length {} outside 1..={}",
            text.len(),
            MAX_EXPANDED_LEN - 1
        )));
    }
    Ok(())
}

/// Trie of short codes over fixed node and text arenas
///
/// Not synchronized on its own; `TextExpander` holds it behind its lock.
#[derive(Debug)]
pub struct ExpansionStore {
    nodes: NodeArena,
    texts: TextArena,
    root: NodeId,
    /// Number of terminal nodes, maintained on every mutation
    count: usize,
    orphaned_bytes: usize,
}

impl ExpansionStore {
    /// Create a store sized by the build-time limits
    pub fn new() -> Self {
        Self::with_capacity(NODE_ARENA_CAPACITY, TEXT_ARENA_CAPACITY)
    }

    /// Create a store with explicit arena capacities
    pub fn with_capacity(node_capacity: usize, text_capacity: usize) -> Self {
        let mut nodes = NodeArena::with_capacity(node_capacity);
        let root = nodes.reset_with_root();
        Self {
            nodes,
            texts: TextArena::with_capacity(text_capacity),
            root,
            count: 0,
            orphaned_bytes: 0,
        }
    }

    /// Follow `code` from the root. Fails closed on any invalid character
    /// or missing edge.
    fn walk(&self, code: &str) -> Option<NodeId> {
        code.chars().try_fold(self.root, |node, c| {
            self.nodes.get(node).children[trie_index(c)?]
        })
    }

    /// Add or replace the expansion for `code`.
    ///
    /// Validation and capacity checks run before anything is touched, so an
    /// error never leaves the trie or the arenas modified.
    #[must_use = "this returns a Result that should be handled"]
    pub fn register(&mut self, code: &str, text: &str) -> Result<Registration, StoreError> {
        validate_code(code)?;
        validate_text(text)?;

        let indices: Vec<usize> = code.chars().filter_map(trie_index).collect();

        // Longest existing prefix of the path
        let mut node = self.root;
        let mut depth = 0;
        for &idx in &indices {
            match self.nodes.get(node).children[idx] {
                Some(child) => {
                    node = child;
                    depth += 1;
                }
                None => break,
            }
        }

        let missing = indices.len() - depth;
        if missing > self.nodes.remaining() {
            crate::error!(
                "Trie node pool exhausted ({} of {} used), cannot add '{}'",
                self.nodes.used(),
                self.nodes.capacity(),
                code
            );
            return Err(StoreError::OutOfMemory(ArenaKind::Node));
        }

        let reusable = missing == 0
            && self
                .nodes
                .get(node)
                .text
                .filter(|_| self.nodes.get(node).terminal)
                .is_some_and(|slot| text.len() <= slot.capacity());
        if !reusable && text.len() > self.texts.remaining() {
            crate::error!(
                "Text pool exhausted ({} of {} bytes used), cannot store expansion for '{}'",
                self.texts.used(),
                self.texts.capacity(),
                code
            );
            return Err(StoreError::OutOfMemory(ArenaKind::Text));
        }

        for &idx in &indices[depth..] {
            let child = self
                .nodes
                .alloc()
                .ok_or(StoreError::OutOfMemory(ArenaKind::Node))?;
            self.nodes.get_mut(node).children[idx] = Some(child);
            node = child;
        }

        let entry = self.nodes.get_mut(node);
        if let (true, Some(mut slot)) = (entry.terminal, entry.text) {
            if self.texts.overwrite(&mut slot, text) {
                entry.text = Some(slot);
                crate::debug!("Updated existing expansion for '{}' in place", code);
                return Ok(Registration::Updated);
            }
            crate::warn!(
                "New expansion for '{}' is longer, {} bytes of old text storage will be orphaned",
                code,
                slot.capacity()
            );
            self.orphaned_bytes += slot.capacity();
        }

        let slot = self
            .texts
            .alloc(text)
            .ok_or(StoreError::OutOfMemory(ArenaKind::Text))?;
        entry.text = Some(slot);

        if entry.terminal {
            Ok(Registration::Updated)
        } else {
            entry.terminal = true;
            self.count += 1;
            Ok(Registration::Added)
        }
    }

    /// Remove the expansion for `code`.
    ///
    /// The node and its text bytes stay allocated; only the terminal mark
    /// and the text reference are cleared. Unreachable branches are not pruned.
    #[must_use = "this returns a Result that should be handled"]
    pub fn unregister(&mut self, code: &str) -> Result<(), StoreError> {
        validate_code(code)?;

        let node = self
            .walk(code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;
        let entry = self.nodes.get_mut(node);
        if !entry.terminal {
            return Err(StoreError::NotFound(code.to_string()));
        }

        entry.terminal = false;
        entry.text = None;
        self.count -= 1;
        Ok(())
    }

    /// Expansion text registered for exactly `code`
    pub fn lookup(&self, code: &str) -> Option<&str> {
        let node = self.nodes.get(self.walk(code)?);
        if !node.terminal {
            return None;
        }
        self.texts.get(node.text.as_ref()?)
    }

    /// Node reached by `code`, terminal or not.
    ///
    /// `Some` means at least one registered (or formerly registered) code
    /// starts with `code`.
    pub fn prefix_node(&self, code: &str) -> Option<NodeId> {
        self.walk(code)
    }

    pub fn exists(&self, code: &str) -> bool {
        self.lookup(code).is_some()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Drop every entry in O(1) by rewinding both arenas
    pub fn clear_all(&mut self) {
        self.texts.reset();
        self.root = self.nodes.reset_with_root();
        self.count = 0;
        self.orphaned_bytes = 0;
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.count,
            nodes_used: self.nodes.used(),
            node_capacity: self.nodes.capacity(),
            text_bytes_used: self.texts.used(),
            text_capacity: self.texts.capacity(),
            orphaned_bytes: self.orphaned_bytes,
        }
    }
}

impl Default for ExpansionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
