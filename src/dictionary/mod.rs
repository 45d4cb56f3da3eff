// Dictionary module - bounded storage of short code to expansion mappings

pub mod arena;
mod store;

pub use arena::{ArenaKind, NodeId};
pub use store::{trie_index, ExpansionStore, Registration, StoreError, StoreStats};
