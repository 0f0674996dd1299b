//! Ordered full scan over a tree's leaf chain.
//!
//! Grounded in `btree_mgr.c`'s `openTreeScan`/`nextEntry`/`closeTreeScan`:
//! walk the leftmost path to the smallest-key leaf, then emit payloads in
//! order, following the sibling link (I5) when a leaf is exhausted.

use crate::error::{Result, StorageError};
use crate::storage::BlockDevice;
use crate::types::Rid;

use super::tree::BTree;

/// Cursor state for [`BTree::open_scan`].
///
/// Holds only arena indices into the tree that produced it; `next_entry`
/// always takes that same tree by reference, mirroring the source's
/// `closeTreeScan`-free, handle-based cursor rather than an owning
/// iterator (the tree outlives the scan in every call site here).
pub struct TreeScan {
    leaf: usize,
    key_index: usize,
    total_keys: usize,
}

impl TreeScan {
    pub(crate) fn new(leaf: usize, total_keys: usize) -> Self {
        Self {
            leaf,
            key_index: 0,
            total_keys,
        }
    }

    /// Emit the next `(key order)` payload, or `NoMoreEntries` once the
    /// leaf chain is exhausted.
    pub fn next_entry<D: BlockDevice>(&mut self, tree: &BTree<D>) -> Result<Rid> {
        if self.key_index >= self.total_keys {
            let next_leaf = tree.leaf_next(self.leaf).ok_or(StorageError::NoMoreEntries)?;
            self.leaf = next_leaf;
            self.key_index = 0;
            self.total_keys = tree.leaf_num_keys(next_leaf);
            if self.total_keys == 0 {
                return Err(StorageError::NoMoreEntries);
            }
        }
        let rid = tree.leaf_payload(self.leaf, self.key_index);
        self.key_index += 1;
        Ok(rid)
    }
}
