//! The B+ tree index: ordered map from typed key to record identifier.
//!
//! Grounded in `btree_mgr.c` end to end (`createBtree`/`openBtree`/
//! `insertKey`/`findKey`/`deleteKey`/the split and merge/redistribute
//! family). Per O-1 the tree never reads its structure back from the
//! backing device — only `create` touches it (one zero page) and `open`
//! attaches an otherwise-unused buffer pool for interface parity, matching
//! the source's `openBtree`. All tree state lives in the in-process arena.

use crate::btree::node::{Body, Node};
use crate::btree::scan::TreeScan;
use crate::buffer::{BufferPool, FifoStrategy};
use crate::error::{Result, StorageError};
use crate::storage::BlockDevice;
use crate::types::{DataType, Rid, Value, PAGE_SIZE};
use std::path::Path;

fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// An in-memory B+ tree index over one backing block device.
///
/// `n` is the caller's order hint; the true internal branching factor is
/// `order = n + 2` (O-3). `open` requires the same `key_type`/`n` the tree
/// was created with, since no schema header persists across process
/// restarts (O-1) — there is no global tree-manager singleton to recover
/// it from, so the caller supplies it again.
pub struct BTree<D> {
    #[allow(dead_code)]
    pool: BufferPool<D>,
    key_type: DataType,
    order: usize,
    root: Option<usize>,
    arena: Vec<Option<Node>>,
    free_list: Vec<usize>,
    num_nodes: usize,
    num_entries: usize,
}

impl<D: BlockDevice> BTree<D> {
    /// Conservative on-page byte footprint of one key of `key_type`, used
    /// only by the `OrderTooHigh` check below — the tree itself never
    /// serializes a node to a page (O-1). Fixed-width scalar types use
    /// their natural width; `String` keys have no length bound in `Value`
    /// itself, so a generous but finite width is assumed, the same way the
    /// record store requires callers to bound a string attribute's width
    /// up front.
    fn key_byte_width(key_type: DataType) -> usize {
        match key_type {
            DataType::Int => 4,
            DataType::Float => 4,
            DataType::Bool => 1,
            DataType::String => 256,
        }
    }

    /// Allocate the backing device (one empty page) and initialize an
    /// empty tree of the given key type. Rejects orders whose node
    /// structure would not fit in a page.
    pub fn create(name: &Path, key_type: DataType, n: usize) -> Result<()> {
        let order = n + 2;
        let key_width = Self::key_byte_width(key_type);
        let rid_width = std::mem::size_of::<Rid>();
        let node_bytes = order * key_width + order * rid_width;
        if node_bytes > PAGE_SIZE {
            return Err(StorageError::OrderTooHigh);
        }
        D::create(name)
    }

    /// Attach a 1000-frame FIFO buffer pool to the device and return a
    /// fresh, empty in-memory tree (see O-1).
    pub fn open(name: &Path, key_type: DataType, n: usize) -> Result<Self> {
        let device = D::open(name)?;
        let pool = BufferPool::new(device, 1000, Box::new(FifoStrategy::new()));
        Ok(Self {
            pool,
            key_type,
            order: n + 2,
            root: None,
            arena: Vec::new(),
            free_list: Vec::new(),
            num_nodes: 0,
            num_entries: 0,
        })
    }

    /// Flush the pool and release in-memory state.
    pub fn close(self) -> Result<()> {
        self.pool.shutdown()
    }

    /// Destroy the backing device.
    pub fn delete(name: &Path) -> Result<()> {
        D::destroy(name)
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_entries(&self) -> usize {
        self.num_entries
    }

    pub fn key_type(&self) -> DataType {
        self.key_type
    }

    fn min_keys_leaf(&self) -> usize {
        ceil_div(self.order - 1, 2)
    }

    fn min_keys_internal(&self) -> usize {
        ceil_div(self.order, 2) - 1
    }

    fn node(&self, idx: usize) -> &Node {
        self.arena[idx].as_ref().expect("dangling arena index")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node {
        self.arena[idx].as_mut().expect("dangling arena index")
    }

    fn alloc(&mut self, node: Node) -> usize {
        self.num_nodes += 1;
        if let Some(idx) = self.free_list.pop() {
            self.arena[idx] = Some(node);
            idx
        } else {
            self.arena.push(Some(node));
            self.arena.len() - 1
        }
    }

    fn free(&mut self, idx: usize) {
        self.arena[idx] = None;
        self.free_list.push(idx);
        self.num_nodes -= 1;
    }

    /// Descend from the root to the leaf that would hold `key`.
    fn find_leaf(&self, key: &Value) -> Option<usize> {
        let mut idx = self.root?;
        while !self.node(idx).is_leaf() {
            let node = self.node(idx);
            let child_pos = node
                .keys
                .iter()
                .position(|k| key.is_less(k))
                .unwrap_or(node.keys.len());
            idx = node.children()[child_pos];
        }
        Some(idx)
    }

    /// Point lookup.
    pub fn find(&self, key: &Value) -> Result<Rid> {
        let leaf = self.find_leaf(key).ok_or(StorageError::KeyNotFound)?;
        let node = self.node(leaf);
        node.keys
            .iter()
            .position(|k| k.is_equal(key))
            .map(|i| node.payloads()[i])
            .ok_or(StorageError::KeyNotFound)
    }

    /// Insert `key` with payload `rid`. Fails if `key` is already present.
    pub fn insert(&mut self, key: Value, rid: Rid) -> Result<()> {
        if self.find(&key).is_ok() {
            return Err(StorageError::KeyAlreadyExists);
        }

        if self.root.is_none() {
            let mut leaf = Node::new_leaf();
            leaf.keys.push(key);
            leaf.payloads_mut().push(rid);
            let idx = self.alloc(leaf);
            self.root = Some(idx);
            self.num_entries += 1;
            return Ok(());
        }

        let leaf_idx = self.find_leaf(&key).unwrap();
        if self.node(leaf_idx).num_keys() < self.order - 1 {
            self.insert_into_leaf(leaf_idx, key, rid);
        } else {
            self.insert_into_leaf_after_splitting(leaf_idx, key, rid);
        }
        self.num_entries += 1;
        Ok(())
    }

    fn sorted_insert_pos(keys: &[Value], key: &Value) -> usize {
        keys.iter().position(|k| !k.is_less(key)).unwrap_or(keys.len())
    }

    fn insert_into_leaf(&mut self, leaf_idx: usize, key: Value, rid: Rid) {
        let node = self.node_mut(leaf_idx);
        let pos = Self::sorted_insert_pos(&node.keys, &key);
        node.keys.insert(pos, key);
        node.payloads_mut().insert(pos, rid);
    }

    fn insert_into_leaf_after_splitting(&mut self, leaf_idx: usize, key: Value, rid: Rid) {
        let order = self.order;
        let (mut temp_keys, mut temp_payloads) = {
            let leaf = self.node(leaf_idx);
            (leaf.keys.clone(), leaf.payloads().to_vec())
        };
        let pos = Self::sorted_insert_pos(&temp_keys, &key);
        temp_keys.insert(pos, key);
        temp_payloads.insert(pos, rid);

        let split = ceil_div(order - 1, 2);
        let right_keys = temp_keys.split_off(split);
        let right_payloads = temp_payloads.split_off(split);

        let parent = self.node(leaf_idx).parent;
        let old_next = self.node(leaf_idx).next();

        let mut new_leaf = Node::new_leaf();
        new_leaf.keys = right_keys;
        *new_leaf.payloads_mut() = right_payloads;
        new_leaf.parent = parent;
        new_leaf.set_next(old_next);
        let new_idx = self.alloc(new_leaf);

        let leaf = self.node_mut(leaf_idx);
        leaf.keys = temp_keys;
        *leaf.payloads_mut() = temp_payloads;
        leaf.set_next(Some(new_idx));

        let promoted = self.node(new_idx).keys[0].clone();
        self.insert_into_parent(leaf_idx, promoted, new_idx);
    }

    fn insert_into_parent(&mut self, left_idx: usize, key: Value, right_idx: usize) {
        let parent = self.node(left_idx).parent;
        match parent {
            None => self.insert_into_new_root(left_idx, key, right_idx),
            Some(parent_idx) => {
                let left_index = self
                    .node(parent_idx)
                    .children()
                    .iter()
                    .position(|&c| c == left_idx)
                    .expect("left child must be present in parent");
                if self.node(parent_idx).num_keys() < self.order - 1 {
                    self.insert_into_node(parent_idx, left_index, key, right_idx);
                } else {
                    self.insert_into_node_after_splitting(parent_idx, left_index, key, right_idx);
                }
            }
        }
    }

    fn insert_into_new_root(&mut self, left_idx: usize, key: Value, right_idx: usize) {
        let mut root = Node::new_internal();
        root.keys.push(key);
        root.children_mut().push(left_idx);
        root.children_mut().push(right_idx);
        let root_idx = self.alloc(root);
        self.node_mut(left_idx).parent = Some(root_idx);
        self.node_mut(right_idx).parent = Some(root_idx);
        self.root = Some(root_idx);
    }

    fn insert_into_node(&mut self, parent_idx: usize, left_index: usize, key: Value, right_idx: usize) {
        let parent = self.node_mut(parent_idx);
        parent.keys.insert(left_index, key);
        parent.children_mut().insert(left_index + 1, right_idx);
        self.node_mut(right_idx).parent = Some(parent_idx);
    }

    fn insert_into_node_after_splitting(
        &mut self,
        old_idx: usize,
        left_index: usize,
        key: Value,
        right_idx: usize,
    ) {
        let order = self.order;
        let (mut temp_keys, mut temp_children) = {
            let old = self.node(old_idx);
            (old.keys.clone(), old.children().to_vec())
        };
        temp_keys.insert(left_index, key);
        temp_children.insert(left_index + 1, right_idx);

        let split = ceil_div(order - 1, 2);
        let k_prime = temp_keys[split - 1].clone();
        let new_keys: Vec<Value> = temp_keys[split..].to_vec();
        let new_children: Vec<usize> = temp_children[split..].to_vec();
        temp_keys.truncate(split - 1);
        temp_children.truncate(split);

        let parent = self.node(old_idx).parent;
        let mut new_node = Node::new_internal();
        new_node.keys = new_keys;
        *new_node.children_mut() = new_children;
        new_node.parent = parent;
        let new_idx = self.alloc(new_node);

        for child in self.node(new_idx).children().to_vec() {
            self.node_mut(child).parent = Some(new_idx);
        }

        let old = self.node_mut(old_idx);
        old.keys = temp_keys;
        *old.children_mut() = temp_children;

        self.insert_into_parent(old_idx, k_prime, new_idx);
    }

    /// Remove `key` and its payload. Silently succeeds if absent (O-2).
    pub fn delete_key(&mut self, key: &Value) -> Result<()> {
        let leaf_idx = match self.find_leaf(key) {
            Some(idx) => idx,
            None => return Ok(()),
        };
        if !self.node(leaf_idx).keys.iter().any(|k| k.is_equal(key)) {
            return Ok(());
        }
        self.delete_entry(leaf_idx, key, None);
        Ok(())
    }

    fn remove_entry_from_node(&mut self, n_idx: usize, key: &Value, child_to_remove: Option<usize>) {
        let node = self.node_mut(n_idx);
        let key_idx = node
            .keys
            .iter()
            .position(|k| k.is_equal(key))
            .expect("key must be present");
        node.keys.remove(key_idx);
        match &mut node.body {
            Body::Leaf { payloads, .. } => {
                payloads.remove(key_idx);
            }
            Body::Internal { children } => {
                let child_idx = children
                    .iter()
                    .position(|&c| Some(c) == child_to_remove)
                    .expect("child pointer must be present");
                children.remove(child_idx);
            }
        }
    }

    fn delete_entry(&mut self, n_idx: usize, key: &Value, child_to_remove: Option<usize>) {
        let was_leaf = self.node(n_idx).is_leaf();
        self.remove_entry_from_node(n_idx, key, child_to_remove);
        if was_leaf {
            self.num_entries -= 1;
        }

        if Some(n_idx) == self.root {
            self.adjust_root();
            return;
        }

        let min_keys = if self.node(n_idx).is_leaf() {
            self.min_keys_leaf()
        } else {
            self.min_keys_internal()
        };
        if self.node(n_idx).num_keys() >= min_keys {
            return;
        }

        let parent_idx = self.node(n_idx).parent.expect("non-root node has a parent");
        let self_index = self
            .node(parent_idx)
            .children()
            .iter()
            .position(|&c| c == n_idx)
            .expect("node must be a child of its parent");
        let neighbor_is_left = self_index > 0;
        let neighbor_index = if neighbor_is_left { self_index - 1 } else { 1 };
        let neighbor_idx = self.node(parent_idx).children()[neighbor_index];
        let k_prime_index = if neighbor_is_left { neighbor_index } else { 0 };
        let k_prime = self.node(parent_idx).keys[k_prime_index].clone();

        let capacity = if self.node(n_idx).is_leaf() {
            self.order
        } else {
            self.order - 1
        };
        if self.node(neighbor_idx).num_keys() + self.node(n_idx).num_keys() < capacity {
            self.merge_nodes(n_idx, neighbor_idx, neighbor_is_left, k_prime);
        } else {
            self.redistribute_nodes(n_idx, neighbor_idx, neighbor_is_left, k_prime_index, k_prime, parent_idx);
        }
    }

    fn adjust_root(&mut self) {
        let root_idx = self.root.expect("adjust_root called without a root");
        if self.node(root_idx).num_keys() > 0 {
            return;
        }
        if self.node(root_idx).is_leaf() {
            self.free(root_idx);
            self.root = None;
        } else {
            let new_root = self.node(root_idx).children()[0];
            self.node_mut(new_root).parent = None;
            self.free(root_idx);
            self.root = Some(new_root);
        }
    }

    fn merge_nodes(&mut self, n_idx: usize, neighbor_idx: usize, neighbor_is_left: bool, k_prime: Value) {
        let (surviving_idx, absorbed_idx) = if neighbor_is_left {
            (neighbor_idx, n_idx)
        } else {
            (n_idx, neighbor_idx)
        };

        let is_leaf = self.node(surviving_idx).is_leaf();
        if is_leaf {
            let (absorbed_keys, absorbed_payloads, absorbed_next) = {
                let absorbed = self.node(absorbed_idx);
                (absorbed.keys.clone(), absorbed.payloads().to_vec(), absorbed.next())
            };
            let surviving = self.node_mut(surviving_idx);
            surviving.keys.extend(absorbed_keys);
            surviving.payloads_mut().extend(absorbed_payloads);
            surviving.set_next(absorbed_next);
        } else {
            let (absorbed_keys, absorbed_children) = {
                let absorbed = self.node(absorbed_idx);
                (absorbed.keys.clone(), absorbed.children().to_vec())
            };
            let surviving = self.node_mut(surviving_idx);
            surviving.keys.push(k_prime.clone());
            surviving.keys.extend(absorbed_keys);
            surviving.children_mut().extend(absorbed_children.iter().copied());
            for &child in &absorbed_children {
                self.node_mut(child).parent = Some(surviving_idx);
            }
        }

        let parent_idx = self.node(surviving_idx).parent.expect("merged node has a parent");
        self.delete_entry(parent_idx, &k_prime, Some(absorbed_idx));
        self.free(absorbed_idx);
    }

    fn redistribute_nodes(
        &mut self,
        n_idx: usize,
        neighbor_idx: usize,
        neighbor_is_left: bool,
        k_prime_index: usize,
        k_prime: Value,
        parent_idx: usize,
    ) {
        let is_leaf = self.node(n_idx).is_leaf();
        if neighbor_is_left {
            if is_leaf {
                let (bk, bp) = {
                    let nb = self.node_mut(neighbor_idx);
                    (nb.keys.pop().unwrap(), nb.payloads_mut().pop().unwrap())
                };
                {
                    let n = self.node_mut(n_idx);
                    n.keys.insert(0, bk.clone());
                    n.payloads_mut().insert(0, bp);
                }
                self.node_mut(parent_idx).keys[k_prime_index] = bk;
            } else {
                let (bk, bc) = {
                    let nb = self.node_mut(neighbor_idx);
                    (nb.keys.pop().unwrap(), nb.children_mut().pop().unwrap())
                };
                {
                    let n = self.node_mut(n_idx);
                    n.keys.insert(0, k_prime);
                    n.children_mut().insert(0, bc);
                }
                self.node_mut(bc).parent = Some(n_idx);
                self.node_mut(parent_idx).keys[k_prime_index] = bk;
            }
        } else if is_leaf {
            let (bk, bp) = {
                let nb = self.node_mut(neighbor_idx);
                (nb.keys.remove(0), nb.payloads_mut().remove(0))
            };
            {
                let n = self.node_mut(n_idx);
                n.keys.push(bk);
                n.payloads_mut().push(bp);
            }
            let new_sep = self.node(neighbor_idx).keys[0].clone();
            self.node_mut(parent_idx).keys[k_prime_index] = new_sep;
        } else {
            let (bk, bc) = {
                let nb = self.node_mut(neighbor_idx);
                (nb.keys.remove(0), nb.children_mut().remove(0))
            };
            {
                let n = self.node_mut(n_idx);
                n.keys.push(k_prime);
                n.children_mut().push(bc);
            }
            self.node_mut(bc).parent = Some(n_idx);
            self.node_mut(parent_idx).keys[k_prime_index] = bk;
        }
    }

    /// Open an ordered scan over every live entry, ascending by key.
    pub fn open_scan(&self) -> Result<TreeScan> {
        let root = self.root.ok_or(StorageError::NoRecordsToScan)?;
        let mut idx = root;
        while !self.node(idx).is_leaf() {
            idx = self.node(idx).children()[0];
        }
        Ok(TreeScan::new(idx, self.node(idx).num_keys()))
    }

    pub(crate) fn leaf_payload(&self, idx: usize, key_index: usize) -> Rid {
        self.node(idx).payloads()[key_index]
    }

    pub(crate) fn leaf_next(&self, idx: usize) -> Option<usize> {
        self.node(idx).next()
    }

    pub(crate) fn leaf_num_keys(&self, idx: usize) -> usize {
        self.node(idx).num_keys()
    }

    #[cfg(test)]
    fn root_is_leaf(&self) -> bool {
        self.root.map(|idx| self.node(idx).is_leaf()).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileBlockDevice;
    use crate::types::PageId;
    use tempfile::tempdir;

    fn open_tree(n: usize) -> (tempfile::TempDir, BTree<FileBlockDevice>) {
        crate::test_support::init_log();
        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.bin");
        BTree::<FileBlockDevice>::create(&path, DataType::Int, n).unwrap();
        let tree = BTree::<FileBlockDevice>::open(&path, DataType::Int, n).unwrap();
        (dir, tree)
    }

    #[test]
    fn create_rejects_order_too_high_for_page_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tree.bin");
        assert!(matches!(
            BTree::<FileBlockDevice>::create(&path, DataType::Int, 10_000),
            Err(StorageError::OrderTooHigh)
        ));
    }

    #[test]
    fn empty_tree_find_is_key_not_found() {
        let (_d, tree) = open_tree(4);
        assert!(matches!(tree.find(&Value::Int(7)), Err(StorageError::KeyNotFound)));
    }

    #[test]
    fn insert_then_find() {
        let (_d, mut tree) = open_tree(4);
        tree.insert(Value::Int(10), Rid::new(PageId::new(1), 2)).unwrap();
        assert_eq!(tree.find(&Value::Int(10)).unwrap(), Rid::new(PageId::new(1), 2));
        assert!(matches!(tree.find(&Value::Int(11)), Err(StorageError::KeyNotFound)));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let (_d, mut tree) = open_tree(4);
        let rid = Rid::new(PageId::new(0), 0);
        tree.insert(Value::Int(5), rid).unwrap();
        assert!(matches!(tree.insert(Value::Int(5), rid), Err(StorageError::KeyAlreadyExists)));
        assert_eq!(tree.num_entries(), 1);
    }

    #[test]
    fn split_chain_then_delete_collapse() {
        let (_d, mut tree) = open_tree(3);
        for k in 1..=8 {
            tree.insert(Value::Int(k), Rid::new(PageId::new(0), k as u32)).unwrap();
        }
        assert!(!tree.root_is_leaf());

        let mut scan = tree.open_scan().unwrap();
        let mut seen = Vec::new();
        loop {
            match scan.next_entry(&tree) {
                Ok(rid) => seen.push(rid.slot),
                Err(StorageError::NoMoreEntries) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(seen, (1..=8).collect::<Vec<_>>());

        for k in 1..=7 {
            tree.delete_key(&Value::Int(k)).unwrap();
        }
        assert_eq!(tree.find(&Value::Int(8)).unwrap(), Rid::new(PageId::new(0), 8));
        assert_eq!(tree.num_entries(), 1);
        assert!(tree.root_is_leaf());
    }

    #[test]
    fn delete_missing_key_is_ok() {
        let (_d, mut tree) = open_tree(4);
        assert!(tree.delete_key(&Value::Int(42)).is_ok());
    }

    /// Walks the tree checking I1 (ascending keys), I3 (uniform leaf
    /// depth), and I6 (parent/child consistency). Panics on violation.
    fn check_invariants<D: BlockDevice>(tree: &BTree<D>) {
        let Some(root) = tree.root else { return };

        fn walk<D: BlockDevice>(tree: &BTree<D>, idx: usize, depth: usize, leaf_depth: &mut Option<usize>) {
            let node = tree.node(idx);
            for pair in node.keys.windows(2) {
                assert!(pair[0].is_less(&pair[1]), "I1 violated: keys not ascending");
            }
            if node.is_leaf() {
                match leaf_depth {
                    Some(d) => assert_eq!(*d, depth, "I3 violated: leaves at different depths"),
                    None => *leaf_depth = Some(depth),
                }
            } else {
                assert_eq!(node.children().len(), node.num_keys() + 1);
                for &child in node.children() {
                    assert_eq!(tree.node(child).parent, Some(idx), "I6 violated");
                    walk(tree, child, depth + 1, leaf_depth);
                }
            }
        }

        let mut leaf_depth = None;
        walk(tree, root, 0, &mut leaf_depth);
    }

    #[test]
    fn random_insert_and_find_matches_p1() {
        use rand::seq::SliceRandom;

        let (_d, mut tree) = open_tree(4);
        let mut keys: Vec<i32> = (0..200).collect();
        keys.shuffle(&mut rand::thread_rng());

        for (slot, &k) in keys.iter().enumerate() {
            tree.insert(Value::Int(k), Rid::new(PageId::new(0), slot as u32)).unwrap();
        }
        check_invariants(&tree);

        for &k in &keys {
            assert!(tree.find(&Value::Int(k)).is_ok());
        }
        assert!(matches!(tree.find(&Value::Int(9999)), Err(StorageError::KeyNotFound)));
        assert_eq!(tree.num_entries(), keys.len());
    }

    #[test]
    fn random_insert_delete_preserves_invariants_p2() {
        use rand::seq::SliceRandom;

        let (_d, mut tree) = open_tree(5);
        let mut keys: Vec<i32> = (0..150).collect();
        keys.shuffle(&mut rand::thread_rng());

        for (slot, &k) in keys.iter().enumerate() {
            tree.insert(Value::Int(k), Rid::new(PageId::new(0), slot as u32)).unwrap();
        }

        let mut rng = rand::thread_rng();
        keys.shuffle(&mut rng);
        let (to_delete, to_keep) = keys.split_at(keys.len() / 2);

        for &k in to_delete {
            tree.delete_key(&Value::Int(k)).unwrap();
        }
        check_invariants(&tree);

        for &k in to_delete {
            assert!(matches!(tree.find(&Value::Int(k)), Err(StorageError::KeyNotFound)));
        }
        for &k in to_keep {
            assert!(tree.find(&Value::Int(k)).is_ok());
        }
        assert_eq!(tree.num_entries(), to_keep.len());
    }

    #[test]
    fn scan_visits_live_rids_in_ascending_key_order_p3() {
        use rand::seq::SliceRandom;

        let (_d, mut tree) = open_tree(4);
        let mut keys: Vec<i32> = (0..64).collect();
        keys.shuffle(&mut rand::thread_rng());
        for &k in &keys {
            tree.insert(Value::Int(k), Rid::new(PageId::new(0), k as u32)).unwrap();
        }
        for k in (0..64).step_by(3) {
            tree.delete_key(&Value::Int(k)).unwrap();
        }

        let mut expected: Vec<i32> = (0..64).filter(|k| k % 3 != 0).collect();
        expected.sort_unstable();

        let mut scan = tree.open_scan().unwrap();
        let mut seen = Vec::new();
        loop {
            match scan.next_entry(&tree) {
                Ok(rid) => seen.push(rid.slot as i32),
                Err(StorageError::NoMoreEntries) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(seen, expected);
    }
}
