//! Arena-addressed B+ tree node.
//!
//! Grounded in `btree_mgr.c`'s `Node` struct, re-architected per the design
//! notes: no `parent`/`children` owning pointers, only `usize` indices into
//! the tree's arena. A leaf's RID payloads and its sibling link are kept as
//! plain `Vec`/`Option` fields rather than packed into a fixed-size
//! `order`-length pointer array — the array-with-sentinel-slot layout in
//! the original exists only because C has no growable vector; the
//! semantics (I1-I6) are unchanged.

use crate::types::{Rid, Value};

pub(crate) enum Body {
    Leaf {
        payloads: Vec<Rid>,
        /// Sibling link: the arena index of the next leaf in key order.
        next: Option<usize>,
    },
    Internal {
        /// `children.len() == keys.len() + 1`.
        children: Vec<usize>,
    },
}

pub(crate) struct Node {
    pub keys: Vec<Value>,
    pub parent: Option<usize>,
    pub body: Body,
}

impl Node {
    pub fn new_leaf() -> Self {
        Self {
            keys: Vec::new(),
            parent: None,
            body: Body::Leaf {
                payloads: Vec::new(),
                next: None,
            },
        }
    }

    pub fn new_internal() -> Self {
        Self {
            keys: Vec::new(),
            parent: None,
            body: Body::Internal {
                children: Vec::new(),
            },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.body, Body::Leaf { .. })
    }

    pub fn num_keys(&self) -> usize {
        self.keys.len()
    }

    pub fn payloads(&self) -> &[Rid] {
        match &self.body {
            Body::Leaf { payloads, .. } => payloads,
            Body::Internal { .. } => &[],
        }
    }

    pub fn payloads_mut(&mut self) -> &mut Vec<Rid> {
        match &mut self.body {
            Body::Leaf { payloads, .. } => payloads,
            Body::Internal { .. } => panic!("payloads_mut called on internal node"),
        }
    }

    pub fn next(&self) -> Option<usize> {
        match &self.body {
            Body::Leaf { next, .. } => *next,
            Body::Internal { .. } => None,
        }
    }

    pub fn set_next(&mut self, next: Option<usize>) {
        match &mut self.body {
            Body::Leaf { next: n, .. } => *n = next,
            Body::Internal { .. } => panic!("set_next called on internal node"),
        }
    }

    pub fn children(&self) -> &[usize] {
        match &self.body {
            Body::Internal { children } => children,
            Body::Leaf { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<usize> {
        match &mut self.body {
            Body::Internal { children } => children,
            Body::Leaf { .. } => panic!("children_mut called on leaf node"),
        }
    }
}
