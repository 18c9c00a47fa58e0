// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Ordered dictionary of active regions.
//
// A circular doubly-linked list with a dummy head at index 0. Keys are
// region indices; ordering is supplied per call as a `leq` closure, since
// the comparison depends on sweep state the list itself knows nothing about.
// Every operation is a linear walk: insertion points are almost always next
// to a known node, and the scan order decides ties between edges the
// comparison cannot separate.

use crate::mesh::INVALID;

/// Index into `Dict::nodes`
pub type NodeIdx = u32;

/// Index of the head sentinel node.
pub const DICT_HEAD: NodeIdx = 0;

#[derive(Clone, Debug)]
pub struct DictNode {
    /// Region index, or INVALID for the head and for free slots.
    pub key: u32,
    pub next: NodeIdx,
    pub prev: NodeIdx,
}

pub struct Dict {
    pub nodes: Vec<DictNode>,
    free: Vec<NodeIdx>,
}

impl Dict {
    pub fn new() -> Self {
        Dict {
            nodes: vec![DictNode {
                key: INVALID,
                next: DICT_HEAD,
                prev: DICT_HEAD,
            }],
            free: Vec::new(),
        }
    }

    /// Inserts `key` at its sorted position, searching backward from the head.
    pub fn insert<F>(&mut self, key: u32, leq: F) -> NodeIdx
    where
        F: Fn(u32, u32) -> bool,
    {
        self.insert_before(DICT_HEAD, key, leq)
    }

    /// Inserts `key` just after the last node before `node` whose key is
    /// `<= key`, or after the head if there is none.
    pub fn insert_before<F>(&mut self, mut node: NodeIdx, key: u32, leq: F) -> NodeIdx
    where
        F: Fn(u32, u32) -> bool,
    {
        loop {
            node = self.nodes[node as usize].prev;
            let node_key = self.nodes[node as usize].key;
            if node_key == INVALID || leq(node_key, key) {
                break;
            }
        }

        let next = self.nodes[node as usize].next;
        let entry = DictNode {
            key,
            next,
            prev: node,
        };
        let new_idx = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot as usize] = entry;
                slot
            }
            None => {
                self.nodes.push(entry);
                (self.nodes.len() - 1) as NodeIdx
            }
        };
        self.nodes[node as usize].next = new_idx;
        self.nodes[next as usize].prev = new_idx;
        new_idx
    }

    pub fn delete(&mut self, node: NodeIdx) {
        debug_assert_ne!(node, DICT_HEAD);
        let next = self.nodes[node as usize].next;
        let prev = self.nodes[node as usize].prev;
        self.nodes[next as usize].prev = prev;
        self.nodes[prev as usize].next = next;

        let n = &mut self.nodes[node as usize];
        n.key = INVALID;
        n.next = INVALID;
        n.prev = INVALID;
        self.free.push(node);
    }

    /// First node, scanning forward from the head, for which `key_leq(node_key)`
    /// holds. Returns the head when there is none.
    pub fn search<F>(&self, key_leq: F) -> NodeIdx
    where
        F: Fn(u32) -> bool,
    {
        let mut node = DICT_HEAD;
        loop {
            node = self.nodes[node as usize].next;
            let node_key = self.nodes[node as usize].key;
            if node_key == INVALID || key_leq(node_key) {
                return node;
            }
        }
    }

    #[inline]
    pub fn key(&self, node: NodeIdx) -> u32 {
        self.nodes[node as usize].key
    }

    #[inline]
    pub fn min(&self) -> NodeIdx {
        self.nodes[DICT_HEAD as usize].next
    }

    #[inline]
    pub fn max(&self) -> NodeIdx {
        self.nodes[DICT_HEAD as usize].prev
    }

    #[inline]
    pub fn succ(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node as usize].next
    }

    #[inline]
    pub fn pred(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node as usize].prev
    }

    pub fn is_empty(&self) -> bool {
        self.min() == DICT_HEAD
    }
}

impl Default for Dict {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leq(a: u32, b: u32) -> bool {
        a <= b
    }

    fn keys(d: &Dict) -> Vec<u32> {
        let mut out = Vec::new();
        let mut n = d.min();
        while n != DICT_HEAD {
            out.push(d.key(n));
            n = d.succ(n);
        }
        out
    }

    #[test]
    fn empty_dict() {
        let d = Dict::new();
        assert_eq!(d.min(), DICT_HEAD);
        assert_eq!(d.max(), DICT_HEAD);
        assert!(d.is_empty());
    }

    #[test]
    fn insert_and_order() {
        let mut d = Dict::new();
        d.insert(3, leq);
        d.insert(1, leq);
        d.insert(2, leq);
        assert_eq!(keys(&d), vec![1, 2, 3]);
        assert_eq!(d.key(d.max()), 3);
        assert_eq!(d.pred(d.min()), DICT_HEAD);
    }

    #[test]
    fn equal_keys_insert_after_existing() {
        // Ties land after the last equal key: insertion order is kept.
        let mut d = Dict::new();
        let a = d.insert(10, |a, b| a / 10 <= b / 10);
        let b = d.insert(11, |a, b| a / 10 <= b / 10);
        assert_eq!(d.succ(a), b);
    }

    #[test]
    fn insert_before_uses_hint() {
        let mut d = Dict::new();
        d.insert(10, leq);
        let hi = d.insert(30, leq);
        let mid = d.insert_before(hi, 20, leq);
        assert_eq!(d.pred(hi), mid);
        assert_eq!(keys(&d), vec![10, 20, 30]);
    }

    #[test]
    fn delete_node_and_reuse_slot() {
        let mut d = Dict::new();
        d.insert(1, leq);
        let n2 = d.insert(2, leq);
        d.insert(3, leq);

        d.delete(n2);
        assert_eq!(keys(&d), vec![1, 3]);

        let again = d.insert(2, leq);
        assert_eq!(again, n2);
        assert_eq!(keys(&d), vec![1, 2, 3]);
    }

    #[test]
    fn search_finds_first_geq() {
        let mut d = Dict::new();
        d.insert(1, leq);
        d.insert(3, leq);
        d.insert(5, leq);

        assert_eq!(d.key(d.search(|k| 2 <= k)), 3);
        assert_eq!(d.key(d.search(|k| 3 <= k)), 3);
        assert_eq!(d.search(|k| 6 <= k), DICT_HEAD);
    }
}
