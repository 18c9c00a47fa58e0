// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Free-list arena. The sweep keeps its active regions here: they are
// created and destroyed constantly, and dictionary nodes and half-edges
// refer to them by index.

use std::ops::{Index, IndexMut};

pub struct BucketAlloc<T> {
    items: Vec<Option<T>>,
    free_list: Vec<u32>,
}

impl<T> BucketAlloc<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    /// Stores `value` and returns its slot; freed slots are reused first.
    pub fn alloc(&mut self, value: T) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            self.items[idx as usize] = Some(value);
            idx
        } else {
            self.items.push(Some(value));
            (self.items.len() - 1) as u32
        }
    }

    pub fn free(&mut self, idx: u32) -> Option<T> {
        let old = self.items.get_mut(idx as usize)?.take();
        if old.is_some() {
            self.free_list.push(idx);
        }
        old
    }

    pub fn get(&self, idx: u32) -> Option<&T> {
        self.items.get(idx as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.items.get_mut(idx as usize)?.as_mut()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.items.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.free_list.clear();
    }
}

impl<T> Default for BucketAlloc<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<u32> for BucketAlloc<T> {
    type Output = T;

    fn index(&self, idx: u32) -> &T {
        match self.items.get(idx as usize) {
            Some(Some(item)) => item,
            _ => panic!("stale arena slot {idx}"),
        }
    }
}

impl<T> IndexMut<u32> for BucketAlloc<T> {
    fn index_mut(&mut self, idx: u32) -> &mut T {
        match self.items.get_mut(idx as usize) {
            Some(Some(item)) => item,
            _ => panic!("stale arena slot {idx}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_free_reuses_slots() {
        let mut ba: BucketAlloc<u32> = BucketAlloc::new();
        let a = ba.alloc(10);
        let b = ba.alloc(20);
        assert_ne!(a, b);
        assert_eq!(ba.len(), 2);
        assert_eq!(ba.free(a), Some(10));
        assert_eq!(ba.len(), 1);
        let c = ba.alloc(30);
        assert_eq!(c, a);
        assert_eq!(ba[c], 30);
    }

    #[test]
    fn double_free_is_ignored() {
        let mut ba: BucketAlloc<i32> = BucketAlloc::new();
        let idx = ba.alloc(1);
        assert_eq!(ba.free(idx), Some(1));
        assert_eq!(ba.free(idx), None);
        assert!(ba.is_empty());
        // The slot must only be handed out once.
        let x = ba.alloc(2);
        let y = ba.alloc(3);
        assert_ne!(x, y);
    }

    #[test]
    fn get_after_free_returns_none() {
        let mut ba: BucketAlloc<i32> = BucketAlloc::with_capacity(4);
        let idx = ba.alloc(7);
        ba[idx] += 1;
        assert_eq!(ba.get(idx), Some(&8));
        ba.free(idx);
        assert!(ba.get(idx).is_none());
        assert!(ba.get_mut(idx).is_none());
    }

    #[test]
    #[should_panic(expected = "stale arena slot")]
    fn indexing_a_freed_slot_panics() {
        let mut ba: BucketAlloc<i32> = BucketAlloc::new();
        let idx = ba.alloc(7);
        ba.free(idx);
        let _ = ba[idx];
    }
}
