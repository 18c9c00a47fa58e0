// Copyright 2025 The glutess Authors
// License: SGI Free Software License B (MIT-compatible)
//
// Vertex event queue.
//
// Two structures behind one interface:
//   - a sort array, filled before `init` and sorted once (descending, so the
//     minimum is popped off the end), addressed by handles -(pos + 1);
//   - a binary min-heap for keys inserted after `init`, addressed by handles
//     >= 1.
// Keys are u32 (vertex indices); INVALID means "none". The ordering is
// passed into every comparing call.

use crate::mesh::INVALID;

pub type PqHandle = i32;

#[derive(Clone, Copy, Debug)]
struct HandleElem {
    key: u32,
    /// Heap position while live; next free handle once freed.
    node: i32,
}

struct Heap {
    /// nodes[1..=size] hold handles; nodes[0] is unused.
    nodes: Vec<i32>,
    handles: Vec<HandleElem>,
    size: usize,
    max: usize,
    free_list: i32,
    initialized: bool,
}

impl Heap {
    fn new(capacity: usize) -> Self {
        let max = capacity.max(1);
        let mut nodes = vec![0i32; max + 2];
        let mut handles = vec![HandleElem { key: INVALID, node: 0 }; max + 2];
        // nodes[1] -> handle 1 with no key, so an empty heap reports no minimum.
        nodes[1] = 1;
        handles[1].node = 1;
        Heap {
            nodes,
            handles,
            size: 0,
            max,
            free_list: 0,
            initialized: false,
        }
    }

    #[inline]
    fn key_at(&self, pos: usize) -> u32 {
        self.handles[self.nodes[pos] as usize].key
    }

    fn float_down<F: Fn(u32, u32) -> bool>(&mut self, mut curr: usize, leq: &F) {
        let h_curr = self.nodes[curr];
        loop {
            let mut child = curr << 1;
            if child < self.size && leq(self.key_at(child + 1), self.key_at(child)) {
                child += 1;
            }
            debug_assert!(child <= self.max + 1);
            let h_child = self.nodes[child];
            if child > self.size || leq(self.handles[h_curr as usize].key, self.handles[h_child as usize].key) {
                self.nodes[curr] = h_curr;
                self.handles[h_curr as usize].node = curr as i32;
                break;
            }
            self.nodes[curr] = h_child;
            self.handles[h_child as usize].node = curr as i32;
            curr = child;
        }
    }

    fn float_up<F: Fn(u32, u32) -> bool>(&mut self, mut curr: usize, leq: &F) {
        let h_curr = self.nodes[curr];
        loop {
            let parent = curr >> 1;
            let h_parent = self.nodes[parent];
            if parent == 0 || leq(self.handles[h_parent as usize].key, self.handles[h_curr as usize].key) {
                self.nodes[curr] = h_curr;
                self.handles[h_curr as usize].node = curr as i32;
                break;
            }
            self.nodes[curr] = h_parent;
            self.handles[h_parent as usize].node = curr as i32;
            curr = parent;
        }
    }

    fn init<F: Fn(u32, u32) -> bool>(&mut self, leq: &F) {
        for i in (1..=self.size).rev() {
            self.float_down(i, leq);
        }
        self.initialized = true;
    }

    fn insert<F: Fn(u32, u32) -> bool>(&mut self, key: u32, leq: &F) -> PqHandle {
        self.size += 1;
        let curr = self.size;
        if curr * 2 > self.max {
            self.max <<= 1;
            self.nodes.resize(self.max + 2, 0);
            self.handles.resize(self.max + 2, HandleElem { key: INVALID, node: 0 });
        }

        let handle = if self.free_list == 0 {
            curr as i32
        } else {
            let h = self.free_list;
            self.free_list = self.handles[h as usize].node;
            h
        };

        self.nodes[curr] = handle;
        self.handles[handle as usize] = HandleElem {
            key,
            node: curr as i32,
        };
        if self.initialized {
            self.float_up(curr, leq);
        }
        debug_assert_ne!(handle, 0);
        handle
    }

    fn extract_min<F: Fn(u32, u32) -> bool>(&mut self, leq: &F) -> u32 {
        let h_min = self.nodes[1];
        let min = self.handles[h_min as usize].key;
        if self.size > 0 {
            self.nodes[1] = self.nodes[self.size];
            self.handles[self.nodes[1] as usize].node = 1;

            self.handles[h_min as usize] = HandleElem {
                key: INVALID,
                node: self.free_list,
            };
            self.free_list = h_min;

            self.size -= 1;
            if self.size > 0 {
                self.float_down(1, leq);
            }
        }
        min
    }

    fn delete<F: Fn(u32, u32) -> bool>(&mut self, h_curr: PqHandle, leq: &F) {
        debug_assert!(h_curr >= 1 && self.handles[h_curr as usize].key != INVALID);
        let curr = self.handles[h_curr as usize].node as usize;
        self.nodes[curr] = self.nodes[self.size];
        self.handles[self.nodes[curr] as usize].node = curr as i32;

        self.size -= 1;
        if curr <= self.size {
            if curr <= 1 || leq(self.key_at(curr >> 1), self.key_at(curr)) {
                self.float_down(curr, leq);
            } else {
                self.float_up(curr, leq);
            }
        }

        self.handles[h_curr as usize] = HandleElem {
            key: INVALID,
            node: self.free_list,
        };
        self.free_list = h_curr;
    }

    #[inline]
    fn minimum(&self) -> u32 {
        self.key_at(1)
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.size == 0
    }
}

pub struct PriorityQ {
    heap: Heap,
    keys: Vec<u32>,
    /// Positions into `keys`, sorted so the minimum is last.
    order: Vec<usize>,
    /// Live prefix of `order`.
    size: usize,
    initialized: bool,
}

impl PriorityQ {
    pub fn new(capacity: usize) -> Self {
        PriorityQ {
            heap: Heap::new(capacity),
            keys: Vec::with_capacity(capacity),
            order: Vec::new(),
            size: 0,
            initialized: false,
        }
    }

    /// Sorts the keys inserted so far. Later inserts go to the heap.
    pub fn init<F: Fn(u32, u32) -> bool>(&mut self, leq: &F) {
        self.order = (0..self.keys.len()).collect();
        self.size = self.keys.len();
        sort_descending(&mut self.order, &self.keys, leq);
        self.initialized = true;
        self.heap.init(leq);
    }

    pub fn insert<F: Fn(u32, u32) -> bool>(&mut self, key: u32, leq: &F) -> PqHandle {
        debug_assert_ne!(key, INVALID);
        if self.initialized {
            return self.heap.insert(key, leq);
        }
        let curr = self.keys.len();
        self.keys.push(key);
        -(curr as i32 + 1)
    }

    pub fn extract_min<F: Fn(u32, u32) -> bool>(&mut self, leq: &F) -> u32 {
        if self.size == 0 {
            return self.heap.extract_min(leq);
        }
        let sort_min = self.keys[self.order[self.size - 1]];
        if !self.heap.is_empty() && leq(self.heap.minimum(), sort_min) {
            return self.heap.extract_min(leq);
        }
        loop {
            self.size -= 1;
            if self.size == 0 || self.keys[self.order[self.size - 1]] != INVALID {
                break;
            }
        }
        sort_min
    }

    pub fn minimum<F: Fn(u32, u32) -> bool>(&self, leq: &F) -> u32 {
        if self.size == 0 {
            return self.heap.minimum();
        }
        let sort_min = self.keys[self.order[self.size - 1]];
        if !self.heap.is_empty() {
            let heap_min = self.heap.minimum();
            if leq(heap_min, sort_min) {
                return heap_min;
            }
        }
        sort_min
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0 && self.heap.is_empty()
    }

    pub fn delete<F: Fn(u32, u32) -> bool>(&mut self, handle: PqHandle, leq: &F) {
        if handle >= 0 {
            self.heap.delete(handle, leq);
            return;
        }
        let curr = (-(handle + 1)) as usize;
        debug_assert!(curr < self.keys.len() && self.keys[curr] != INVALID);
        self.keys[curr] = INVALID;
        while self.size > 0 && self.keys[self.order[self.size - 1]] == INVALID {
            self.size -= 1;
        }
    }
}

/// Randomized quicksort with a fixed-seed pivot generator, finishing short
/// runs with insertion sort. Sorts `order` so `keys[order[..]]` descends.
fn sort_descending<F: Fn(u32, u32) -> bool>(order: &mut [usize], keys: &[u32], leq: &F) {
    if order.len() < 2 {
        return;
    }
    let gt = |a: usize, b: usize| !leq(keys[a], keys[b]);
    let lt = |a: usize, b: usize| !leq(keys[b], keys[a]);

    let mut seed: u32 = 2016473283;
    let mut stack: Vec<(isize, isize)> = vec![(0, order.len() as isize - 1)];
    while let Some((mut p, mut r)) = stack.pop() {
        while r > p + 10 {
            seed = seed.wrapping_mul(1539415821).wrapping_add(1);
            let pick = p + (seed % (r - p + 1) as u32) as isize;
            order.swap(pick as usize, p as usize);
            let piv = order[p as usize];

            let mut i = p - 1;
            let mut j = r + 1;
            loop {
                loop {
                    i += 1;
                    if !gt(order[i as usize], piv) {
                        break;
                    }
                }
                loop {
                    j -= 1;
                    if !lt(order[j as usize], piv) {
                        break;
                    }
                }
                order.swap(i as usize, j as usize);
                if i >= j {
                    break;
                }
            }
            // The final swap crossed the partition; undo it.
            order.swap(i as usize, j as usize);

            if i - p < r - j {
                stack.push((j + 1, r));
                r = i - 1;
            } else {
                stack.push((p, i - 1));
                p = j + 1;
            }
        }

        let mut i = p + 1;
        while i <= r {
            let piv = order[i as usize];
            let mut j = i;
            while j > p && lt(order[(j - 1) as usize], piv) {
                order[j as usize] = order[(j - 1) as usize];
                j -= 1;
            }
            order[j as usize] = piv;
            i += 1;
        }
    }
}
