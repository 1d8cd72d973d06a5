use crate::node::SENTINEL;
use crate::tree::RedBlackTree;

impl<K: Ord + Clone, V> RedBlackTree<K, V> {
    /// Inorder-collects keys in `[min, max]` into `out`, stopping once
    /// `out` is full. Returns the number of keys written; overflow is
    /// clamped, not signaled.
    pub fn range(&self, min: &K, max: &K, out: &mut [K]) -> usize {
        debug_assert!(min <= max, "range requires min <= max");
        let mut written = 0;
        self.range_visit(self.root(), min, max, out, &mut written);
        written
    }

    fn range_visit(&self, n: u32, min: &K, max: &K, out: &mut [K], written: &mut usize) {
        if n == SENTINEL || *written >= out.len() {
            return;
        }
        let key = self.arena_key(n);
        if min < key {
            self.range_visit(self.link(n).left, min, max, out, written);
        }
        if *written < out.len() {
            let key = self.arena_key(n);
            if min <= key && key <= max {
                out[*written] = key.clone();
                *written += 1;
            }
        }
        if *written < out.len() {
            let key = self.arena_key(n);
            if max > key {
                self.range_visit(self.link(n).right, min, max, out, written);
            }
        }
    }

    /// A pull-based iterator over `[min, max]`, advancing in order.
    /// Undefined if the tree is mutated between calls to `next`.
    pub fn range_iterator(&self, min: K, max: K) -> RangeIter<'_, K, V> {
        debug_assert!(min <= max, "range_iterator requires min <= max");
        let mut stack = Vec::new();
        push_left_spine_at_or_above(self, self.root(), &min, &mut stack);
        RangeIter {
            tree: self,
            max,
            stack,
        }
    }
}

fn push_left_spine_at_or_above<K: Ord + Clone, V>(
    tree: &RedBlackTree<K, V>,
    mut n: u32,
    min: &K,
    stack: &mut Vec<u32>,
) {
    while n != SENTINEL {
        if min <= tree.arena_key(n) {
            stack.push(n);
            n = tree.link(n).left;
        } else {
            n = tree.link(n).right;
        }
    }
}

fn push_left_spine<K: Ord + Clone, V>(tree: &RedBlackTree<K, V>, mut n: u32, stack: &mut Vec<u32>) {
    while n != SENTINEL {
        stack.push(n);
        n = tree.link(n).left;
    }
}

pub struct RangeIter<'a, K: Ord + Clone, V> {
    tree: &'a RedBlackTree<K, V>,
    max: K,
    stack: Vec<u32>,
}

impl<'a, K: Ord + Clone, V> Iterator for RangeIter<'a, K, V> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let n = self.stack.pop()?;
        let key = self.tree.arena_key(n).clone();
        if key > self.max {
            self.stack.clear();
            return None;
        }
        let right = self.tree.link(n).right;
        push_left_spine(self.tree, right, &mut self.stack);
        Some(key)
    }
}
