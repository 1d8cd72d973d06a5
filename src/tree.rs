use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::Index;

use colored::Colorize;

use crate::arena::Arena;
use crate::error::{Error, Result};
use crate::node::{Color, Link, MAX_LIVE_SLOTS, SENTINEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

/// An arena-backed left-leaning red-black tree: an ordered map with
/// `O(log n)` point and range operations and dense, index-addressed
/// storage instead of a pointer graph.
pub struct RedBlackTree<K: Ord + Clone, V> {
    arena: Arena<K, V>,
    root: u32,
}

impl<K: Ord + Clone, V> Default for RedBlackTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V> RedBlackTree<K, V> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: SENTINEL,
        }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            arena: Arena::with_capacity(capacity)?,
            root: SENTINEL,
        })
    }

    /// Grows capacity by at least `additional` slots without touching
    /// contents. The only place besides construction that this tree
    /// allocates.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.arena.reserve(additional)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    // --- accessors shared with range.rs ---

    pub(crate) fn root(&self) -> u32 {
        self.root
    }

    pub(crate) fn link(&self, id: u32) -> Link {
        self.arena.get_link(id)
    }

    pub(crate) fn arena_key(&self, id: u32) -> &K {
        self.arena.get_key(id)
    }

    // --- Navigation ---

    pub fn find(&self, key: &K) -> Option<u32> {
        let mut cur = self.root;
        while cur != SENTINEL {
            cur = match key.cmp(self.arena.get_key(cur)) {
                Ordering::Less => self.arena.get_link(cur).left,
                Ordering::Greater => self.arena.get_link(cur).right,
                Ordering::Equal => return Some(cur),
            };
        }
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|id| self.arena.get_value(id))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    // --- Rotation / flip kernel ---
    //
    // Each primitive relinks the rotated subtree's parent (or promotes
    // to `self.root`) directly, so callers never need a separate
    // "reattach to parent" step after rebalancing.

    fn rotate_left(&mut self, n: u32) -> u32 {
        let n_link = self.arena.get_link(n);
        let r = n_link.right;
        debug_assert_ne!(r, SENTINEL, "rotate_left requires a right child");
        let r_link = self.arena.get_link(r);

        self.arena.set_right(n, r_link.left);
        self.arena.set_parent(r_link.left, n);

        self.relink_parent(n, n_link.parent, r);

        self.arena.set_left(r, n);
        self.arena.set_parent(n, r);

        self.swap_colors(n, r);
        r
    }

    fn rotate_right(&mut self, n: u32) -> u32 {
        let n_link = self.arena.get_link(n);
        let l = n_link.left;
        debug_assert_ne!(l, SENTINEL, "rotate_right requires a left child");
        let l_link = self.arena.get_link(l);

        self.arena.set_left(n, l_link.right);
        self.arena.set_parent(l_link.right, n);

        self.relink_parent(n, n_link.parent, l);

        self.arena.set_right(l, n);
        self.arena.set_parent(n, l);

        self.swap_colors(n, l);
        l
    }

    /// Points whatever used to reference `old` at `parent` (or, if
    /// `old` had no parent, promotes `new` to `self.root`).
    fn relink_parent(&mut self, old: u32, parent: u32, new: u32) {
        self.arena.set_parent(new, parent);
        if parent == SENTINEL {
            self.root = new;
            return;
        }
        let p_link = self.arena.get_link(parent);
        if p_link.left == old {
            self.arena.set_left(parent, new);
        } else {
            debug_assert_eq!(p_link.right, old, "parent/child link inconsistency");
            self.arena.set_right(parent, new);
        }
    }

    fn swap_colors(&mut self, a: u32, b: u32) {
        let a_red = self.arena.is_red(a);
        let b_red = self.arena.is_red(b);
        if a_red {
            self.arena.set_red(b);
        } else {
            self.arena.set_black(b);
        }
        if b_red {
            self.arena.set_red(a);
        } else {
            self.arena.set_black(a);
        }
    }

    fn color_flip(&mut self, n: u32) {
        let link = self.arena.get_link(n);
        debug_assert_ne!(link.left, SENTINEL, "color_flip requires two children");
        debug_assert_ne!(link.right, SENTINEL, "color_flip requires two children");
        self.arena.toggle_color(n);
        self.arena.toggle_color(link.left);
        self.arena.toggle_color(link.right);
    }

    // --- Insert engine ---

    pub fn insert(&mut self, key: K, value: V) -> Result<InsertOutcome> {
        if self.find(&key).is_some() {
            return Ok(InsertOutcome::AlreadyPresent);
        }
        if self.arena.len() as u32 > MAX_LIVE_SLOTS {
            return Err(Error::FullTree);
        }

        if self.root == SENTINEL {
            self.root = self.arena.append(key, value, Color::Black, SENTINEL);
            return Ok(InsertOutcome::Inserted);
        }

        let mut cur = self.root;
        let parent;
        loop {
            match key.cmp(self.arena.get_key(cur)) {
                Ordering::Less => {
                    let left = self.arena.get_link(cur).left;
                    if left == SENTINEL {
                        parent = cur;
                        break;
                    }
                    cur = left;
                }
                Ordering::Greater => {
                    let right = self.arena.get_link(cur).right;
                    if right == SENTINEL {
                        parent = cur;
                        break;
                    }
                    cur = right;
                }
                Ordering::Equal => unreachable!("duplicate key already rejected above"),
            }
        }

        let goes_left = key.cmp(self.arena.get_key(parent)) == Ordering::Less;
        let id = self.arena.append(key, value, Color::Red, parent);
        if goes_left {
            self.arena.set_left(parent, id);
        } else {
            self.arena.set_right(parent, id);
        }

        self.rebalance_after_insert(parent);
        Ok(InsertOutcome::Inserted)
    }

    fn rebalance_after_insert(&mut self, start: u32) {
        let mut p = start;
        loop {
            let link = self.arena.get_link(p);
            let left_red = self.arena.is_red(link.left);
            let right_red = self.arena.is_red(link.right);

            if left_red && right_red {
                self.color_flip(p);
                let parent = self.arena.get_link(p).parent;
                if parent == SENTINEL {
                    self.arena.set_black(p);
                    break;
                }
                p = parent;
                continue;
            }

            if right_red {
                p = self.rotate_left(p);
                continue;
            }

            if left_red && self.arena.is_red(self.arena.get_link(link.left).left) {
                p = self.rotate_right(p);
                continue;
            }

            let parent = self.arena.get_link(p).parent;
            if parent == SENTINEL {
                break;
            }
            p = parent;
        }
    }

    // --- Delete engine ---

    pub fn delete(&mut self, key: &K) -> Option<(K, V)> {
        self.find(key)?;

        let mut removed = SENTINEL;
        self.root = self.delete_node(self.root, key, &mut removed);
        if self.root != SENTINEL {
            self.arena.set_black(self.root);
        }
        debug_assert_ne!(removed, SENTINEL, "delete_node must mark the removed slot");

        let (k, v, relocation) = self.arena.swap_remove(removed);
        if let Some(reloc) = relocation {
            if self.root == reloc.old_id {
                self.root = reloc.new_id;
            }
        }
        Some((k, v))
    }

    fn delete_node(&mut self, n: u32, key: &K, removed: &mut u32) -> u32 {
        let mut n = n;
        match key.cmp(self.arena.get_key(n)) {
            Ordering::Less => {
                let left = self.arena.get_link(n).left;
                debug_assert_ne!(left, SENTINEL, "key known present but left child missing");
                if !self.arena.is_red(left) && !self.arena.is_red(self.arena.get_link(left).left)
                {
                    n = self.move_red_left(n);
                }
                let left = self.arena.get_link(n).left;
                let new_left = self.delete_node(left, key, removed);
                self.arena.set_left(n, new_left);
                self.arena.set_parent(new_left, n);
                self.fix_up(n)
            }
            _ => {
                if self.arena.is_red(self.arena.get_link(n).left) {
                    n = self.rotate_right(n);
                }
                if *key == *self.arena.get_key(n) && self.arena.get_link(n).right == SENTINEL {
                    *removed = n;
                    return SENTINEL;
                }
                let right = self.arena.get_link(n).right;
                debug_assert_ne!(right, SENTINEL, "key known present but right child missing");
                if !self.arena.is_red(right)
                    && !self.arena.is_red(self.arena.get_link(right).left)
                {
                    n = self.move_red_right(n);
                }
                if *key == *self.arena.get_key(n) {
                    self.delete_via_successor(n, removed)
                } else {
                    let right = self.arena.get_link(n).right;
                    let new_right = self.delete_node(right, key, removed);
                    self.arena.set_right(n, new_right);
                    self.arena.set_parent(new_right, n);
                    self.fix_up(n)
                }
            }
        }
    }

    /// Replaces `n` by grafting the in-order successor's link record
    /// into `n`'s structural position, rather than copying the
    /// successor's key/value over `n`. `n` itself becomes the slot
    /// recorded in `removed` for the caller's final `swap_remove`.
    fn delete_via_successor(&mut self, n: u32, removed: &mut u32) -> u32 {
        let right = self.arena.get_link(n).right;
        let (new_right, successor) = self.remove_min(right);

        let n_link = self.arena.get_link(n);
        let graft = Link {
            self_id: successor,
            left: n_link.left,
            right: new_right,
            parent: n_link.parent,
        };
        self.arena.set_link(successor, graft);
        self.arena.set_parent(graft.left, successor);
        self.arena.set_parent(graft.right, successor);
        if self.arena.is_red(n) {
            self.arena.set_red(successor);
        } else {
            self.arena.set_black(successor);
        }

        // n's children now live under `successor`; detach n so it is a
        // genuine leaf by the time the caller hands it to swap_remove.
        self.arena.set_left(n, SENTINEL);
        self.arena.set_right(n, SENTINEL);

        *removed = n;
        self.fix_up(successor)
    }

    /// Removes the minimum of the subtree rooted at `n`, returning the
    /// new subtree root and the slot id that held the minimum.
    fn remove_min(&mut self, n: u32) -> (u32, u32) {
        let mut n = n;
        let left = self.arena.get_link(n).left;
        if left == SENTINEL {
            debug_assert_eq!(
                self.arena.get_link(n).right,
                SENTINEL,
                "a leftless LLRB node cannot carry a lone right child"
            );
            return (SENTINEL, n);
        }
        if !self.arena.is_red(left) && !self.arena.is_red(self.arena.get_link(left).left) {
            n = self.move_red_left(n);
        }
        let left = self.arena.get_link(n).left;
        let (new_left, removed) = self.remove_min(left);
        self.arena.set_left(n, new_left);
        self.arena.set_parent(new_left, n);
        (self.fix_up(n), removed)
    }

    fn move_red_left(&mut self, n: u32) -> u32 {
        self.color_flip(n);
        let right = self.arena.get_link(n).right;
        let right_left = self.arena.get_link(right).left;
        if self.arena.is_red(right_left) {
            self.rotate_right(right);
            let n = self.rotate_left(n);
            self.color_flip(n);
            return n;
        }
        n
    }

    fn move_red_right(&mut self, n: u32) -> u32 {
        self.color_flip(n);
        let left = self.arena.get_link(n).left;
        let left_left = self.arena.get_link(left).left;
        if self.arena.is_red(left_left) {
            let n = self.rotate_right(n);
            self.color_flip(n);
            return n;
        }
        n
    }

    fn fix_up(&mut self, n: u32) -> u32 {
        let mut n = n;
        if self.arena.is_red(self.arena.get_link(n).right) {
            n = self.rotate_left(n);
        }
        let left = self.arena.get_link(n).left;
        if self.arena.is_red(left) && self.arena.is_red(self.arena.get_link(left).left) {
            n = self.rotate_right(n);
        }
        let link = self.arena.get_link(n);
        if self.arena.is_red(link.left) && self.arena.is_red(link.right) {
            self.color_flip(n);
        }
        n
    }

    // --- Update ---

    /// Overwrites the value for `key` in place, returning the previous
    /// `(key, value)` pair. Does not affect tree shape.
    pub fn update(&mut self, key: K, value: V) -> Result<(K, V)> {
        let id = self.find(&key).ok_or(Error::NotFound)?;
        let old_key = self.arena.get_key(id).clone();
        let old_value = std::mem::replace(self.arena.get_value_mut(id), value);
        Ok((old_key, old_value))
    }

    // --- Debug / introspection surface ---

    pub fn is_valid_llrb(&self) -> bool {
        if self.arena.is_red(self.root) {
            return false;
        }
        black_height(self, self.root).is_some()
    }

    pub fn pretty_print(&self)
    where
        K: Debug,
    {
        let mut rendered = String::new();
        let mut stack = vec![(self.root, String::new(), String::new())];
        while let Some((n, padding, pointer)) = stack.pop() {
            if n == SENTINEL {
                continue;
            }
            let key = self.arena.get_key(n);
            rendered.push_str(&padding);
            rendered.push_str(&pointer);
            if self.arena.is_red(n) {
                rendered.push_str(&format!("{:?}", key).red().to_string());
            } else {
                rendered.push_str(&format!("{:?}", key));
            }
            rendered.push('\n');

            let mut child_padding = padding;
            child_padding.push_str("│  ");
            let link = self.arena.get_link(n);
            let left_pointer = if link.right != SENTINEL {
                "├──"
            } else {
                "└──"
            }
            .to_string();
            stack.push((link.right, child_padding.clone(), "└──".to_string()));
            stack.push((link.left, child_padding, left_pointer));
        }
        println!("{}", rendered);
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut stack = Vec::new();
        push_left_spine(self, self.root, &mut stack);
        Iter { tree: self, stack }
    }
}

fn black_height<K: Ord + Clone, V>(tree: &RedBlackTree<K, V>, n: u32) -> Option<u32> {
    if n == SENTINEL {
        return Some(0);
    }
    let link = tree.link(n);
    if tree.arena.is_red(n) && tree.arena.is_red(link.left) {
        return None;
    }
    if tree.arena.is_red(link.right) {
        return None;
    }
    let left_height = black_height(tree, link.left)?;
    let right_height = black_height(tree, link.right)?;
    if left_height != right_height {
        return None;
    }
    Some(left_height + tree.arena.is_black(n) as u32)
}

fn push_left_spine<K: Ord + Clone, V>(tree: &RedBlackTree<K, V>, mut n: u32, stack: &mut Vec<u32>) {
    while n != SENTINEL {
        stack.push(n);
        n = tree.link(n).left;
    }
}

pub struct Iter<'a, K: Ord + Clone, V> {
    tree: &'a RedBlackTree<K, V>,
    stack: Vec<u32>,
}

impl<'a, K: Ord + Clone, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.stack.pop()?;
        let right = self.tree.link(n).right;
        push_left_spine(self.tree, right, &mut self.stack);
        Some((self.tree.arena_key(n), self.tree.arena.get_value(n)))
    }
}

impl<'a, K: Ord + Clone, V> IntoIterator for &'a RedBlackTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord + Clone, V> Index<&K> for RedBlackTree<K, V> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not present in tree")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<K: Ord + Clone, V>(tree: &RedBlackTree<K, V>) -> Vec<K> {
        tree.iter().map(|(k, _)| k.clone()).collect()
    }

    #[test]
    fn empty_tree_has_no_root() {
        let tree: RedBlackTree<i32, i32> = RedBlackTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.get(&1), None);
    }

    #[test]
    fn ascending_insertions_stay_balanced_and_ordered() {
        let mut tree = RedBlackTree::new();
        let ks = [0, 5, 10, 15, 20, 25, 30, 35, 40];
        for &k in &ks {
            assert_eq!(tree.insert(k, k * 10).unwrap(), InsertOutcome::Inserted);
            assert_eq!(tree.get(&k), Some(&(k * 10)));
            assert!(tree.is_valid_llrb());
        }
        assert_eq!(keys(&tree), ks.to_vec());
    }

    #[test]
    fn descending_insertions_stay_balanced_and_ordered() {
        let mut tree = RedBlackTree::new();
        let ks = [40, 35, 30, 25, 20, 15, 10, 5, 0];
        for &k in &ks {
            assert_eq!(tree.insert(k, k * 10).unwrap(), InsertOutcome::Inserted);
            assert!(tree.is_valid_llrb());
        }
        let mut expected = ks.to_vec();
        expected.sort();
        assert_eq!(keys(&tree), expected);
    }

    #[test]
    fn duplicate_insert_reports_already_present_and_does_not_overwrite() {
        let mut tree = RedBlackTree::new();
        assert_eq!(tree.insert(1, "first").unwrap(), InsertOutcome::Inserted);
        assert_eq!(
            tree.insert(1, "second").unwrap(),
            InsertOutcome::AlreadyPresent
        );
        assert_eq!(tree.get(&1), Some(&"first"));
    }

    #[test]
    fn update_overwrites_value_and_returns_previous_pair() {
        let mut tree = RedBlackTree::new();
        tree.insert(1, "old").unwrap();
        let (k, v) = tree.update(1, "new").unwrap();
        assert_eq!((k, v), (1, "old"));
        assert_eq!(tree.get(&1), Some(&"new"));
        assert_eq!(tree.update(2, "nope"), Err(Error::NotFound));
    }

    #[test]
    fn mixed_insert_and_delete_over_a_long_subtree() {
        let mut tree = RedBlackTree::new();
        let ks = [
            10, 30, 5, 15, 25, 35, 2, 7, 12, 17, 23, 27, 32, 37, 31, 33,
        ];
        for &k in &ks {
            tree.insert(k, k * 10).unwrap();
        }
        for &k in &ks {
            assert_eq!(tree.get(&k), Some(&(k * 10)));
            assert_eq!(tree.delete(&k), Some((k, k * 10)));
            assert!(tree.is_valid_llrb());
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn delete_absent_key_is_a_no_op() {
        let mut tree = RedBlackTree::new();
        tree.insert(1, "a").unwrap();
        assert_eq!(tree.delete(&2), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn root_drain_removes_every_key_in_root_order() {
        let mut tree = RedBlackTree::new();
        let ks: Vec<i32> = (0..25).map(|i| i * 5).collect();
        for &k in &ks {
            tree.insert(k, k).unwrap();
        }
        while !tree.is_empty() {
            let root_key = *tree.arena_key(tree.root());
            assert!(tree.delete(&root_key).is_some());
            assert!(tree.is_valid_llrb());
        }
    }

    #[test]
    fn left_spine_drain_then_reinsert() {
        let mut tree = RedBlackTree::new();
        let ks: Vec<i32> = (0..25).map(|i| i * 5).collect();
        for &k in &ks {
            tree.insert(k, k).unwrap();
        }
        loop {
            let left = tree.link(tree.root()).left;
            if left == SENTINEL {
                break;
            }
            let left_key = *tree.arena_key(left);
            tree.delete(&left_key).unwrap();
            assert!(tree.is_valid_llrb());
        }
        tree.insert(45, 45).unwrap();
        assert!(tree.is_valid_llrb());
    }
}
