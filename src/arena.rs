use crate::error::{Error, Result};
use crate::node::{Color, Link, SENTINEL};

/// Bit-packed color vector: one bit per slot, bit-set = black.
///
/// Fresh capacity is word-filled with `u64::MAX` so newly reserved slots
/// read as black without any per-slot initialization — red is the color
/// that must be explicitly assigned.
struct ColorBits {
    words: Vec<u64>,
}

impl ColorBits {
    fn new() -> Self {
        Self { words: Vec::new() }
    }

    fn words_for(bits: usize) -> usize {
        (bits + 63) / 64
    }

    fn reserve(&mut self, total_bits: usize) -> Result<()> {
        let needed = Self::words_for(total_bits);
        if needed > self.words.len() {
            self.words
                .try_reserve(needed - self.words.len())
                .map_err(|_| Error::AllocationFailure)?;
            self.words.resize(needed, u64::MAX);
        }
        Ok(())
    }

    #[inline(always)]
    fn is_black(&self, id: u32) -> bool {
        let (word, bit) = (id as usize / 64, id as usize % 64);
        (self.words[word] >> bit) & 1 == 1
    }

    #[inline(always)]
    fn set_black(&mut self, id: u32) {
        let (word, bit) = (id as usize / 64, id as usize % 64);
        self.words[word] |= 1 << bit;
    }

    #[inline(always)]
    fn set_red(&mut self, id: u32) {
        let (word, bit) = (id as usize / 64, id as usize % 64);
        self.words[word] &= !(1 << bit);
    }

    #[inline(always)]
    fn toggle(&mut self, id: u32) {
        let (word, bit) = (id as usize / 64, id as usize % 64);
        self.words[word] ^= 1 << bit;
    }

    fn swap_remove(&mut self, id: u32, last: u32) {
        if id != last {
            if self.is_black(last) {
                self.set_black(id);
            } else {
                self.set_red(id);
            }
        }
    }
}

/// Describes a slot that physically moved during a swap-remove
/// compaction. The arena never owns the tree's `root` field, so it
/// reports the move and lets the caller patch anything it holds.
#[derive(Debug, Copy, Clone)]
pub struct Relocation {
    pub old_id: u32,
    pub new_id: u32,
}

/// Dense, index-addressed storage for the tree: parallel `keys`,
/// `values`, `links` arrays plus a bit-packed color vector, all indexed
/// by slot id. Removal compacts by swap-with-last so live ids are
/// always exactly `0..len()`.
pub struct Arena<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
    links: Vec<Link>,
    colors: ColorBits,
}

impl<K, V> Arena<K, V> {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            links: Vec::new(),
            colors: ColorBits::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut arena = Self::new();
        arena.reserve(capacity)?;
        Ok(arena)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.keys.capacity()
    }

    /// Grows capacity of all backing containers by at least `additional`
    /// slots. Fails atomically: on error no container has been mutated
    /// in a way observable to the caller.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.keys
            .try_reserve(additional)
            .map_err(|_| Error::AllocationFailure)?;
        self.values
            .try_reserve(additional)
            .map_err(|_| Error::AllocationFailure)?;
        self.links
            .try_reserve(additional)
            .map_err(|_| Error::AllocationFailure)?;
        self.colors.reserve(self.keys.len() + additional)?;
        Ok(())
    }

    /// Appends a new slot. Assumes the caller already reserved capacity;
    /// mutating operations are not supposed to allocate.
    pub fn append(&mut self, key: K, value: V, color: Color, parent: u32) -> u32 {
        debug_assert!(
            self.keys.len() < self.keys.capacity(),
            "arena append without reserved capacity"
        );
        let id = self.keys.len() as u32;
        self.keys.push(key);
        self.values.push(value);
        self.links.push(Link::new(id));
        self.links[id as usize].parent = parent;
        self.colors
            .reserve(self.keys.len())
            .expect("color bits capacity tracks keys capacity");
        match color {
            Color::Black => self.colors.set_black(id),
            Color::Red => self.colors.set_red(id),
        }
        id
    }

    /// Removes `id`, compacting by moving the last live slot into its
    /// place. Returns the removed key/value and, if a slot physically
    /// moved, a `Relocation` describing it so the caller can patch any
    /// id it holds (most importantly, the tree's `root`).
    pub fn swap_remove(&mut self, id: u32) -> (K, V, Option<Relocation>) {
        debug_assert_eq!(
            self.links[id as usize].left,
            SENTINEL,
            "swap_remove requires a leaf slot"
        );
        debug_assert_eq!(
            self.links[id as usize].right,
            SENTINEL,
            "swap_remove requires a leaf slot"
        );
        let last = self.keys.len() as u32 - 1;
        let key = self.keys.swap_remove(id as usize);
        let value = self.values.swap_remove(id as usize);
        self.links.swap_remove(id as usize);
        self.colors.swap_remove(id, last);

        if last == id {
            return (key, value, None);
        }

        self.links[id as usize].self_id = id;
        let moved = self.links[id as usize];
        if moved.left != SENTINEL {
            self.links[moved.left as usize].parent = id;
        }
        if moved.right != SENTINEL {
            self.links[moved.right as usize].parent = id;
        }
        if moved.parent != SENTINEL {
            let parent = &mut self.links[moved.parent as usize];
            if parent.left == last {
                parent.left = id;
            } else if parent.right == last {
                parent.right = id;
            } else {
                panic!("parent/child link inconsistency during swap_remove");
            }
        }
        (
            key,
            value,
            Some(Relocation {
                old_id: last,
                new_id: id,
            }),
        )
    }

    #[inline(always)]
    pub fn get_key(&self, id: u32) -> &K {
        &self.keys[id as usize]
    }

    #[inline(always)]
    pub fn get_value(&self, id: u32) -> &V {
        &self.values[id as usize]
    }

    #[inline(always)]
    pub fn get_value_mut(&mut self, id: u32) -> &mut V {
        &mut self.values[id as usize]
    }

    #[inline(always)]
    pub fn get_link(&self, id: u32) -> Link {
        self.links[id as usize]
    }

    #[inline(always)]
    pub fn set_link(&mut self, id: u32, link: Link) {
        self.links[id as usize] = link;
    }

    #[inline(always)]
    pub fn set_left(&mut self, id: u32, left: u32) {
        if id != SENTINEL {
            self.links[id as usize].left = left;
        }
    }

    #[inline(always)]
    pub fn set_right(&mut self, id: u32, right: u32) {
        if id != SENTINEL {
            self.links[id as usize].right = right;
        }
    }

    #[inline(always)]
    pub fn set_parent(&mut self, id: u32, parent: u32) {
        if id != SENTINEL {
            self.links[id as usize].parent = parent;
        }
    }

    /// `None` (the sentinel) is treated as black, matching the usual
    /// leaf-is-black convention so callers can test `is_red` on a child
    /// id without special-casing the sentinel.
    #[inline(always)]
    pub fn is_red(&self, id: u32) -> bool {
        id != SENTINEL && !self.colors.is_black(id)
    }

    #[inline(always)]
    pub fn is_black(&self, id: u32) -> bool {
        !self.is_red(id)
    }

    #[inline(always)]
    pub fn set_red(&mut self, id: u32) {
        self.colors.set_red(id);
    }

    #[inline(always)]
    pub fn set_black(&mut self, id: u32) {
        self.colors.set_black(id);
    }

    #[inline(always)]
    pub fn toggle_color(&mut self, id: u32) {
        self.colors.toggle(id);
    }
}
