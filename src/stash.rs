//! The client-local stash: an arena of real blocks with a free-list and an
//! address-to-slot index, so "is `a` in the stash?" is O(1) rather than a
//! linear scan.

use std::collections::HashMap;

use crate::block::Block;

/// An unordered multiset of real blocks held only by the client.
///
/// Dummy blocks never enter the stash: the read phase discards them as soon
/// as a bucket is decoded, which is equivalent to (but cheaper than)
/// appending them and filtering afterward, since a dummy block's sentinel
/// address carries no information the eviction pass needs.
#[derive(Debug, Default)]
pub struct Stash {
    slots: Vec<Option<Block>>,
    free: Vec<usize>,
    index: HashMap<u64, usize>,
}

impl Stash {
    /// Creates an empty stash.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of real blocks currently held.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True iff the stash holds no real blocks.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Inserts a real block, replacing any existing block at the same
    /// address.
    pub fn insert(&mut self, block: Block) {
        debug_assert!(!block.dummy, "dummy blocks must not enter the stash");
        if let Some(&slot) = self.index.get(&block.a) {
            self.slots[slot] = Some(block);
            return;
        }
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(block);
                slot
            }
            None => {
                self.slots.push(Some(block));
                self.slots.len() - 1
            }
        };
        self.index.insert(block.a, slot);
    }

    /// Returns the real block at address `a`, if present.
    pub fn get(&self, a: u64) -> Option<&Block> {
        self.index
            .get(&a)
            .map(|&slot| self.slots[slot].as_ref().unwrap())
    }

    /// Removes and returns the real block at address `a`, if present.
    pub fn remove(&mut self, a: u64) -> Option<Block> {
        let slot = self.index.remove(&a)?;
        let block = self.slots[slot].take();
        self.free.push(slot);
        block
    }

    /// Iterates over every real block currently in the stash.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(a: u64) -> Block {
        Block {
            a,
            x: 0,
            data: *b"ABCD",
            dummy: false,
        }
    }

    #[test]
    fn insert_then_get() {
        let mut stash = Stash::new();
        stash.insert(block(3));
        assert_eq!(stash.get(3).unwrap().a, 3);
        assert_eq!(stash.len(), 1);
    }

    #[test]
    fn insert_same_address_replaces() {
        let mut stash = Stash::new();
        stash.insert(block(3));
        let mut updated = block(3);
        updated.data = *b"WXYZ";
        stash.insert(updated);
        assert_eq!(stash.len(), 1);
        assert_eq!(stash.get(3).unwrap().data, *b"WXYZ");
    }

    #[test]
    fn remove_frees_the_slot_for_reuse() {
        let mut stash = Stash::new();
        stash.insert(block(1));
        stash.insert(block(2));
        stash.remove(1);
        assert_eq!(stash.len(), 1);
        assert!(stash.get(1).is_none());

        stash.insert(block(3));
        assert_eq!(stash.len(), 2);
        // The freed slot was reused rather than growing the arena.
        assert_eq!(stash.slots.len(), 2);
    }

    #[test]
    fn iter_visits_every_real_block() {
        let mut stash = Stash::new();
        for a in 0..5 {
            stash.insert(block(a));
        }
        stash.remove(2);
        let mut addresses: Vec<u64> = stash.iter().map(|b| b.a).collect();
        addresses.sort_unstable();
        assert_eq!(addresses, vec![0, 1, 3, 4]);
    }
}
