//! Pattern texture atlas: slot allocation shared by every fish in every pond.
//!
//! The renderer owns the actual texture; the simulation only needs slots to
//! hand out and a way to ask for a pattern to be (re)drawn. [`SlotAtlas`] is
//! the bookkeeping implementation used headless and in tests.

use rand::Rng;

use crate::components::Pattern;

/// An allocated region of the atlas. Not `Clone`: the fish that holds it
/// is the only party that can give it back.
///
/// The epoch names the atlas generation the slot came from. A slot kept
/// across an atlas rebuild is stale and the new atlas ignores it.
#[derive(Debug, PartialEq, Eq)]
pub struct AtlasSlot {
    index: u32,
    epoch: u32,
}

impl AtlasSlot {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }
}

/// Seed patterns are rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSource {
    seed: u32,
}

impl RandomSource {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn from_rng(rng: &mut impl Rng) -> Self {
        Self { seed: rng.gen() }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

/// Texture slot allocator and pattern writer.
pub trait Atlas {
    /// Reserve a slot. The atlas grows when full.
    fn allocate(&mut self) -> AtlasSlot;
    /// Return a slot. Stale slots are ignored.
    fn free(&mut self, slot: AtlasSlot);
    /// Whether `slot` was handed out by this atlas and is still live.
    fn owns(&self, slot: &AtlasSlot) -> bool;
    /// Render `pattern` into its slot. Patterns without a slot are ignored.
    fn write(&mut self, pattern: &Pattern, random_source: &RandomSource);
}

/// What was last written into a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotContents {
    pub layers: usize,
    pub seed: u32,
}

/// Free-list atlas that records what was written where.
#[derive(Debug, Clone)]
pub struct SlotAtlas {
    epoch: u32,
    capacity: usize,
    slots: Vec<Option<SlotContents>>,
    allocated: Vec<bool>,
    free_list: Vec<u32>,
    frees: usize,
    writes: usize,
    resized: bool,
}

impl SlotAtlas {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            epoch: 0,
            capacity,
            slots: vec![None; capacity],
            allocated: vec![false; capacity],
            free_list: (0..capacity as u32).rev().collect(),
            frees: 0,
            writes: 0,
            resized: false,
        }
    }

    /// An empty atlas of the next generation. Slots of this atlas are
    /// stale to it.
    pub fn successor(&self, capacity: usize) -> Self {
        Self {
            epoch: self.epoch.wrapping_add(1),
            ..Self::new(capacity)
        }
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently handed out.
    pub fn in_use(&self) -> usize {
        self.allocated.iter().filter(|&&a| a).count()
    }

    /// Total number of frees since creation.
    pub fn frees(&self) -> usize {
        self.frees
    }

    /// Total number of pattern writes since creation.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn contents(&self, slot: &AtlasSlot) -> Option<SlotContents> {
        if slot.epoch != self.epoch {
            return None;
        }

        self.slots.get(slot.index as usize).copied().flatten()
    }

    /// Whether the atlas grew since the last call. Every pattern must be
    /// written again after a resize.
    pub fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }

    fn grow(&mut self) {
        let old = self.capacity;
        self.capacity *= 2;
        self.slots.resize(self.capacity, None);
        self.allocated.resize(self.capacity, false);
        self.free_list.extend((old as u32..self.capacity as u32).rev());
        self.resized = true;

        log::info!("Atlas grown from {} to {} slots", old, self.capacity);
    }
}

impl Default for SlotAtlas {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Atlas for SlotAtlas {
    fn allocate(&mut self) -> AtlasSlot {
        if self.free_list.is_empty() {
            self.grow();
        }

        // grow() always refills the free list
        let index = self.free_list.pop().unwrap_or(self.capacity as u32 - 1);
        self.allocated[index as usize] = true;

        AtlasSlot {
            index,
            epoch: self.epoch,
        }
    }

    fn free(&mut self, slot: AtlasSlot) {
        if slot.epoch != self.epoch {
            log::debug!(
                "Ignoring slot {} from atlas epoch {} (now {})",
                slot.index,
                slot.epoch,
                self.epoch
            );
            return;
        }

        let index = slot.index as usize;

        if !self.allocated.get(index).copied().unwrap_or(false) {
            log::warn!("Freeing unallocated atlas slot {}", index);
            return;
        }

        self.allocated[index] = false;
        self.slots[index] = None;
        self.free_list.push(slot.index);
        self.frees += 1;
    }

    fn owns(&self, slot: &AtlasSlot) -> bool {
        slot.epoch == self.epoch && self.allocated.get(slot.index as usize).copied().unwrap_or(false)
    }

    fn write(&mut self, pattern: &Pattern, random_source: &RandomSource) {
        let Some(slot) = pattern.slot().filter(|slot| slot.epoch == self.epoch) else {
            return;
        };

        if let Some(contents) = self.slots.get_mut(slot.index as usize) {
            *contents = Some(SlotContents {
                layers: pattern.layers.len(),
                seed: random_source.seed(),
            });
            self.writes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_free() {
        let mut atlas = SlotAtlas::new(2);
        let a = atlas.allocate();
        let b = atlas.allocate();
        assert_ne!(a.index(), b.index());
        assert_eq!(atlas.in_use(), 2);

        atlas.free(a);
        assert_eq!(atlas.in_use(), 1);
        assert_eq!(atlas.frees(), 1);

        let c = atlas.allocate();
        assert_ne!(c.index(), b.index());
        assert!(!atlas.take_resized());
    }

    #[test]
    fn test_grows_when_full() {
        let mut atlas = SlotAtlas::new(1);
        let _a = atlas.allocate();
        let b = atlas.allocate();
        assert_eq!(atlas.capacity(), 2);
        assert_eq!(b.index(), 1);
        assert!(atlas.take_resized());
        assert!(!atlas.take_resized());
    }

    #[test]
    fn test_successor_ignores_stale_slots() {
        let mut old = SlotAtlas::new(2);
        let stale = old.allocate();

        let mut atlas = old.successor(2);
        let live = atlas.allocate();
        assert_eq!(stale.index(), live.index());
        assert!(!atlas.owns(&stale));
        assert!(atlas.owns(&live));

        atlas.free(stale);
        assert_eq!(atlas.in_use(), 1);
        assert_eq!(atlas.frees(), 0);
    }
}
