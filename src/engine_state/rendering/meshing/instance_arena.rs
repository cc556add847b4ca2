//! Fixed-capacity storage for per-chunk placement transforms.
//!
//! Every loaded chunk that is drawn gets a slot holding its model matrix. Slots are
//! preallocated up front and recycled through a free list, so the transform table never
//! grows while the world streams and can be mirrored 1:1 into a storage buffer.

use std::collections::{HashMap, VecDeque};

use cgmath::{Matrix4, SquareMatrix};

use crate::engine_state::voxels::chunk::ChunkCoord;

/// Slot allocator mapping chunk coordinates to transform indices.
pub struct InstanceArena {
    transforms: Vec<Matrix4<f32>>,
    free_slots: VecDeque<u32>,
    slot_by_chunk: HashMap<ChunkCoord, u32>,
}

impl InstanceArena {
    /// Creates an arena with `capacity` slots, all free.
    pub fn new(capacity: usize) -> Self {
        Self {
            transforms: vec![Matrix4::identity(); capacity],
            free_slots: (0..capacity as u32).collect(),
            slot_by_chunk: HashMap::with_capacity(capacity),
        }
    }

    /// Assigns a slot to `coord` and stores `transform` in it.
    ///
    /// A chunk that already holds a slot keeps it and has its transform overwritten.
    ///
    /// # Returns
    /// The slot index, or `None` when every slot is taken.
    pub fn allocate(&mut self, coord: ChunkCoord, transform: Matrix4<f32>) -> Option<u32> {
        let slot = match self.slot_by_chunk.get(&coord) {
            Some(&slot) => slot,
            None => {
                let slot = self.free_slots.pop_front()?;
                self.slot_by_chunk.insert(coord, slot);
                slot
            }
        };
        self.transforms[slot as usize] = transform;
        Some(slot)
    }

    /// Returns the slot of `coord` to the free list.
    ///
    /// # Returns
    /// The slot that was freed, if `coord` had one.
    pub fn release(&mut self, coord: ChunkCoord) -> Option<u32> {
        let slot = self.slot_by_chunk.remove(&coord)?;
        self.transforms[slot as usize] = Matrix4::identity();
        self.free_slots.push_back(slot);
        Some(slot)
    }

    /// Slot currently held by `coord`.
    pub fn slot_of(&self, coord: ChunkCoord) -> Option<u32> {
        self.slot_by_chunk.get(&coord).copied()
    }

    /// Transform stored in `slot`.
    pub fn transform(&self, slot: u32) -> Option<&Matrix4<f32>> {
        self.transforms.get(slot as usize)
    }

    /// The whole transform table, indexed by slot.
    pub fn transforms(&self) -> &[Matrix4<f32>] {
        &self.transforms
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.transforms.len()
    }

    /// Slots in use.
    pub fn len(&self) -> usize {
        self.slot_by_chunk.len()
    }

    /// Whether no slot is in use.
    pub fn is_empty(&self) -> bool {
        self.slot_by_chunk.is_empty()
    }

    /// Whether another chunk could be given a slot.
    pub fn can_allocate(&self) -> bool {
        !self.free_slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point2, Vector3};

    fn translation(x: f32) -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::new(x, 0.0, 0.0))
    }

    #[test]
    fn allocation_stops_at_capacity() {
        let mut arena = InstanceArena::new(2);
        assert_eq!(arena.allocate(Point2::new(0, 0), translation(0.0)), Some(0));
        assert_eq!(arena.allocate(Point2::new(1, 0), translation(16.0)), Some(1));
        assert_eq!(arena.allocate(Point2::new(2, 0), translation(32.0)), None);
        assert!(!arena.can_allocate());
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn released_slots_are_reused() {
        let mut arena = InstanceArena::new(2);
        arena.allocate(Point2::new(0, 0), translation(0.0));
        arena.allocate(Point2::new(1, 0), translation(16.0));

        assert_eq!(arena.release(Point2::new(0, 0)), Some(0));
        assert_eq!(arena.slot_of(Point2::new(0, 0)), None);
        assert_eq!(arena.allocate(Point2::new(5, 5), translation(80.0)), Some(0));
        assert_eq!(arena.transform(0), Some(&translation(80.0)));
    }

    #[test]
    fn reallocating_keeps_the_slot() {
        let mut arena = InstanceArena::new(4);
        let coord = Point2::new(-3, 2);
        let first = arena.allocate(coord, translation(1.0));
        let second = arena.allocate(coord, translation(2.0));
        assert_eq!(first, second);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.transform(first.unwrap()), Some(&translation(2.0)));
    }

    #[test]
    fn releasing_unknown_chunk_is_a_no_op() {
        let mut arena = InstanceArena::new(1);
        assert_eq!(arena.release(Point2::new(9, 9)), None);
        assert!(arena.is_empty());
        assert_eq!(arena.capacity(), 1);
    }
}
