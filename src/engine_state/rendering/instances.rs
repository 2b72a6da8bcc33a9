//! CPU-side bookkeeping for the cube instance buffer.
//!
//! Instances live in a dense array so they can be uploaded and drawn in one call.
//! Removing an instance moves the last one into its slot, so every handle keeps a
//! record of the slot it currently occupies.

use std::collections::HashMap;

use super::{render_surface::RenderHandle, vertex::CubeInstance};

/// Dense instance storage addressed by stable handles.
#[derive(Debug, Default)]
pub struct InstanceSet {
    /// Instance data in draw order
    instances: Vec<CubeInstance>,
    /// Handle owning each slot, parallel to `instances`
    owners: Vec<RenderHandle>,
    /// Slot currently occupied by each live handle
    slots: HashMap<RenderHandle, usize>,
    next_handle: u32,
    /// Set when `instances` changed since the last upload
    dirty: bool,
}

impl InstanceSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instance and returns its handle.
    pub fn insert(&mut self, instance: CubeInstance) -> RenderHandle {
        let handle = RenderHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);

        self.slots.insert(handle, self.instances.len());
        self.instances.push(instance);
        self.owners.push(handle);
        self.dirty = true;
        handle
    }

    /// Removes the instance owned by `handle`.
    ///
    /// # Returns
    /// Whether the handle was live.
    pub fn remove(&mut self, handle: RenderHandle) -> bool {
        let Some(slot) = self.slots.remove(&handle) else {
            return false;
        };

        self.instances.swap_remove(slot);
        self.owners.swap_remove(slot);
        if let Some(moved) = self.owners.get(slot) {
            self.slots.insert(*moved, slot);
        }
        self.dirty = true;
        true
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instances are live.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Returns the instances if they changed since the last call.
    pub fn take_dirty(&mut self) -> Option<&[CubeInstance]> {
        if std::mem::take(&mut self.dirty) {
            Some(&self.instances)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::MaterialKind, grid_key::GridKey};

    fn instance(x: i32) -> CubeInstance {
        CubeInstance::new(GridKey::new(x, 0, 0), MaterialKind::Grass)
    }

    /// Instance data in draw order, as it would be uploaded next.
    fn pending_upload(set: &mut InstanceSet) -> Vec<CubeInstance> {
        set.take_dirty().map(<[CubeInstance]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn removal_moves_the_last_instance_into_the_gap() {
        let mut set = InstanceSet::new();
        let handles: Vec<_> = (0..4).map(|x| set.insert(instance(x))).collect();

        assert!(set.remove(handles[1]));

        assert_eq!(pending_upload(&mut set), vec![instance(0), instance(3), instance(2)]);
        // The moved handle can still be removed from its new slot
        assert!(set.remove(handles[3]));
        assert_eq!(pending_upload(&mut set), vec![instance(0), instance(2)]);
    }

    #[test]
    fn removing_a_dead_handle_is_a_no_op() {
        let mut set = InstanceSet::new();
        let handle = set.insert(instance(0));
        assert!(set.remove(handle));
        assert!(!set.remove(handle));
        assert!(set.is_empty());
    }

    #[test]
    fn handles_stay_valid_under_random_churn() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut set = InstanceSet::new();
        let mut live: Vec<(RenderHandle, CubeInstance)> = Vec::new();

        for step in 0..2000 {
            if live.is_empty() || rng.bool() {
                let data = instance(step);
                live.push((set.insert(data), data));
            } else {
                let (handle, _) = live.swap_remove(rng.usize(..live.len()));
                assert!(set.remove(handle));
            }
            assert_eq!(set.len(), live.len());
        }

        let mut expected: Vec<_> = live.iter().map(|(_, data)| *data).collect();
        let mut actual = pending_upload(&mut set);
        let by_offset = |a: &CubeInstance, b: &CubeInstance| {
            bytemuck::bytes_of(a).cmp(bytemuck::bytes_of(b))
        };
        expected.sort_by(by_offset);
        actual.sort_by(by_offset);
        assert_eq!(expected, actual);
    }

    #[test]
    fn dirty_flag_tracks_changes() {
        let mut set = InstanceSet::new();
        assert!(set.take_dirty().is_none());

        set.insert(instance(0));
        assert_eq!(set.take_dirty().map(|data| data.len()), Some(1));
        assert!(set.take_dirty().is_none());

        let handle = set.insert(instance(1));
        set.take_dirty();
        assert!(set.remove(handle));
        assert_eq!(set.take_dirty().map(|data| data.len()), Some(1));
    }
}
