/// Generational arena for backend-resident resources.
use std::fmt;

/// Opaque reference to an uploaded mesh.
///
/// A handle outlives its resource only as a stale value: once the slot is
/// released or reused, lookups with the old handle fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    index: u32,
    generation: u32,
}

impl MeshHandle {
    pub fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Display for MeshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Resources indexed by [`MeshHandle`], with explicit creation and release.
pub struct ResourceTable<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> ResourceTable<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn insert(&mut self, value: T) -> MeshHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return MeshHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        MeshHandle { index, generation: 0 }
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Release the resource, invalidating every copy of `handle`.
    pub fn remove(&mut self, handle: MeshHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every resource, invalidating all outstanding handles.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
    }
}

impl<T> Default for ResourceTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut table = ResourceTable::new();
        let a = table.insert("a");
        let b = table.insert("b");
        assert_ne!(a, b);
        assert_eq!(table.get(a), Some(&"a"));
        assert_eq!(table.get(b), Some(&"b"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_reused_slot_rejects_stale_handle() {
        let mut table = ResourceTable::new();
        let old = table.insert(1);
        assert_eq!(table.remove(old), Some(1));
        assert_eq!(table.get(old), None);
        assert_eq!(table.remove(old), None);

        let new = table.insert(2);
        assert_eq!(new.index(), old.index());
        assert_eq!(table.get(old), None);
        assert_eq!(table.get(new), Some(&2));
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut table = ResourceTable::new();
        let handles: Vec<_> = (0..4).map(|i| table.insert(i)).collect();
        table.clear();
        assert!(table.is_empty());
        assert!(handles.iter().all(|&h| table.get(h).is_none()));
        let _ = table.insert(9);
        assert_eq!(table.len(), 1);
    }
}
