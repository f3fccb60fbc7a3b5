//! Generation-checked handle table.
//!
//! Values handed to native code are registered here and the native side only
//! ever sees an [`OpaqueContext`]: a slot index plus the slot's generation.
//! Removing a value bumps the slot generation, so a handle that outlived its
//! value (a duplicate terminal callback, a stray notification) resolves to
//! nothing instead of aliasing whatever reuses the slot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle passed through the native layer as callback user data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpaqueContext(u64);

impl OpaqueContext {
    fn new(index: u32, generation: u32) -> Self {
        Self((u64::from(generation) << 32) | u64::from(index))
    }

    fn index(self) -> usize {
        (self.0 & 0xFFFF_FFFF) as usize
    }

    fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// The value as it travels through a native `void *` user-data slot.
    pub fn as_raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<Arc<T>>,
}

#[derive(Debug)]
struct Slots<T> {
    entries: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

/// Arena of live values addressed by [`OpaqueContext`].
#[derive(Debug)]
pub struct HandleTable<T> {
    slots: Mutex<Slots<T>>,
    limit: u32,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleTable<T> {
    pub const fn new() -> Self {
        Self::bounded(u32::MAX)
    }

    /// A table that holds at most `limit` live values.
    pub const fn bounded(limit: u32) -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: Vec::new(),
                free: Vec::new(),
                live: 0,
            }),
            limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots<T>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a value and return the handle that addresses it.
    ///
    /// Returns `None` when the table is full.
    pub fn insert(&self, value: Arc<T>) -> Option<OpaqueContext> {
        let mut slots = self.lock();

        if let Some(index) = slots.free.pop() {
            slots.live += 1;
            let slot = &mut slots.entries[index as usize];
            slot.value = Some(value);
            return Some(OpaqueContext::new(index, slot.generation));
        }

        let index = u32::try_from(slots.entries.len())
            .ok()
            .filter(|&index| index < self.limit)?;
        slots.live += 1;
        // Generation 0 is never issued, so a zeroed user-data pointer never resolves.
        slots.entries.push(Slot {
            generation: 1,
            value: Some(value),
        });
        Some(OpaqueContext::new(index, 1))
    }

    /// Look up a live value. Stale or unknown handles yield `None`.
    pub fn get(&self, handle: OpaqueContext) -> Option<Arc<T>> {
        let slots = self.lock();
        slots
            .entries
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.clone())
    }

    /// Release a value, invalidating every copy of `handle`.
    ///
    /// Returns `None` if the handle was already released.
    pub fn remove(&self, handle: OpaqueContext) -> Option<Arc<T>> {
        let mut slots = self.lock();
        let slot = slots
            .entries
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())?;
        let value = slot.value.take()?;

        slot.generation = match slot.generation.wrapping_add(1) {
            0 => 1,
            next => next,
        };
        slots.free.push(handle.index() as u32);
        slots.live -= 1;
        Some(value)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.lock().live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
