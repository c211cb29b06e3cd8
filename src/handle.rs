//! Generation-tagged handles and the slot table that issues them.
//!
//! A [`Handle`] packs `(generation, index, kind)` into a strictly positive `i64` so it can
//! cross the native boundary as a plain integer:
//!
//! ```text
//! bit 63      62..32        31..1     0
//!   0    |  generation  |  index  | kind
//! ```
//!
//! Releasing a value bumps its slot's generation, so every handle that pointed at it is
//! rejected afterwards even when the slot has been reused.

use std::fmt;

/// Raw value returned across the boundary when no handle could be issued.
pub const INVALID_HANDLE: i64 = 0;

const MAX_INDEX: u32 = i32::MAX as u32;
const MAX_GENERATION: u32 = i32::MAX as u32;

/// Which codec namespace a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    /// Encoder instances.
    Encoder,
    /// Decoder instances.
    Decoder,
}

impl CodecKind {
    const fn bit(self) -> i64 {
        match self {
            Self::Encoder => 0,
            Self::Decoder => 1,
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoder => f.write_str("encoder"),
            Self::Decoder => f.write_str("decoder"),
        }
    }
}

/// Reference to a live codec instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    kind: CodecKind,
    index: u32,
    generation: u32,
}

impl Handle {
    /// Codec namespace of this handle.
    #[must_use]
    pub const fn kind(self) -> CodecKind {
        self.kind
    }

    /// Pack into the integer form used across the native boundary.
    #[must_use]
    pub const fn to_raw(self) -> i64 {
        ((self.generation as i64) << 32) | ((self.index as i64) << 1) | self.kind.bit()
    }

    /// Unpack a raw handle. Returns `None` for the sentinel and for values no table
    /// could have issued.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        if raw <= 0 {
            return None;
        }
        let generation = (raw >> 32) as u32;
        if generation == 0 {
            return None;
        }
        let kind = if raw & 1 == 0 {
            CodecKind::Encoder
        } else {
            CodecKind::Decoder
        };
        Some(Self {
            kind,
            index: ((raw & 0xFFFF_FFFF) >> 1) as u32,
            generation,
        })
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}.{}", self.kind, self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Owned array of values addressed by generation-tagged handles.
pub(crate) struct SlotTable<T> {
    kind: CodecKind,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> SlotTable<T> {
    pub(crate) const fn new(kind: CodecKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Store `value` and return the handle that now owns it.
    ///
    /// Returns `None` once every index is occupied.
    pub(crate) fn insert(&mut self, value: T) -> Option<Handle> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = u32::try_from(self.slots.len()).ok().filter(|i| *i < MAX_INDEX)?;
                self.slots.push(Slot {
                    generation: 1,
                    value: None,
                });
                index
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.value = Some(value);
        self.len += 1;

        Some(Handle {
            kind: self.kind,
            index,
            generation: slot.generation,
        })
    }

    pub(crate) fn get(&self, handle: Handle) -> Option<&T> {
        if handle.kind != self.kind {
            return None;
        }
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Take the value out, invalidating `handle` and every copy of it.
    pub(crate) fn remove(&mut self, handle: Handle) -> Option<T> {
        if handle.kind != self.kind {
            return None;
        }
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;

        slot.generation = if slot.generation == MAX_GENERATION {
            1
        } else {
            slot.generation + 1
        };
        self.free.push(handle.index);
        self.len -= 1;

        Some(value)
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_form_round_trips_and_stays_positive() {
        let handle = Handle {
            kind: CodecKind::Decoder,
            index: MAX_INDEX - 1,
            generation: MAX_GENERATION,
        };
        let raw = handle.to_raw();
        assert!(raw > 0);
        assert_eq!(Handle::from_raw(raw), Some(handle));
    }

    #[test]
    fn sentinel_and_garbage_are_rejected() {
        assert_eq!(Handle::from_raw(INVALID_HANDLE), None);
        assert_eq!(Handle::from_raw(-17), None);
        // index bits set but generation zero
        assert_eq!(Handle::from_raw(0x0000_0000_0000_0006), None);
    }

    #[test]
    fn removed_handle_is_stale_after_slot_reuse() {
        let mut table = SlotTable::new(CodecKind::Encoder);
        let first = table.insert("a").unwrap();
        assert_eq!(table.remove(first), Some("a"));
        assert_eq!(table.remove(first), None);

        let second = table.insert("b").unwrap();
        assert_ne!(first, second);
        assert_eq!(table.get(first), None);
        assert_eq!(table.get(second), Some(&"b"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn other_kind_is_rejected() {
        let mut encoders = SlotTable::new(CodecKind::Encoder);
        let handle = encoders.insert(1u8).unwrap();
        let forged = Handle {
            kind: CodecKind::Decoder,
            ..handle
        };
        assert_eq!(encoders.get(forged), None);
        assert_eq!(encoders.remove(forged), None);
        assert_eq!(encoders.len(), 1);
    }

    #[test]
    fn generation_wraps_without_reaching_zero() {
        let mut table = SlotTable::new(CodecKind::Encoder);
        let handle = table.insert(()).unwrap();
        table.slots[0].generation = MAX_GENERATION;
        let aged = Handle {
            generation: MAX_GENERATION,
            ..handle
        };
        table.remove(aged).unwrap();
        let next = table.insert(()).unwrap();
        assert_eq!(next.generation, 1);
    }
}
