//! Per-kind tables of root entities and the handles that address them.
//!
//! A [`RootArray`] owns its entities in a dense vector. Each slot has an
//! identity cell holding the slot's current index; a [`Handle`] shares that
//! cell, so it keeps reporting the right index after garbage collection moves
//! the entity, and reports [`DEAD`] once the entity is gone.
//!
//! The number of live handles to a slot doubles as its reference count: the
//! table holds one, and every cross-reference field or caller-held handle adds
//! one. [`RootArray::garbage_collect`] removes slots that only the table
//! still refers to.

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use crate::object::RootObject;
use crate::update_seq::UpdateSeq;

/// Index reported by a handle whose entity has been removed.
pub const DEAD: usize = usize::MAX;

/// A shared reference to an entity in a [`RootArray`].
pub struct Handle<T> {
    id: Rc<Cell<usize>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Current index of the entity in its table, or [`DEAD`].
    pub fn index(&self) -> usize {
        self.id.get()
    }

    pub fn is_live(&self) -> bool {
        self.id.get() != DEAD
    }

    /// Returns an identity that does not keep the entity alive.
    pub fn downgrade(&self) -> WeakHandle<T> {
        WeakHandle {
            id: Rc::downgrade(&self.id),
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Handle {
            id: Rc::clone(&self.id),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.id, &other.id)
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.id) as usize).hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_live() {
            write!(f, "Handle(#{})", self.index())
        } else {
            f.write_str("Handle(dead)")
        }
    }
}

/// An entity identity that does not count as a reference.
///
/// Used as a cache key by consumers that must not keep entities from being
/// garbage collected.
pub struct WeakHandle<T> {
    id: Weak<Cell<usize>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> WeakHandle<T> {
    pub fn upgrade(&self) -> Option<Handle<T>> {
        let id = self.id.upgrade()?;
        if id.get() == DEAD {
            return None;
        }
        Some(Handle {
            id,
            _marker: PhantomData,
        })
    }

    pub fn is_live(&self) -> bool {
        self.id.upgrade().map_or(false, |id| id.get() != DEAD)
    }
}

impl<T> Clone for WeakHandle<T> {
    fn clone(&self) -> Self {
        WeakHandle {
            id: Weak::clone(&self.id),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for WeakHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.id, &other.id)
    }
}

impl<T> Eq for WeakHandle<T> {}

impl<T> Hash for WeakHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Weak::as_ptr(&self.id) as usize).hash(state);
    }
}

impl<T> fmt::Debug for WeakHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id.upgrade() {
            Some(id) if id.get() != DEAD => write!(f, "WeakHandle(#{})", id.get()),
            _ => f.write_str("WeakHandle(dead)"),
        }
    }
}

struct Slot<T> {
    id: Rc<Cell<usize>>,
    modified: UpdateSeq,
    object: T,
}

/// A dense, index-addressable table of root entities of one kind.
pub struct RootArray<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Default for RootArray<T> {
    fn default() -> Self {
        RootArray { slots: Vec::new() }
    }
}

impl<T> fmt::Debug for RootArray<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.slots.iter().map(|s| &s.object)).finish()
    }
}

impl<T: Default> RootArray<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns a handle to the entity at `index`, first growing the table with
    /// default-constructed placeholders if it is not that large yet.
    pub fn resolve_or_create(&mut self, index: usize) -> Handle<T> {
        while self.slots.len() <= index {
            let next = self.slots.len();
            self.slots.push(Slot {
                id: Rc::new(Cell::new(next)),
                modified: UpdateSeq::next(),
                object: T::default(),
            });
        }
        self.handle_of(index)
    }

    /// Appends `object` and returns a handle to it.
    pub fn push(&mut self, object: T) -> Handle<T> {
        let index = self.slots.len();
        self.slots.push(Slot {
            id: Rc::new(Cell::new(index)),
            modified: UpdateSeq::next(),
            object,
        });
        self.handle_of(index)
    }

    pub fn handle(&self, index: usize) -> Option<Handle<T>> {
        (index < self.slots.len()).then(|| self.handle_of(index))
    }

    fn handle_of(&self, index: usize) -> Handle<T> {
        Handle {
            id: Rc::clone(&self.slots[index].id),
            _marker: PhantomData,
        }
    }

    fn slot(&self, handle: &Handle<T>) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index())
            .filter(|slot| Rc::ptr_eq(&slot.id, &handle.id))
    }

    fn slot_mut(&mut self, handle: &Handle<T>) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| Rc::ptr_eq(&slot.id, &handle.id))
    }

    /// Returns the entity, or `None` if the handle belongs to another table
    /// or its entity has been removed.
    pub fn get(&self, handle: &Handle<T>) -> Option<&T> {
        self.slot(handle).map(|slot| &slot.object)
    }

    /// Mutable access; stamps the entity as modified.
    pub fn get_mut(&mut self, handle: &Handle<T>) -> Option<&mut T> {
        self.slot_mut(handle).map(|slot| {
            slot.modified = UpdateSeq::next();
            &mut slot.object
        })
    }

    pub fn at(&self, index: usize) -> Option<&T> {
        self.slots.get(index).map(|slot| &slot.object)
    }

    /// Mutable access by index; stamps the entity as modified.
    pub fn at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).map(|slot| {
            slot.modified = UpdateSeq::next();
            &mut slot.object
        })
    }

    /// The entity's modification stamp.
    pub fn modified(&self, handle: &Handle<T>) -> Option<UpdateSeq> {
        self.slot(handle).map(|slot| slot.modified)
    }

    /// Marks the entity as modified without otherwise changing it.
    pub fn touch(&mut self, handle: &Handle<T>) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.modified = UpdateSeq::next();
        }
    }

    /// Number of references to the entity at `index` other than the table's
    /// own.
    pub fn external_refs(&self, index: usize) -> usize {
        self.slots
            .get(index)
            .map_or(0, |slot| Rc::strong_count(&slot.id) - 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().map(|slot| &slot.object)
    }

    pub fn handles(&self) -> impl Iterator<Item = Handle<T>> + '_ {
        (0..self.slots.len()).map(|i| self.handle_of(i))
    }

    /// Removes every entity; outstanding handles become dead.
    pub fn clear(&mut self) {
        for slot in &self.slots {
            slot.id.set(DEAD);
        }
        self.slots.clear();
    }

    /// Removes entities that nothing outside the table refers to, compacts
    /// the survivors in their original order and reassigns their indices.
    /// Returns the number of entities removed.
    pub fn garbage_collect(&mut self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|slot| {
            let referenced = Rc::strong_count(&slot.id) > 1;
            if !referenced {
                slot.id.set(DEAD);
            }
            referenced
        });
        for (index, slot) in self.slots.iter().enumerate() {
            slot.id.set(index);
        }
        before - self.slots.len()
    }

    /// Detaches the entity at `index` so it can be parsed into while the rest
    /// of the document stays accessible. The slot keeps its identity.
    pub(crate) fn take(&mut self, index: usize) -> T {
        std::mem::take(&mut self.slots[index].object)
    }

    /// Puts back an entity detached with [`RootArray::take`], stamping it.
    pub(crate) fn restore(&mut self, index: usize, object: T) {
        let slot = &mut self.slots[index];
        slot.object = object;
        slot.modified = UpdateSeq::next();
    }
}

impl<T: RootObject> RootArray<T> {
    /// Appends a new default entity with the given name.
    pub fn create(&mut self, name: impl Into<String>) -> Handle<T> {
        let mut object = T::default();
        object.set_name(name.into());
        self.push(object)
    }
}
