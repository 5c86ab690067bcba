use crate::core::{BodyHandle, ConnectorHandle};
use crate::error::PhysicsError;
use crate::Result;

/// Generic storage trait for physics objects
pub trait Storage<T, H> {
    /// Creates a new empty storage
    fn new() -> Self;

    /// Adds an item to the storage and returns its handle
    fn add(&mut self, item: T) -> H;

    /// Gets a reference to an item by its handle
    fn get(&self, handle: H) -> Option<&T>;

    /// Gets a mutable reference to an item by its handle
    fn get_mut(&mut self, handle: H) -> Option<&mut T>;

    /// Removes an item from the storage
    fn remove(&mut self, handle: H) -> Option<T>;

    /// Returns the number of items in the storage
    fn len(&self) -> usize;

    /// Returns whether the storage is empty
    fn is_empty(&self) -> bool;

    /// Clears all items from the storage
    fn clear(&mut self);

    /// Returns all handles in ascending order
    fn handles(&self) -> Vec<H>;
}

/// Slot vector shared by the storages. Slots are never reused, so handles stay valid for the
/// life of the storage and iteration order is the order of insertion.
#[derive(Debug, Clone)]
struct Slots<T> {
    items: Vec<Option<T>>,
    count: usize,
}

impl<T> Slots<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
        }
    }

    fn add(&mut self, item: T) -> u32 {
        self.items.push(Some(item));
        self.count += 1;
        (self.items.len() - 1) as u32
    }

    fn get(&self, index: u32) -> Option<&T> {
        self.items.get(index as usize).and_then(|slot| slot.as_ref())
    }

    fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.items.get_mut(index as usize).and_then(|slot| slot.as_mut())
    }

    fn remove(&mut self, index: u32) -> Option<T> {
        let item = self.items.get_mut(index as usize).and_then(|slot| slot.take());
        if item.is_some() {
            self.count -= 1;
        }
        item
    }

    fn clear(&mut self) {
        self.items.clear();
        self.count = 0;
    }

    fn indices(&self) -> Vec<u32> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| i as u32)
            .collect()
    }
}

/// Storage for physics bodies
#[derive(Debug, Clone)]
pub struct BodyStorage<T> {
    slots: Slots<T>,
}

impl<T> Storage<T, BodyHandle> for BodyStorage<T> {
    fn new() -> Self {
        Self { slots: Slots::new() }
    }

    fn add(&mut self, item: T) -> BodyHandle {
        BodyHandle(self.slots.add(item))
    }

    fn get(&self, handle: BodyHandle) -> Option<&T> {
        self.slots.get(handle.0)
    }

    fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut T> {
        self.slots.get_mut(handle.0)
    }

    fn remove(&mut self, handle: BodyHandle) -> Option<T> {
        self.slots.remove(handle.0)
    }

    fn len(&self) -> usize {
        self.slots.count
    }

    fn is_empty(&self) -> bool {
        self.slots.count == 0
    }

    fn clear(&mut self) {
        self.slots.clear();
    }

    fn handles(&self) -> Vec<BodyHandle> {
        self.slots.indices().into_iter().map(BodyHandle).collect()
    }
}

impl<T> BodyStorage<T> {
    /// Gets a body by its handle, returning an error if not found
    pub fn get_body(&self, handle: BodyHandle) -> Result<&T> {
        self.get(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle)))
    }

    /// Gets a mutable reference to a body by its handle, returning an error if not found
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut T> {
        self.get_mut(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle)))
    }

    /// Number of slots ever handed out, removed bodies included
    pub fn slot_count(&self) -> usize {
        self.slots.items.len()
    }

    /// Iterates over live bodies in slot order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &T)> + '_ {
        self.slots.items
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (BodyHandle(i as u32), item)))
    }

    /// Iterates mutably over live bodies in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut T)> + '_ {
        self.slots.items
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|item| (BodyHandle(i as u32), item)))
    }
}

/// Storage for connectors
#[derive(Debug)]
pub struct ConnectorStorage<T> {
    slots: Slots<T>,
}

impl<T> Storage<T, ConnectorHandle> for ConnectorStorage<T> {
    fn new() -> Self {
        Self { slots: Slots::new() }
    }

    fn add(&mut self, item: T) -> ConnectorHandle {
        ConnectorHandle(self.slots.add(item))
    }

    fn get(&self, handle: ConnectorHandle) -> Option<&T> {
        self.slots.get(handle.0)
    }

    fn get_mut(&mut self, handle: ConnectorHandle) -> Option<&mut T> {
        self.slots.get_mut(handle.0)
    }

    fn remove(&mut self, handle: ConnectorHandle) -> Option<T> {
        self.slots.remove(handle.0)
    }

    fn len(&self) -> usize {
        self.slots.count
    }

    fn is_empty(&self) -> bool {
        self.slots.count == 0
    }

    fn clear(&mut self) {
        self.slots.clear();
    }

    fn handles(&self) -> Vec<ConnectorHandle> {
        self.slots.indices().into_iter().map(ConnectorHandle).collect()
    }
}

impl<T> ConnectorStorage<T> {
    /// Gets a connector by its handle, returning an error if not found
    pub fn get_connector(&self, handle: ConnectorHandle) -> Result<&T> {
        self.get(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Connector with handle {:?} not found", handle)))
    }

    /// Gets a mutable reference to a connector by its handle, returning an error if not found
    pub fn get_connector_mut(&mut self, handle: ConnectorHandle) -> Result<&mut T> {
        self.get_mut(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Connector with handle {:?} not found", handle)))
    }

    /// Iterates over live connectors in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ConnectorHandle, &T)> + '_ {
        self.slots.items
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (ConnectorHandle(i as u32), item)))
    }

    /// Iterates mutably over live connectors in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ConnectorHandle, &mut T)> + '_ {
        self.slots.items
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|item| (ConnectorHandle(i as u32), item)))
    }
}
