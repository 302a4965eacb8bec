//! Slot storage for a changing population of swarms.
//!
//! Ids stay valid until their swarm is removed; removing or inserting never
//! moves another swarm. A removed id never resolves again, even after its slot
//! is reused.

use slotmap::{new_key_type, SlotMap};

use crate::swarm::Swarm;

new_key_type! {
    /// Generational handle of a live swarm.
    pub struct SwarmId;
}

#[derive(Debug, Default)]
pub struct SwarmArena {
    slots: SlotMap<SwarmId, Swarm>,
}

impl SwarmArena {
    pub fn new() -> Self { Self { slots: SlotMap::with_key() } }

    pub fn with_capacity(capacity: usize) -> Self { Self { slots: SlotMap::with_capacity_and_key(capacity) } }

    pub fn len(&self) -> usize { self.slots.len() }
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    pub fn insert(&mut self, swarm: Swarm) -> SwarmId { self.slots.insert(swarm) }
    pub fn remove(&mut self, id: SwarmId) -> Option<Swarm> { self.slots.remove(id) }
    pub fn contains(&self, id: SwarmId) -> bool { self.slots.contains_key(id) }

    pub fn get(&self, id: SwarmId) -> Option<&Swarm> { self.slots.get(id) }
    pub fn get_mut(&mut self, id: SwarmId) -> Option<&mut Swarm> { self.slots.get_mut(id) }

    /// Live ids in slot order.
    pub fn ids(&self) -> Vec<SwarmId> { self.slots.keys().collect() }

    /// Slot order; exclusion ties resolve against it.
    pub fn iter(&self) -> impl Iterator<Item = (SwarmId, &Swarm)> { self.slots.iter() }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SwarmId, &mut Swarm)> { self.slots.iter_mut() }
    pub fn swarms_mut(&mut self) -> impl Iterator<Item = &mut Swarm> { self.slots.values_mut() }
}
