//! Actor registry
//!
//! A generational slot arena that owns every live actor, plus one ordered
//! membership list per capability (update, render, collide) and per concrete
//! kind. Lists are kept in insertion order; first-match queries depend on it.
//!
//! Removal is two-phase. [`Registry::destroy`] marks an actor doomed: it drops
//! out of every query and iteration at once, but its slot and list entries
//! survive until [`Registry::flush`] runs between update passes. A handle to
//! a flushed actor never resolves again, even after its slot is reused.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::error::RegistryError;

use super::message::{Message, MessageHandler};

/// Handle to an actor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId {
    index: u32,
    generation: u32,
}

impl ActorId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

const CAPABILITY_COUNT: usize = 3;

/// Capability an actor registers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Update,
    Render,
    Collide,
}

impl Capability {
    pub const ALL: [Capability; CAPABILITY_COUNT] =
        [Capability::Update, Capability::Render, Capability::Collide];

    const fn bit(self) -> u8 {
        1 << self as u8
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Bitset of capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);

    pub const fn with(self, capability: Capability) -> Self {
        Capabilities(self.0 | capability.bit())
    }

    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }
}

/// Anything the registry can hold
pub trait Tracked {
    type Kind: Copy + Ord + Debug;

    fn kind(&self) -> Self::Kind;
    fn capabilities(&self) -> Capabilities;
}

struct Entry<T: Tracked> {
    /// `None` while the actor is checked out for its own update
    value: Option<T>,
    kind: T::Kind,
    capabilities: Capabilities,
    doomed: bool,
}

struct Slot<T: Tracked> {
    generation: u32,
    entry: Option<Entry<T>>,
}

pub struct Registry<T: Tracked> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    sets: [Vec<ActorId>; CAPABILITY_COUNT],
    kinds: BTreeMap<T::Kind, Vec<ActorId>>,
    doomed: Vec<ActorId>,
    occupied: usize,
    limit: Option<usize>,
}

impl<T: Tracked> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Tracked> Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("occupied", &self.occupied)
            .field("doomed", &self.doomed.len())
            .field("limit", &self.limit)
            .finish()
    }
}

impl<T: Tracked> Registry<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            sets: Default::default(),
            kinds: BTreeMap::new(),
            doomed: Vec::new(),
            occupied: 0,
            limit: None,
        }
    }

    /// Registry that refuses to hold more than `limit` actors at once
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::new()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Register a new actor in every set its capabilities name.
    ///
    /// Doomed actors still hold their slot until the next flush and count
    /// against the limit.
    pub fn spawn(&mut self, value: T) -> Result<ActorId, RegistryError> {
        if let Some(limit) = self.limit {
            if self.occupied >= limit {
                log::warn!("Actor limit {limit} reached, refusing {:?}", value.kind());
                return Err(RegistryError::CapacityExhausted { limit });
            }
        }

        let kind = value.kind();
        let capabilities = value.capabilities();
        let entry = Entry {
            value: Some(value),
            kind,
            capabilities,
            doomed: false,
        };

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                ActorId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                ActorId {
                    index,
                    generation: 0,
                }
            }
        };

        for capability in Capability::ALL {
            if capabilities.contains(capability) {
                self.sets[capability.slot()].push(id);
            }
        }
        self.kinds.entry(kind).or_default().push(id);
        self.occupied += 1;

        log::debug!("Spawned {kind:?} as {id:?}");
        Ok(id)
    }

    fn entry(&self, id: ActorId) -> Option<&Entry<T>> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: ActorId) -> Option<&mut Entry<T>> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Whether `id` names an actor that has not been destroyed
    pub fn is_alive(&self, id: ActorId) -> bool {
        self.entry(id).is_some_and(|e| !e.doomed)
    }

    /// Live actor by handle; `None` if destroyed or checked out
    pub fn get(&self, id: ActorId) -> Option<&T> {
        self.entry(id)
            .filter(|e| !e.doomed)
            .and_then(|e| e.value.as_ref())
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut T> {
        self.entry_mut(id)
            .filter(|e| !e.doomed)
            .and_then(|e| e.value.as_mut())
    }

    /// Mark an actor for removal at the next flush.
    ///
    /// Destroying a handle twice is a logic error.
    pub fn destroy(&mut self, id: ActorId) -> bool {
        match self.entry_mut(id) {
            Some(entry) if !entry.doomed => {
                entry.doomed = true;
                log::debug!("Destroying {:?} {id:?}", entry.kind);
                self.doomed.push(id);
                true
            }
            _ => {
                debug_assert!(false, "destroy of stale actor handle {id:?}");
                log::warn!("Ignoring destroy of stale actor handle {id:?}");
                false
            }
        }
    }

    /// Remove every doomed actor, dropping its value. Returns how many went.
    pub fn flush(&mut self) -> usize {
        if self.doomed.is_empty() {
            return 0;
        }

        let doomed = std::mem::take(&mut self.doomed);
        for id in &doomed {
            let slot = &mut self.slots[id.index()];
            if slot.generation == id.generation && slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                self.occupied -= 1;
            }
        }

        let slots = &self.slots;
        let resolves = |id: &ActorId| {
            let slot = &slots[id.index()];
            slot.generation == id.generation && slot.entry.is_some()
        };
        for set in &mut self.sets {
            set.retain(resolves);
        }
        for set in self.kinds.values_mut() {
            set.retain(resolves);
        }
        self.kinds.retain(|_, set| !set.is_empty());

        let removed = doomed.len();
        // Keep the allocation for the next frame
        self.doomed = doomed;
        self.doomed.clear();
        removed
    }

    /// Destroy and flush everything. Returns how many actors were removed.
    pub fn clear(&mut self) -> usize {
        for slot in &mut self.slots {
            if let Some(entry) = slot.entry.as_mut() {
                entry.doomed = true;
            }
        }
        self.doomed = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.entry.is_some())
            .map(|(index, slot)| ActorId {
                index: index as u32,
                generation: slot.generation,
            })
            .collect();
        self.flush()
    }

    /// Take an actor out of its slot so it can update with mutable access
    /// to the rest of the registry. It is invisible to every query until
    /// [`Registry::restore`] puts it back.
    pub fn checkout(&mut self, id: ActorId) -> Option<T> {
        self.entry_mut(id)
            .filter(|e| !e.doomed)
            .and_then(|e| e.value.take())
    }

    /// Return a checked-out actor. Drops it if the slot is gone.
    pub fn restore(&mut self, id: ActorId, value: T) {
        match self.entry_mut(id) {
            Some(entry) => entry.value = Some(value),
            None => log::warn!("Dropping actor restored to stale handle {id:?}"),
        }
    }

    /// Copy a capability list into `out`, replacing its contents.
    ///
    /// Update passes walk this snapshot so actors spawned mid-pass wait
    /// for the next frame.
    pub fn snapshot_into(&self, capability: Capability, out: &mut Vec<ActorId>) {
        out.clear();
        out.extend(
            self.sets[capability.slot()]
                .iter()
                .copied()
                .filter(|id| self.is_alive(*id)),
        );
    }

    /// Live members of a capability set in insertion order
    pub fn iter(&self, capability: Capability) -> impl Iterator<Item = (ActorId, &T)> + '_ {
        self.sets[capability.slot()]
            .iter()
            .filter_map(move |id| self.get(*id).map(|actor| (*id, actor)))
    }

    /// Live actors of one kind in insertion order
    pub fn iter_kind(&self, kind: T::Kind) -> impl Iterator<Item = (ActorId, &T)> + '_ {
        self.kinds
            .get(&kind)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.get(*id).map(|actor| (*id, actor)))
    }

    /// First live member of a capability set matching `predicate`
    pub fn first_matching(
        &self,
        capability: Capability,
        mut predicate: impl FnMut(&T) -> bool,
    ) -> Option<ActorId> {
        self.iter(capability)
            .find(|&(_, actor)| predicate(actor))
            .map(|(id, _)| id)
    }

    /// First live actor of a kind matching `predicate`
    pub fn first_matching_kind(
        &self,
        kind: T::Kind,
        mut predicate: impl FnMut(&T) -> bool,
    ) -> Option<ActorId> {
        self.iter_kind(kind)
            .find(|&(_, actor)| predicate(actor))
            .map(|(id, _)| id)
    }

    /// Live members of a capability set
    pub fn count(&self, capability: Capability) -> usize {
        self.iter(capability).count()
    }

    /// Occupied slots, doomed actors included until flushed
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Capabilities an actor was registered with
    pub fn capabilities_of(&self, id: ActorId) -> Option<Capabilities> {
        self.entry(id).map(|e| e.capabilities)
    }
}

impl<T: Tracked + MessageHandler> Registry<T> {
    /// Deliver a message synchronously. Returns `false` if nobody received it.
    pub fn send(&mut self, id: ActorId, message: &mut Message) -> bool {
        match self.get_mut(id) {
            Some(actor) => {
                actor.handle(message);
                true
            }
            None => false,
        }
    }

    /// Ask an actor which controller owns it
    pub fn query_controller(&mut self, id: ActorId) -> Option<u8> {
        let mut message = Message::query_controller();
        self.send(id, &mut message);
        message.answered_controller()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum TestKind {
        Mover,
        Wall,
    }

    #[derive(Debug)]
    struct Dummy {
        kind: TestKind,
        tag: u32,
        hits: i16,
    }

    impl Dummy {
        fn mover(tag: u32) -> Self {
            Self {
                kind: TestKind::Mover,
                tag,
                hits: 0,
            }
        }

        fn wall(tag: u32) -> Self {
            Self {
                kind: TestKind::Wall,
                tag,
                hits: 0,
            }
        }
    }

    impl Tracked for Dummy {
        type Kind = TestKind;

        fn kind(&self) -> TestKind {
            self.kind
        }

        fn capabilities(&self) -> Capabilities {
            match self.kind {
                TestKind::Mover => Capabilities::NONE
                    .with(Capability::Update)
                    .with(Capability::Collide),
                TestKind::Wall => Capabilities::NONE.with(Capability::Collide),
            }
        }
    }

    impl MessageHandler for Dummy {
        fn handle(&mut self, message: &mut Message) {
            match message {
                Message::Damage(amount) => self.hits += *amount,
                Message::QueryController(query) => {
                    query.handled = true;
                    query.controller = self.tag as u8;
                }
                Message::Pickup(_) => {}
            }
        }
    }

    #[test]
    fn test_spawn_registers_capabilities() {
        let mut registry = Registry::new();
        let mover = registry.spawn(Dummy::mover(1)).unwrap();
        let wall = registry.spawn(Dummy::wall(2)).unwrap();

        assert_eq!(registry.count(Capability::Update), 1);
        assert_eq!(registry.count(Capability::Collide), 2);
        assert_eq!(registry.count(Capability::Render), 0);
        assert_eq!(registry.iter_kind(TestKind::Wall).count(), 1);
        assert!(registry.capabilities_of(mover).unwrap().contains(Capability::Update));
        assert!(!registry.capabilities_of(wall).unwrap().contains(Capability::Update));
    }

    #[test]
    fn test_destroy_hides_immediately_and_flush_removes() {
        let mut registry = Registry::new();
        let a = registry.spawn(Dummy::mover(1)).unwrap();
        let b = registry.spawn(Dummy::mover(2)).unwrap();

        assert!(registry.destroy(a));
        assert!(!registry.is_alive(a));
        assert!(registry.get(a).is_none());
        assert_eq!(registry.count(Capability::Update), 1);
        // slot still held until flush
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.flush(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.is_alive(b));
    }

    #[test]
    fn test_stale_handle_never_resolves_after_reuse() {
        let mut registry = Registry::new();
        let old = registry.spawn(Dummy::mover(1)).unwrap();
        registry.destroy(old);
        registry.flush();

        let new = registry.spawn(Dummy::mover(2)).unwrap();
        assert_eq!(old.index(), new.index());
        assert!(registry.get(old).is_none());
        assert_eq!(registry.get(new).unwrap().tag, 2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "stale actor handle")]
    fn test_double_destroy_asserts() {
        let mut registry = Registry::new();
        let id = registry.spawn(Dummy::mover(1)).unwrap();
        registry.destroy(id);
        registry.destroy(id);
    }

    #[test]
    fn test_iteration_survives_mid_pass_destroy() {
        let mut registry = Registry::new();
        let ids: Vec<_> = (0..5).map(|t| registry.spawn(Dummy::mover(t)).unwrap()).collect();

        let mut order = Vec::new();
        registry.snapshot_into(Capability::Update, &mut order);
        let mut visited = Vec::new();
        for id in order {
            let Some(actor) = registry.get(id) else {
                continue;
            };
            visited.push(actor.tag);
            // Every actor destroys its successor
            if let Some(next) = ids.get(id.index() + 1) {
                if registry.is_alive(*next) {
                    registry.destroy(*next);
                }
            }
        }
        registry.flush();

        assert_eq!(visited, vec![0, 2, 4]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_checkout_hides_actor_from_queries() {
        let mut registry = Registry::new();
        let a = registry.spawn(Dummy::mover(1)).unwrap();
        let b = registry.spawn(Dummy::mover(2)).unwrap();

        let actor = registry.checkout(a).unwrap();
        assert_eq!(
            registry.first_matching(Capability::Collide, |_| true),
            Some(b)
        );
        assert!(!registry.send(a, &mut Message::Damage(1)));
        registry.restore(a, actor);
        assert_eq!(
            registry.first_matching(Capability::Collide, |_| true),
            Some(a)
        );
    }

    #[test]
    fn test_capacity_limit() {
        let mut registry = Registry::with_limit(Some(2));
        let a = registry.spawn(Dummy::mover(1)).unwrap();
        registry.spawn(Dummy::mover(2)).unwrap();
        assert_eq!(
            registry.spawn(Dummy::mover(3)).unwrap_err(),
            RegistryError::CapacityExhausted { limit: 2 }
        );

        registry.destroy(a);
        // doomed actors still count until flushed
        assert!(registry.spawn(Dummy::mover(3)).is_err());
        registry.flush();
        assert!(registry.spawn(Dummy::mover(3)).is_ok());
    }

    #[test]
    fn test_send_and_query() {
        let mut registry = Registry::new();
        let id = registry.spawn(Dummy::wall(7)).unwrap();
        assert!(registry.send(id, &mut Message::Damage(3)));
        assert_eq!(registry.get(id).unwrap().hits, 3);
        assert_eq!(registry.query_controller(id), Some(7));
    }

    #[test]
    fn test_clear() {
        let mut registry = Registry::new();
        for t in 0..4 {
            registry.spawn(Dummy::wall(t)).unwrap();
        }
        assert_eq!(registry.clear(), 4);
        assert!(registry.is_empty());
        assert_eq!(registry.count(Capability::Collide), 0);
    }

    proptest! {
        #[test]
        fn first_match_finds_unique_member(count in 1usize..40, pick in 0usize..40) {
            let pick = pick % count;
            let mut registry = Registry::new();
            let ids: Vec<_> = (0..count)
                .map(|t| registry.spawn(Dummy::wall(t as u32)).unwrap())
                .collect();
            let found = registry.first_matching(Capability::Collide, |d| d.tag == pick as u32);
            prop_assert_eq!(found, Some(ids[pick]));
        }

        #[test]
        fn first_match_returns_earliest(count in 2usize..40, first in 0usize..40) {
            let first = first % (count - 1);
            let mut registry = Registry::new();
            let ids: Vec<_> = (0..count)
                .map(|t| registry.spawn(Dummy::wall(t as u32)).unwrap())
                .collect();
            let found = registry.first_matching(Capability::Collide, |d| d.tag as usize >= first);
            prop_assert_eq!(found, Some(ids[first]));
        }
    }
}
