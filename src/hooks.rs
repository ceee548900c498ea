//! Hook catalogue and subscription dispatch
//!
//! The host exposes a closed set of item/container hooks. Each hook carries
//! its own payload; the profiler only cares about the world position of the
//! entity owning the container involved, if there is one.
//!
//! Subscriptions are tracked per hook. Events for hooks nobody subscribed to
//! are dropped before they reach the session.

use crate::error::ProfilerError;
use crate::spatial::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Hooks that can be profiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HookId {
    CanAcceptItem,
    CanStackItem,
    OnItemAddedToContainer,
    OnItemSplit,
    OnMaxStackable,
}

impl HookId {
    /// Every supported hook, in allow-list order
    pub const ALL: [HookId; 5] = [
        HookId::CanAcceptItem,
        HookId::CanStackItem,
        HookId::OnItemAddedToContainer,
        HookId::OnItemSplit,
        HookId::OnMaxStackable,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HookId::CanAcceptItem => "CanAcceptItem",
            HookId::CanStackItem => "CanStackItem",
            HookId::OnItemAddedToContainer => "OnItemAddedToContainer",
            HookId::OnItemSplit => "OnItemSplit",
            HookId::OnMaxStackable => "OnMaxStackable",
        }
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HookId {
    type Err = ProfilerError;

    /// Exact, case-sensitive match against the allow-list
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookId::ALL
            .iter()
            .copied()
            .find(|hook| hook.name() == s)
            .ok_or_else(|| ProfilerError::UnknownHook(s.to_string()))
    }
}

/// An item container, optionally owned by an entity placed in the world
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ItemContainer {
    /// Position of the owning entity (`None` for player inventories and
    /// other containers without a world entity)
    pub owner_position: Option<Position>,
}

impl ItemContainer {
    /// Container owned by an entity at `position`
    pub fn at(position: Position) -> Self {
        Self {
            owner_position: Some(position),
        }
    }

    /// Container with no owning entity
    pub fn detached() -> Self {
        Self::default()
    }
}

/// An item, optionally held in a container
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Item {
    pub parent: Option<ItemContainer>,
}

impl Item {
    pub fn in_container(container: ItemContainer) -> Self {
        Self {
            parent: Some(container),
        }
    }

    /// Item not held by any container
    pub fn loose() -> Self {
        Self::default()
    }

    fn owner_position(&self) -> Option<Position> {
        self.parent.and_then(|c| c.owner_position)
    }
}

/// One firing of a hook, with that hook's arguments
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HookEvent {
    CanAcceptItem {
        container: ItemContainer,
        item: Item,
        target_slot: i32,
    },
    CanStackItem {
        host_item: Item,
        moved_item: Item,
    },
    OnItemAddedToContainer {
        container: ItemContainer,
        item: Item,
    },
    OnItemSplit {
        source_item: Item,
        amount: i32,
    },
    OnMaxStackable {
        item: Item,
    },
}

impl HookEvent {
    pub fn hook(&self) -> HookId {
        match self {
            HookEvent::CanAcceptItem { .. } => HookId::CanAcceptItem,
            HookEvent::CanStackItem { .. } => HookId::CanStackItem,
            HookEvent::OnItemAddedToContainer { .. } => HookId::OnItemAddedToContainer,
            HookEvent::OnItemSplit { .. } => HookId::OnItemSplit,
            HookEvent::OnMaxStackable { .. } => HookId::OnMaxStackable,
        }
    }

    /// Build a representative event for `hook` whose container sits at
    /// `position` (or has no owner when `position` is `None`)
    pub fn sample(hook: HookId, position: Option<Position>) -> Self {
        let container = ItemContainer {
            owner_position: position,
        };
        let item = Item::in_container(container);
        match hook {
            HookId::CanAcceptItem => HookEvent::CanAcceptItem {
                container,
                item: Item::loose(),
                target_slot: -1,
            },
            HookId::CanStackItem => HookEvent::CanStackItem {
                host_item: item,
                moved_item: Item::loose(),
            },
            HookId::OnItemAddedToContainer => HookEvent::OnItemAddedToContainer {
                container,
                item,
            },
            HookId::OnItemSplit => HookEvent::OnItemSplit {
                source_item: item,
                amount: 1,
            },
            HookId::OnMaxStackable => HookEvent::OnMaxStackable { item },
        }
    }
}

/// Pulls the spatial key out of a hook's payload
pub type PositionExtractor = fn(&HookEvent) -> Option<Position>;

fn container_of_can_accept(event: &HookEvent) -> Option<Position> {
    match event {
        HookEvent::CanAcceptItem { container, .. } => container.owner_position,
        _ => None,
    }
}

fn parent_of_host_item(event: &HookEvent) -> Option<Position> {
    match event {
        HookEvent::CanStackItem { host_item, .. } => host_item.owner_position(),
        _ => None,
    }
}

fn container_of_added(event: &HookEvent) -> Option<Position> {
    match event {
        HookEvent::OnItemAddedToContainer { container, .. } => container.owner_position,
        _ => None,
    }
}

fn parent_of_split_source(event: &HookEvent) -> Option<Position> {
    match event {
        HookEvent::OnItemSplit { source_item, .. } => source_item.owner_position(),
        _ => None,
    }
}

fn parent_of_item(event: &HookEvent) -> Option<Position> {
    match event {
        HookEvent::OnMaxStackable { item } => item.owner_position(),
        _ => None,
    }
}

/// Per-hook position extractors, built once at startup
#[derive(Debug, Clone)]
pub struct HandlerTable {
    extractors: HashMap<HookId, PositionExtractor>,
}

impl HandlerTable {
    /// Table covering every hook in [`HookId::ALL`]
    pub fn standard() -> Self {
        let mut extractors: HashMap<HookId, PositionExtractor> = HashMap::new();
        extractors.insert(HookId::CanAcceptItem, container_of_can_accept);
        extractors.insert(HookId::CanStackItem, parent_of_host_item);
        extractors.insert(HookId::OnItemAddedToContainer, container_of_added);
        extractors.insert(HookId::OnItemSplit, parent_of_split_source);
        extractors.insert(HookId::OnMaxStackable, parent_of_item);
        Self { extractors }
    }

    /// Position associated with `event`, if its payload has one
    pub fn position_of(&self, event: &HookEvent) -> Option<Position> {
        self.extractors
            .get(&event.hook())
            .and_then(|extract| extract(event))
    }

    pub fn covers(&self, hook: HookId) -> bool {
        self.extractors.contains_key(&hook)
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Subscription side of the host's hook facility
pub trait HookBus {
    /// Start delivering `hook` events
    fn subscribe(&mut self, hook: HookId);

    /// Stop delivering `hook` events; no-op if not subscribed
    fn unsubscribe(&mut self, hook: HookId);

    fn is_subscribed(&self, hook: HookId) -> bool;
}

/// In-process hook dispatcher
///
/// Every hook starts unsubscribed so the host pays nothing for hooks that
/// are not being measured.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    subscribed: HashMap<HookId, bool>,
    table: HandlerTable,
}

impl HookDispatcher {
    pub fn new(table: HandlerTable) -> Self {
        let subscribed = HookId::ALL.iter().map(|&hook| (hook, false)).collect();
        Self { subscribed, table }
    }

    /// Route a host event
    ///
    /// Returns `None` if the event's hook is not subscribed, otherwise the
    /// (possibly absent) position extracted from its payload.
    pub fn route(&self, event: &HookEvent) -> Option<Option<Position>> {
        if !self.is_subscribed(event.hook()) {
            return None;
        }
        Some(self.table.position_of(event))
    }

    /// Hooks currently subscribed
    pub fn subscriptions(&self) -> Vec<HookId> {
        let mut hooks: Vec<HookId> = self
            .subscribed
            .iter()
            .filter(|(_, on)| **on)
            .map(|(&hook, _)| hook)
            .collect();
        hooks.sort();
        hooks
    }
}

impl Default for HookDispatcher {
    fn default() -> Self {
        Self::new(HandlerTable::standard())
    }
}

impl HookBus for HookDispatcher {
    fn subscribe(&mut self, hook: HookId) {
        tracing::trace!(hook = %hook, "subscribe");
        self.subscribed.insert(hook, true);
    }

    fn unsubscribe(&mut self, hook: HookId) {
        tracing::trace!(hook = %hook, "unsubscribe");
        self.subscribed.insert(hook, false);
    }

    fn is_subscribed(&self, hook: HookId) -> bool {
        self.subscribed.get(&hook).copied().unwrap_or(false)
    }
}
