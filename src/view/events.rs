use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type RowId = u64;
pub type SubscriptionId = u64;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Blur,
    KeyPress,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HandlerAction {
    RecomputeNow,
    RecomputeDebounced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Subscription {
    row: RowId,
    event: InputEvent,
    action: HandlerAction,
}

/// Handlers attached to the inputs of the mapping rows.
#[derive(Debug, Default)]
pub struct EventRegistry {
    next_id: SubscriptionId,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `action` for `event` on `row`. A row has at most one handler
    /// per event kind; subscribing again replaces the previous one.
    pub fn subscribe(&mut self, row: RowId, event: InputEvent, action: HandlerAction) -> SubscriptionId {
        self.subscriptions
            .retain(|_, s| !(s.row == row && s.event == event));

        self.next_id += 1;
        let id = self.next_id;
        self.subscriptions.insert(id, Subscription { row, event, action });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// Drops every handler of `row`, returns how many were attached.
    pub fn unsubscribe_row(&mut self, row: RowId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|_, s| s.row != row);
        before - self.subscriptions.len()
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    pub fn action_for(&self, row: RowId, event: InputEvent) -> Option<HandlerAction> {
        self.subscriptions
            .values()
            .find(|s| s.row == row && s.event == event)
            .map(|s| s.action)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}
