//! Outbound game events
//!
//! The simulation never calls into the UI. It queues events here and the
//! host drains the queue once per frame, forwarding each one as a DOM
//! `CustomEvent` named by [`GameEvent::name`] with the JSON as its detail.

use serde::{Deserialize, Serialize};

use super::item::{ItemEffect, ItemKind};
use crate::catalog::ContentRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    ProjectCollected {
        id: String,
    },
    OpenProjectModal {
        record: ContentRecord,
        collected_count: usize,
        total_projects: usize,
    },
    OpenDeathModal,
    ItemCollected {
        #[serde(rename = "type")]
        kind: ItemKind,
        name: String,
        effect: ItemEffect,
    },
    ProjectProximity {
        near: bool,
    },
    LevelExtended {
        width: usize,
    },
    SessionComplete {
        elapsed_secs: f64,
        collected: usize,
        total: usize,
    },
}

impl GameEvent {
    /// DOM event type the host dispatches this as
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::ProjectCollected { .. } => "projectCollected",
            GameEvent::OpenProjectModal { .. } => "openProjectModal",
            GameEvent::OpenDeathModal => "openDeathModal",
            GameEvent::ItemCollected { .. } => "itemCollected",
            GameEvent::ProjectProximity { .. } => "projectProximity",
            GameEvent::LevelExtended { .. } => "levelExtended",
            GameEvent::SessionComplete { .. } => "sessionComplete",
        }
    }
}

/// FIFO of events produced during a frame
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        log::debug!("event: {}", event.name());
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Take everything queued so far, oldest first
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
