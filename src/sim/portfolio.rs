//! Portfolio collectibles
//!
//! Each visible collectible is bound to one content record drawn from a
//! shuffled pool. Collecting one immediately draws a replacement; when no
//! valid position is free the record goes back to the pool and the refill is
//! retried next tick. Level anchors (`*` cells) are tried before random
//! tiles. Counts always satisfy `visible + pool + collected == total`.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;

use super::events::{EventQueue, GameEvent};
use super::spawn::{find_spawn_position, is_valid_spawn, resting_position};
use super::tilemap::Tilemap;
use crate::catalog::ContentRecord;
use crate::consts::{
    APPEAR_RATE, HOVER_DELAY, PORTFOLIO_ITEM_SIZE, PORTFOLIO_MIN_DISTANCE, PORTFOLIO_VISIBLE_SLOTS,
    PROXIMITY_DISTANCE, TOOLTIP_FADE_RATE,
};
use crate::{Rect, approach, ease_out};

const TOOLTIP_MIN_SCALE: f32 = 0.8;
const BOB_SPEED: f32 = 1.8;
const BOB_HEIGHT: f32 = 0.12;

/// Records not yet placed in the level
#[derive(Debug, Clone, Default)]
pub struct ProjectPool {
    records: Vec<ContentRecord>,
}

impl ProjectPool {
    pub fn new(mut records: Vec<ContentRecord>, rng: &mut impl Rng) -> Self {
        records.shuffle(rng);
        Self { records }
    }

    pub fn pop(&mut self) -> Option<ContentRecord> {
        self.records.pop()
    }

    /// Return a record that could not be placed; it is drawn again next
    pub fn put_back(&mut self, record: ContentRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A collectible bound to one content record
#[derive(Debug, Clone)]
pub struct PortfolioItem {
    pub record: ContentRecord,
    pub pos: Vec2,
    pub size: f32,
    /// Player within proximity range
    pub near: bool,
    hover_time: f32,
    /// Tooltip card opacity, 0..1
    pub tooltip_opacity: f32,
    /// Spawn pop-in progress, 0..1
    pub appear: f32,
    bob_phase: f32,
}

impl PortfolioItem {
    pub fn new(record: ContentRecord, pos: Vec2) -> Self {
        Self {
            record,
            pos,
            size: PORTFOLIO_ITEM_SIZE,
            near: false,
            hover_time: 0.0,
            tooltip_opacity: 0.0,
            appear: 0.0,
            bob_phase: pos.x,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.center().distance(point)
    }

    /// Tooltip card scale, easing from 0.8 to 1.0 as it fades in
    pub fn tooltip_scale(&self) -> f32 {
        TOOLTIP_MIN_SCALE + (1.0 - TOOLTIP_MIN_SCALE) * ease_out(self.tooltip_opacity)
    }

    /// Draw size including the pop-in
    pub fn render_scale(&self) -> f32 {
        ease_out(self.appear)
    }

    pub fn bob_offset(&self) -> f32 {
        (self.bob_phase * BOB_SPEED).sin() * BOB_HEIGHT
    }

    /// Returns whether the player is near after this tick
    fn update(&mut self, dt: f32, player_center: Vec2) -> bool {
        self.bob_phase += dt;
        self.appear = approach(self.appear, 1.0, APPEAR_RATE * dt);
        self.near = self.distance_to(player_center) < PROXIMITY_DISTANCE;

        if self.near {
            self.hover_time += dt;
        } else {
            self.hover_time = 0.0;
        }
        let target = if self.near && self.hover_time >= HOVER_DELAY {
            1.0
        } else {
            0.0
        };
        self.tooltip_opacity = approach(self.tooltip_opacity, target, TOOLTIP_FADE_RATE * dt);
        self.near
    }
}

#[derive(Debug, Clone)]
pub struct PortfolioManager {
    items: Vec<PortfolioItem>,
    pool: ProjectPool,
    visible_slots: usize,
    collected: usize,
    total: usize,
    near: bool,
    since_collection: f32,
    /// Preferred tiles, in level order
    anchors: Vec<(i32, i32)>,
}

impl Default for PortfolioManager {
    fn default() -> Self {
        Self::new(PORTFOLIO_VISIBLE_SLOTS)
    }
}

impl PortfolioManager {
    pub fn new(visible_slots: usize) -> Self {
        Self {
            items: Vec::new(),
            pool: ProjectPool::default(),
            visible_slots,
            collected: 0,
            total: 0,
            near: false,
            since_collection: 0.0,
            anchors: Vec::new(),
        }
    }

    pub fn set_anchors(&mut self, anchors: Vec<(i32, i32)>) {
        self.anchors = anchors;
    }

    pub fn anchors(&self) -> &[(i32, i32)] {
        &self.anchors
    }

    /// First anchor that is still a valid, unoccupied spawn
    fn free_anchor(&self, map: &Tilemap, occupied: &[Vec2]) -> Option<(i32, i32)> {
        self.anchors
            .iter()
            .copied()
            .find(|&(x, y)| is_valid_spawn(map, x, y, occupied, PORTFOLIO_MIN_DISTANCE))
    }

    /// Seed the pool from the catalog. Replaces any earlier catalog.
    pub fn load(&mut self, records: Vec<ContentRecord>, rng: &mut impl Rng) {
        self.total = records.len();
        self.pool = ProjectPool::new(records, rng);
        self.items.clear();
        self.collected = 0;
        log::info!("Portfolio pool loaded with {} projects", self.total);
    }

    pub fn items(&self) -> &[PortfolioItem] {
        &self.items
    }

    pub fn visible(&self) -> usize {
        self.items.len()
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn collected(&self) -> usize {
        self.collected
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_near(&self) -> bool {
        self.near
    }

    pub fn seconds_since_collection(&self) -> f32 {
        self.since_collection
    }

    pub fn centers(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.items.iter().map(|i| i.center())
    }

    /// Fill empty slots from the pool. `blocked` are other occupied points.
    pub fn refill(&mut self, map: &Tilemap, blocked: &[Vec2], rng: &mut impl Rng) -> usize {
        let mut placed = 0;
        while self.items.len() < self.visible_slots {
            let Some(record) = self.pool.pop() else {
                break;
            };
            let occupied: Vec<Vec2> = self.centers().chain(blocked.iter().copied()).collect();
            let spot = self
                .free_anchor(map, &occupied)
                .or_else(|| find_spawn_position(map, &occupied, PORTFOLIO_MIN_DISTANCE, rng));
            match spot {
                Some((x, y)) => {
                    log::debug!("placing project {} at ({x}, {y})", record.id);
                    let pos = resting_position(x, y, PORTFOLIO_ITEM_SIZE);
                    self.items.push(PortfolioItem::new(record, pos));
                    placed += 1;
                }
                None => {
                    self.pool.put_back(record);
                    break;
                }
            }
        }
        placed
    }

    /// Proximity, tooltips and pending refills
    pub fn update(
        &mut self,
        dt: f32,
        player_center: Vec2,
        map: &Tilemap,
        blocked: &[Vec2],
        rng: &mut impl Rng,
        events: &mut EventQueue,
    ) {
        self.since_collection += dt;
        let mut any_near = false;
        for item in &mut self.items {
            any_near |= item.update(dt, player_center);
        }
        if any_near != self.near {
            self.near = any_near;
            events.push(GameEvent::ProjectProximity { near: any_near });
        }
        self.refill(map, blocked, rng);
    }

    /// Closest item within proximity range
    pub fn nearest_in_range(&self, point: Vec2) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.distance_to(point) < PROXIMITY_DISTANCE)
            .min_by(|(_, a), (_, b)| a.distance_to(point).total_cmp(&b.distance_to(point)))
            .map(|(i, _)| i)
    }

    /// Closest visible item at any distance
    pub fn nearest(&self, point: Vec2) -> Option<&PortfolioItem> {
        self.items
            .iter()
            .min_by(|a, b| a.distance_to(point).total_cmp(&b.distance_to(point)))
    }

    /// Collect item `index` and draw its replacement
    pub fn collect(
        &mut self,
        index: usize,
        map: &Tilemap,
        blocked: &[Vec2],
        rng: &mut impl Rng,
        events: &mut EventQueue,
    ) -> Option<ContentRecord> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.collected += 1;
        self.since_collection = 0.0;
        log::info!(
            "Collected project {} ({}/{})",
            item.record.id,
            self.collected,
            self.total
        );

        events.push(GameEvent::ProjectCollected {
            id: item.record.id.clone(),
        });
        events.push(GameEvent::OpenProjectModal {
            record: item.record.clone(),
            collected_count: self.collected,
            total_projects: self.total,
        });

        if self.near && !self.items.iter().any(|i| i.near) {
            self.near = false;
            events.push(GameEvent::ProjectProximity { near: false });
        }

        self.refill(map, blocked, rng);
        Some(item.record)
    }

    /// Action key: collect whatever is in range
    pub fn interact(
        &mut self,
        player_center: Vec2,
        map: &Tilemap,
        blocked: &[Vec2],
        rng: &mut impl Rng,
        events: &mut EventQueue,
    ) -> Option<ContentRecord> {
        let index = self.nearest_in_range(player_center)?;
        self.collect(index, map, blocked, rng, events)
    }
}
