//! Random power-up items and their manager

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::{EventQueue, GameEvent};
use super::player::Player;
use super::spawn::{find_spawn_position, resting_position};
use super::tilemap::Tilemap;
use crate::Rect;
use crate::consts::ITEM_SIZE;

const BOB_SPEED: f32 = 2.5;
const BOB_HEIGHT: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    SpeedBoost,
    Health,
}

/// What collecting an item does to the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemEffect {
    SpeedBoost { multiplier: f32, duration: f32 },
    Heal { amount: u32 },
}

impl ItemKind {
    pub const ALL: [ItemKind; 2] = [ItemKind::SpeedBoost, ItemKind::Health];

    /// Relative spawn weight
    pub fn weight(self) -> u32 {
        match self {
            ItemKind::SpeedBoost => 3,
            ItemKind::Health => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::SpeedBoost => "Speed Boost",
            ItemKind::Health => "Health",
        }
    }

    pub fn effect(self) -> ItemEffect {
        match self {
            ItemKind::SpeedBoost => ItemEffect::SpeedBoost {
                multiplier: 1.6,
                duration: 6.0,
            },
            ItemKind::Health => ItemEffect::Heal { amount: 1 },
        }
    }

    /// Seconds before an uncollected item expires; `None` never expires
    pub fn lifespan(self) -> Option<f32> {
        match self {
            ItemKind::SpeedBoost => Some(20.0),
            ItemKind::Health => None,
        }
    }

    pub fn color(self) -> [f32; 4] {
        match self {
            ItemKind::SpeedBoost => [1.0, 0.85, 0.2, 1.0],
            ItemKind::Health => [0.95, 0.3, 0.4, 1.0],
        }
    }

    /// Weighted draw over `ALL`
    pub fn pick(rng: &mut impl Rng) -> ItemKind {
        let total: u32 = Self::ALL.iter().map(|k| k.weight()).sum();
        let mut roll = rng.random_range(0..total);
        for kind in Self::ALL {
            if roll < kind.weight() {
                return kind;
            }
            roll -= kind.weight();
        }
        ItemKind::SpeedBoost
    }
}

impl ItemEffect {
    /// Apply to the player; false if it had nothing to do
    pub fn apply(self, player: &mut Player) -> bool {
        match self {
            ItemEffect::SpeedBoost { multiplier, duration } => {
                player.apply_speed_boost(multiplier, duration);
                true
            }
            ItemEffect::Heal { amount } => {
                if player.health.is_full() {
                    return false;
                }
                player.heal(amount) > 0
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Vec2,
    pub size: f32,
    collected: bool,
    /// Remaining seconds; `None` never expires
    lifespan: Option<f32>,
    age: f32,
}

impl Item {
    pub fn new(kind: ItemKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            size: ITEM_SIZE,
            collected: false,
            lifespan: kind.lifespan(),
            age: 0.0,
        }
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    pub fn is_expired(&self) -> bool {
        self.lifespan.is_some_and(|t| t <= 0.0)
    }

    pub fn remaining(&self) -> Option<f32> {
        self.lifespan
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Draw position including the bob
    pub fn render_pos(&self) -> Vec2 {
        self.pos - Vec2::new(0.0, ((self.age * BOB_SPEED).sin() * 0.5 + 0.5) * BOB_HEIGHT)
    }

    /// Blink during the last three seconds of life
    pub fn visible(&self) -> bool {
        match self.lifespan {
            Some(t) if t < 3.0 => (t * 8.0).sin() > -0.3,
            _ => true,
        }
    }

    fn update(&mut self, dt: f32) {
        if self.collected {
            return;
        }
        self.age += dt;
        if let Some(t) = self.lifespan.as_mut() {
            *t -= dt;
        }
    }

    /// Consume the item; its effect is applied only if useful
    pub fn collect(&mut self, player: &mut Player) -> Option<ItemEffect> {
        if self.collected {
            return None;
        }
        self.collected = true;
        let effect = self.kind.effect();
        effect.apply(player);
        Some(effect)
    }
}

/// Spawn pacing for random items
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnConfig {
    pub max_items: usize,
    /// Minimum seconds between spawns
    pub min_interval: f32,
    /// Chance per eligible tick once the interval has passed
    pub spawn_chance: f64,
    /// Minimum distance between any two items (tiles)
    pub min_distance: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            max_items: 3,
            min_interval: 8.0,
            spawn_chance: 0.35,
            min_distance: 4.0,
        }
    }
}

impl SpawnConfig {
    /// Busier pacing for development
    pub fn debug() -> Self {
        Self {
            max_items: 10,
            min_interval: 1.0,
            spawn_chance: 1.0,
            min_distance: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemManager {
    pub config: SpawnConfig,
    items: Vec<Item>,
    since_spawn: f32,
}

impl ItemManager {
    pub fn new(config: SpawnConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
            since_spawn: 0.0,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn centers(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.items.iter().map(|i| i.center())
    }

    /// Place one random item. `blocked` are extra positions to keep clear of.
    pub fn try_spawn(&mut self, map: &Tilemap, blocked: &[Vec2], rng: &mut impl Rng) -> bool {
        if self.items.len() >= self.config.max_items {
            return false;
        }
        let occupied: Vec<Vec2> = self.centers().chain(blocked.iter().copied()).collect();
        let Some((x, y)) = find_spawn_position(map, &occupied, self.config.min_distance, rng) else {
            return false;
        };
        let kind = ItemKind::pick(rng);
        self.items.push(Item::new(kind, resting_position(x, y, ITEM_SIZE)));
        self.since_spawn = 0.0;
        log::debug!("spawned {} at ({x}, {y})", kind.name());
        true
    }

    /// Age, expire and pick up items, then maybe spawn a new one.
    /// Returns the kinds collected this tick.
    pub fn update(
        &mut self,
        dt: f32,
        player: &mut Player,
        map: &Tilemap,
        blocked: &[Vec2],
        rng: &mut impl Rng,
        events: &mut EventQueue,
    ) -> Vec<(ItemKind, Vec2)> {
        let player_bounds = player.body.bounds();
        let mut collected = Vec::new();

        for item in &mut self.items {
            item.update(dt);
            if item.is_collected() || item.is_expired() {
                continue;
            }
            if item.bounds().overlaps(&player_bounds) {
                if let Some(effect) = item.collect(player) {
                    events.push(GameEvent::ItemCollected {
                        kind: item.kind,
                        name: item.kind.name().to_string(),
                        effect,
                    });
                    collected.push((item.kind, item.center()));
                }
            }
        }
        self.items.retain(|i| !i.is_collected() && !i.is_expired());

        self.since_spawn += dt;
        if self.since_spawn >= self.config.min_interval && rng.random_bool(self.config.spawn_chance.clamp(0.0, 1.0)) {
            self.try_spawn(map, blocked, rng);
        }
        collected
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.since_spawn = 0.0;
    }
}
