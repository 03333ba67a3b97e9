//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay platform free:
//! - Seeded RNG only (one `Pcg32` owned by the game)
//! - Stable iteration order
//! - No rendering or DOM dependencies; outbound effects go through `EventQueue`

pub mod actor;
pub mod animation;
pub mod camera;
pub mod controller;
pub mod entity;
pub mod events;
pub mod game;
pub mod item;
pub mod level;
pub mod particles;
pub mod player;
pub mod portfolio;
pub mod spawn;
pub mod tilemap;

pub use actor::{Actor, Body, Contacts};
pub use animation::{Animation, Animator};
pub use camera::{Camera, Facing, FollowTarget, ZoomRequest};
pub use controller::{Controller, InputEvent, Key, MouseButton, TouchControl};
pub use entity::{ContactOutcome, Entity};
pub use events::{EventQueue, GameEvent};
pub use game::{Game, GameConfig, GamePhase, SessionSummary};
pub use item::{Item, ItemEffect, ItemKind, ItemManager, SpawnConfig};
pub use level::Level;
pub use particles::{HealthChange, Particle, ParticleKind, ParticleSystem};
pub use player::{Health, Player, PlayerSignal};
pub use portfolio::{PortfolioItem, PortfolioManager};
pub use tilemap::Tilemap;
