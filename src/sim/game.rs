//! Session orchestrator
//!
//! Owns the world and every actor, runs the per-frame update in a fixed
//! order and exposes a narrow command interface to the host. Nothing here
//! touches the DOM; outbound notifications go through the event queue.

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::actor::remove_deleted;
use super::camera::{Camera, ZoomRequest};
use super::controller::{ControlFlags, Controller, InputEvent, Key};
use super::entity::{ContactOutcome, ContactRules, Entity};
use super::events::{EventQueue, GameEvent};
use super::item::{ItemManager, SpawnConfig};
use super::level::Level;
use super::particles::{HealthChange, ParticleSystem};
use super::player::{Player, PlayerSignal};
use super::portfolio::{PortfolioItem, PortfolioManager};
use super::spawn::{find_spawn_position, tile_center};
use super::tilemap::Tilemap;
use crate::catalog::{CatalogReceiver, ContentRecord};
use crate::consts::*;
use crate::difficulty::Difficulty;
use crate::error::EngineError;
use crate::settings::Settings;

const DUST_COLOR: [f32; 4] = [0.86, 0.8, 0.7, 1.0];
const SLAM_COLOR: [f32; 4] = [1.0, 0.6, 0.2, 1.0];
const ENEMY_COLOR: [f32; 4] = [0.7, 0.35, 0.9, 1.0];
/// Health bar opacity while a project tooltip has the player's attention
const HEALTH_BAR_DIMMED: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Start screen showing; the world runs but input is ignored
    Initializing,
    Playing,
    Paused,
    /// Enough projects collected
    Complete,
}

/// Everything supplied by the host at session start
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub seed: u64,
    pub difficulty: Difficulty,
    pub settings: Settings,
    /// Faster item pacing for development
    pub debug: bool,
    pub visible_projects: usize,
    pub screen_width: f32,
    pub screen_height: f32,
    /// ASCII level source; the built-in level when `None`
    pub level: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            difficulty: Difficulty::default(),
            settings: Settings::default(),
            debug: false,
            visible_projects: PORTFOLIO_VISIBLE_SLOTS,
            screen_width: 1280.0,
            screen_height: 720.0,
            level: None,
        }
    }
}

/// What the leaderboard layer needs once a session ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub elapsed_secs: f64,
    pub collected: usize,
    pub total: usize,
    pub projects_required: usize,
    pub complete: bool,
}

pub struct Game {
    phase: GamePhase,
    difficulty: Difficulty,
    settings: Settings,
    rng: Pcg32,
    seed: u64,

    map: Tilemap,
    entity_spawns: Vec<(usize, usize)>,

    camera: Camera,
    player: Player,
    controller: Controller,
    entities: Vec<Entity>,
    particles: ParticleSystem,
    items: ItemManager,
    portfolio: PortfolioManager,
    events: EventQueue,

    catalog: Option<CatalogReceiver>,
    modal_open: bool,
    shut_down: bool,

    /// Simulated seconds since construction
    clock: f64,
    /// Seconds spent in the playing phase
    elapsed: f64,
    enemy_timer: f32,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        let level = match &config.level {
            Some(source) => Level::parse(source)?,
            None => Level::default_level()?,
        };
        let map = level.to_tilemap()?;
        let spawn = level.spawn_position(Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT));

        let mut player = Player::new(spawn);
        player.health.enabled = config.difficulty.health_enabled();

        let mut camera = Camera::new(config.screen_width, config.screen_height);
        camera.follow(player.follow_target());

        let mut portfolio = PortfolioManager::new(config.visible_projects);
        portfolio.set_anchors(
            level
                .anchors
                .iter()
                .map(|&(x, y)| (x as i32, y as i32))
                .collect(),
        );

        let spawn_config = if config.debug {
            SpawnConfig::debug()
        } else {
            SpawnConfig::default()
        };

        let mut game = Self {
            phase: GamePhase::Initializing,
            difficulty: config.difficulty,
            particles: ParticleSystem::new(config.settings.max_particles()),
            settings: config.settings,
            rng: Pcg32::seed_from_u64(config.seed),
            seed: config.seed,
            map,
            entity_spawns: level.entity_spawns.clone(),
            camera,
            player,
            controller: Controller::new(),
            entities: Vec::new(),
            items: ItemManager::new(spawn_config),
            portfolio,
            events: EventQueue::new(),
            catalog: None,
            modal_open: false,
            shut_down: false,
            clock: 0.0,
            elapsed: 0.0,
            enemy_timer: 0.0,
        };
        game.populate_entities();
        game.clamp_camera();
        game.camera.snap_to_target();

        log::info!(
            "Level loaded: {}x{} tiles, {} hostiles, seed {:#x}",
            game.map.width(),
            game.map.height(),
            game.entities.len(),
            game.seed
        );
        Ok(game)
    }

    fn populate_entities(&mut self) {
        let cap = self.difficulty.max_enemies(BASE_MAX_ENEMIES);
        let player = self.player.body.center();
        for &(x, y) in &self.entity_spawns {
            if self.entities.len() >= cap {
                break;
            }
            if tile_center(x as i32, y as i32).distance(player) < ENEMY_MIN_PLAYER_DISTANCE {
                continue;
            }
            let direction = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
            self.entities.push(Entity::at_tile(x as i32, y as i32, direction));
        }
    }

    // --- Host commands ---

    /// Leave the start screen
    pub fn start(&mut self) {
        if self.phase == GamePhase::Initializing {
            self.phase = GamePhase::Playing;
            log::info!("Session started");
        }
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            self.controller.release_all();
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => {}
        }
    }

    pub fn apply_input(&mut self, event: InputEvent) {
        if self.shut_down {
            return;
        }
        if event == InputEvent::KeyDown(Key::Pause) {
            self.toggle_pause();
            return;
        }
        self.controller.handle(event);
    }

    /// Forget held keys (window lost focus)
    pub fn release_input(&mut self) {
        self.controller.release_all();
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.player.health.enabled = difficulty.health_enabled();
        log::info!(
            "Difficulty: {} projects, enemies x{}, one-hit-kill {}",
            difficulty.projects_required,
            difficulty.enemy_multiplier,
            difficulty.one_hit_kill
        );
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.particles.set_max_particles(settings.max_particles());
        self.settings = settings;
    }

    pub fn request_zoom(&mut self, request: ZoomRequest) {
        self.camera.apply_zoom(request);
        self.clamp_camera();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
        self.clamp_camera();
    }

    /// A host modal opened or closed. While open the player cannot be hurt
    /// and horizontal movement is ignored.
    pub fn set_modal_open(&mut self, open: bool) {
        self.modal_open = open;
        self.player.invincible = open;
    }

    pub fn open_controls_modal(&mut self) {
        log::debug!("controls modal requested");
        self.set_modal_open(true);
    }

    pub fn attach_catalog(&mut self, receiver: CatalogReceiver) {
        self.catalog = Some(receiver);
    }

    /// Seed the project pool directly (native runs, tests)
    pub fn load_catalog(&mut self, records: Vec<ContentRecord>) {
        self.portfolio.load(records, &mut self.rng);
        let blocked = self.blocked_for_portfolio();
        self.portfolio.refill(&self.map, &blocked, &mut self.rng);
    }

    /// End the session: no further updates, late catalog results are dropped
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.catalog = None;
        self.controller.release_all();
        self.events.clear();
        log::info!("Session shut down after {:.1}s", self.elapsed);
    }

    /// Kill the player, honoring invincibility if the difficulty asks for it
    pub fn kill_player(&mut self) -> bool {
        if self.player.invincible && self.difficulty.invincibility_blocks_death {
            log::debug!("death blocked by invincibility");
            return false;
        }
        self.player.die();
        true
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    // --- Queries ---

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn map(&self) -> &Tilemap {
        &self.map
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn items(&self) -> &ItemManager {
        &self.items
    }

    pub fn portfolio(&self) -> &PortfolioManager {
        &self.portfolio
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn health_bar_opacity(&self) -> f32 {
        if self.portfolio.is_near() {
            HEALTH_BAR_DIMMED
        } else {
            1.0
        }
    }

    /// Nearest project the arrow should point at, if the player seems lost
    pub fn indicator_target(&self) -> Option<&PortfolioItem> {
        if !self.settings.show_indicator || self.portfolio.seconds_since_collection() <= INDICATOR_DELAY {
            return None;
        }
        let from = self.player.body.center();
        self.portfolio
            .nearest(from)
            .filter(|item| item.distance_to(from) > INDICATOR_MIN_DISTANCE)
    }

    pub fn session_summary(&self) -> SessionSummary {
        SessionSummary {
            elapsed_secs: self.elapsed,
            collected: self.portfolio.collected(),
            total: self.portfolio.total(),
            projects_required: self.required_projects(),
            complete: self.phase == GamePhase::Complete,
        }
    }

    fn required_projects(&self) -> usize {
        self.difficulty.projects_required.min(self.portfolio.total())
    }

    // --- Frame ---

    /// One host frame. Returns false when nothing was simulated.
    pub fn frame(&mut self, raw_dt: f32) -> bool {
        if self.shut_down {
            return false;
        }
        let dt = if raw_dt.is_finite() {
            raw_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        match self.phase {
            GamePhase::Initializing | GamePhase::Playing => {
                self.update(dt);
                true
            }
            GamePhase::Paused | GamePhase::Complete => false,
        }
    }

    fn update(&mut self, dt: f32) {
        let playing = self.phase == GamePhase::Playing;
        self.clock += dt as f64;
        if playing {
            self.elapsed += dt as f64;
        }

        self.poll_catalog();

        let flags = ControlFlags {
            initializing: !playing,
            modal_open: self.modal_open,
        };
        let output = self.controller.update(&mut self.player, flags);
        if let Some(zoom) = output.zoom {
            self.request_zoom(zoom);
        }
        if output.interact {
            let blocked = self.blocked_for_portfolio();
            let center = self.player.body.center();
            self.portfolio
                .interact(center, &self.map, &blocked, &mut self.rng, &mut self.events);
        }

        if playing {
            self.update_entities(dt);
        }

        self.player.update(dt, &self.map, self.clock, &mut self.rng);
        self.handle_player_signals();

        self.particles.update(dt, self.player.health_bar_anchor());

        self.camera.follow(self.player.follow_target());
        self.camera.update(dt, &mut self.rng);

        if playing {
            let blocked: Vec<Vec2> = self
                .portfolio
                .centers()
                .chain(std::iter::once(self.player.body.center()))
                .collect();
            let picked = self.items.update(
                dt,
                &mut self.player,
                &self.map,
                &blocked,
                &mut self.rng,
                &mut self.events,
            );
            for (kind, at) in picked {
                self.burst(at, 14, 0.8, kind.color());
            }
            self.handle_player_signals();
        }

        let blocked = self.blocked_for_portfolio();
        let center = self.player.body.center();
        self.portfolio
            .update(dt, center, &self.map, &blocked, &mut self.rng, &mut self.events);

        self.check_level_extension();

        if playing {
            self.update_spawner(dt);
            self.check_victory();
        }
    }

    fn poll_catalog(&mut self) {
        let Some(receiver) = self.catalog.as_mut() else {
            return;
        };
        let Some(result) = receiver.try_recv() else {
            return;
        };
        self.catalog = None;
        match result {
            Ok(records) => self.load_catalog(records),
            Err(e) => log::warn!("Catalog unavailable, continuing without projects: {e}"),
        }
    }

    fn blocked_for_portfolio(&self) -> Vec<Vec2> {
        self.items
            .centers()
            .chain(std::iter::once(self.player.body.center()))
            .collect()
    }

    fn update_entities(&mut self, dt: f32) {
        let rules = ContactRules {
            one_hit_kill: self.difficulty.one_hit_kill,
        };
        let mut outcomes = Vec::new();
        for entity in &mut self.entities {
            entity.update(dt, &self.map);
            if let Some(outcome) = entity.resolve_player_contact(&mut self.player, &rules) {
                outcomes.push((outcome, entity.body.center()));
            }
        }
        remove_deleted(&mut self.entities);

        for (outcome, at) in outcomes {
            match outcome {
                ContactOutcome::Slain | ContactOutcome::Slammed => {
                    self.burst(at, 18, 1.0, ENEMY_COLOR);
                    self.shake(SHAKE_ATTACK);
                }
                ContactOutcome::Repelled => {}
                ContactOutcome::PlayerHit => self.shake(SHAKE_HIT),
                ContactOutcome::PlayerKilled => {
                    self.shake(SHAKE_HIT);
                    self.kill_player();
                }
            }
        }
    }

    fn handle_player_signals(&mut self) {
        loop {
            let signals = self.player.drain_signals();
            if signals.is_empty() {
                break;
            }
            for signal in signals {
                self.on_player_signal(signal);
            }
        }
    }

    fn on_player_signal(&mut self, signal: PlayerSignal) {
        match signal {
            PlayerSignal::Jumped { double } => {
                if double {
                    let b = self.player.body.bounds();
                    self.burst(Vec2::new(b.center().x, b.bottom()), 6, 0.6, DUST_COLOR);
                }
            }
            PlayerSignal::Landed { hard, at } => {
                let count = if hard { 20 } else { 8 };
                self.burst(at, count, if hard { 1.0 } else { 0.6 }, DUST_COLOR);
                if hard {
                    self.shake(SHAKE_HARD_LANDING);
                }
            }
            PlayerSignal::GroundSlamImpact { at } => {
                self.burst(at, 30, 1.2, SLAM_COLOR);
                self.shake(SHAKE_GROUND_SLAM);
            }
            PlayerSignal::AttackStarted => self.shake(SHAKE_ATTACK),
            PlayerSignal::HealthChanged { delta } => {
                let change = if delta > 0 {
                    HealthChange::Gain
                } else {
                    HealthChange::Loss
                };
                let anchor = self.player.health_bar_anchor();
                self.particles
                    .spawn_health_change_particles(anchor, change, &mut self.rng);
            }
            PlayerSignal::HealthDepleted => {
                self.kill_player();
            }
            PlayerSignal::Died => {
                log::info!("Player died; respawning");
                self.camera.follow(self.player.follow_target());
                self.camera.snap_to_target();
                self.events.push(GameEvent::OpenDeathModal);
            }
        }
    }

    fn burst(&mut self, at: Vec2, count: usize, size_scale: f32, color: [f32; 4]) {
        let count = self.settings.burst(count);
        self.particles
            .spawn_particles(at.x, at.y, count, size_scale, color, &mut self.rng);
    }

    fn shake(&mut self, (duration, magnitude): (f32, f32)) {
        if self.settings.effective_screen_shake() {
            self.camera.shake(duration, magnitude);
        }
    }

    /// Keep the viewport inside the level
    fn clamp_camera(&mut self) {
        let view = self.camera.view_size();
        let size = Vec2::new(self.map.width() as f32, self.map.height() as f32);
        let half = view * 0.5;
        let (min_x, max_x) = if size.x > view.x {
            (half.x, size.x - half.x)
        } else {
            (size.x * 0.5, size.x * 0.5)
        };
        let (min_y, max_y) = if size.y > view.y {
            (half.y, size.y - half.y)
        } else {
            (size.y * 0.5, size.y * 0.5)
        };
        self.camera
            .set_bounds(Some(min_x), Some(max_x), Some(min_y), Some(max_y));
    }

    fn check_level_extension(&mut self) {
        let width = self.map.width();
        if self.player.body.center().x < width as f32 * 4.0 / 5.0 {
            return;
        }
        self.map.double_width();
        self.player.trail_mut().remap(width, self.map.width());
        let copies: Vec<(usize, usize)> = self
            .entity_spawns
            .iter()
            .map(|&(x, y)| (x + width, y))
            .collect();
        self.entity_spawns.extend(copies);
        let anchors = self.portfolio.anchors();
        let shifted = anchors.iter().map(|&(x, y)| (x + width as i32, y));
        let doubled: Vec<(i32, i32)> = anchors.iter().copied().chain(shifted).collect();
        self.portfolio.set_anchors(doubled);
        self.clamp_camera();
        log::info!("Level extended to {} tiles wide", self.map.width());
        self.events.push(GameEvent::LevelExtended {
            width: self.map.width(),
        });
    }

    fn update_spawner(&mut self, dt: f32) {
        let Some(interval) = self.difficulty.enemy_interval(ENEMY_SPAWN_INTERVAL) else {
            return;
        };
        self.enemy_timer += dt;
        if self.enemy_timer < interval {
            return;
        }
        self.enemy_timer = 0.0;

        let alive = self.entities.iter().filter(|e| e.is_alive()).count();
        if alive >= self.difficulty.max_enemies(BASE_MAX_ENEMIES) {
            return;
        }
        if let Some((x, y)) = self.pick_enemy_spawn() {
            let direction = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
            self.entities.push(Entity::at_tile(x, y, direction));
            log::debug!("hostile spawned at ({x}, {y})");
        }
    }

    fn pick_enemy_spawn(&mut self) -> Option<(i32, i32)> {
        let player = self.player.body.center();
        let marked: Vec<(i32, i32)> = self
            .entity_spawns
            .iter()
            .map(|&(x, y)| (x as i32, y as i32))
            .filter(|&(x, y)| tile_center(x, y).distance(player) >= ENEMY_MIN_PLAYER_DISTANCE)
            .collect();
        if let Some(&spot) = marked.choose(&mut self.rng) {
            return Some(spot);
        }
        find_spawn_position(&self.map, &[player], ENEMY_MIN_PLAYER_DISTANCE, &mut self.rng)
    }

    fn check_victory(&mut self) {
        let required = self.required_projects();
        if required == 0 || self.portfolio.collected() < required {
            return;
        }
        self.phase = GamePhase::Complete;
        self.controller.release_all();
        let summary = self.session_summary();
        log::info!(
            "Session complete: {}/{} projects in {:.1}s",
            summary.collected,
            summary.total,
            summary.elapsed_secs
        );
        self.events.push(GameEvent::SessionComplete {
            elapsed_secs: summary.elapsed_secs,
            collected: summary.collected,
            total: summary.total,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::error::CatalogError;
    use crate::sim::animation::Animation;
    use crate::sim::spawn::resting_position;

    const DT: f32 = 1.0 / 60.0;

    /// Flat 40x8 room, spawn on the left, no hostile markers
    const ROOM: &str = "\
........................................\n\
........................................\n\
........................................\n\
........................................\n\
........................................\n\
........................................\n\
.P......................................\n\
########################################";

    fn game_with(level: &str, difficulty: Difficulty) -> Game {
        let config = GameConfig {
            level: Some(level.to_string()),
            difficulty,
            ..GameConfig::default()
        };
        Game::new(config).unwrap()
    }

    fn peaceful() -> Difficulty {
        Difficulty {
            enemy_multiplier: 0.0,
            ..Difficulty::default()
        }
    }

    fn records(n: usize) -> Vec<ContentRecord> {
        (0..n)
            .map(|i| ContentRecord::new(format!("{i}"), format!("Project {i}")))
            .collect()
    }

    fn run(game: &mut Game, frames: usize) {
        for _ in 0..frames {
            game.frame(DT);
        }
    }

    #[test]
    fn test_bad_level_refuses_to_start() {
        let config = GameConfig {
            level: Some("....\n...".to_string()),
            ..GameConfig::default()
        };
        assert!(matches!(
            Game::new(config),
            Err(EngineError::LevelRowLength { .. })
        ));
    }

    #[test]
    fn test_default_level_builds() {
        let game = Game::new(GameConfig::default()).unwrap();
        assert_eq!(game.phase(), GamePhase::Initializing);
        assert!(!game.entities().is_empty());
    }

    #[test]
    fn test_initializing_ignores_input() {
        let mut game = game_with(ROOM, peaceful());
        run(&mut game, 60);
        let x = game.player().body.pos.x;
        game.apply_input(InputEvent::KeyDown(Key::Right));
        run(&mut game, 30);
        assert_eq!(game.player().body.pos.x, x);

        game.start();
        run(&mut game, 30);
        assert!(game.player().body.pos.x > x);
    }

    #[test]
    fn test_frame_dt_is_clamped() {
        let mut game = game_with(ROOM, peaceful());
        game.start();
        game.frame(10.0);
        assert!((game.session_summary().elapsed_secs - MAX_FRAME_DT as f64).abs() < 1e-6);
        game.frame(f32::NAN);
        assert!((game.session_summary().elapsed_secs - MAX_FRAME_DT as f64).abs() < 1e-6);
    }

    #[test]
    fn test_pause_stops_simulation() {
        let mut game = game_with(ROOM, peaceful());
        game.start();
        game.apply_input(InputEvent::KeyDown(Key::Pause));
        assert_eq!(game.phase(), GamePhase::Paused);
        assert!(!game.frame(DT));
        game.apply_input(InputEvent::KeyDown(Key::Pause));
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_catalog_failure_leaves_empty_pool() {
        let mut game = game_with(ROOM, peaceful());
        let (tx, rx) = catalog::channel();
        game.attach_catalog(rx);
        game.start();
        run(&mut game, 5);
        assert_eq!(game.portfolio().total(), 0);

        tx.send(Err(CatalogError::Network("offline".into())));
        run(&mut game, 5);
        assert_eq!(game.portfolio().total(), 0);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_catalog_arrival_populates_projects() {
        let mut game = game_with(ROOM, peaceful());
        let (tx, rx) = catalog::channel();
        game.attach_catalog(rx);
        tx.send(Ok(records(6)));
        run(&mut game, 30);
        assert_eq!(game.portfolio().total(), 6);
        assert_eq!(game.portfolio().visible(), 3);
    }

    #[test]
    fn test_shutdown_drops_late_catalog() {
        let mut game = game_with(ROOM, peaceful());
        let (tx, rx) = catalog::channel();
        game.attach_catalog(rx);
        game.shutdown();
        assert!(!tx.send(Ok(records(3))));
        assert!(!game.frame(DT));
        assert_eq!(game.portfolio().total(), 0);
    }

    #[test]
    fn test_level_extends_when_player_nears_the_end() {
        let mut game = game_with(ROOM, peaceful());
        game.start();
        game.player_mut().body.pos.x = 33.0;
        game.frame(DT);
        assert_eq!(game.map().width(), 80);
        assert!(
            game.drain_events()
                .contains(&GameEvent::LevelExtended { width: 80 })
        );
        game.frame(DT);
        assert_eq!(game.map().width(), 80);
    }

    #[test]
    fn test_depleted_health_opens_death_modal() {
        let mut game = game_with(ROOM, peaceful());
        game.start();
        run(&mut game, 30);
        let spawn = game.player().spawn();
        game.player_mut().body.pos.x = 10.0;
        game.player_mut().take_damage(PLAYER_MAX_HEALTH);
        game.frame(DT);
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::OpenDeathModal));
        assert!(game.player().health.is_full());
        assert!((game.player().body.pos.x - spawn.x).abs() < 0.5);
    }

    #[test]
    fn test_invincibility_blocks_death_only_when_configured() {
        let mut game = game_with(ROOM, peaceful());
        game.set_modal_open(true);
        assert!(game.kill_player());

        let mut strict = game_with(
            ROOM,
            Difficulty {
                invincibility_blocks_death: true,
                ..peaceful()
            },
        );
        strict.set_modal_open(true);
        assert!(!strict.kill_player());
        strict.set_modal_open(false);
        assert!(strict.kill_player());
    }

    #[test]
    fn test_one_hit_kill_disables_health() {
        let mut game = game_with(ROOM, peaceful());
        game.set_difficulty(Difficulty {
            one_hit_kill: true,
            ..peaceful()
        });
        assert!(!game.player().health.enabled);
    }

    #[test]
    fn test_collecting_enough_projects_completes_session() {
        let mut game = game_with(
            ROOM,
            Difficulty {
                projects_required: 2,
                ..peaceful()
            },
        );
        game.load_catalog(records(4));
        game.start();
        run(&mut game, 30);

        for _ in 0..2 {
            let target = game.portfolio().items()[0].pos;
            game.player_mut().body.pos = target;
            game.apply_input(InputEvent::KeyDown(Key::Interact));
            game.frame(DT);
            game.apply_input(InputEvent::KeyUp(Key::Interact));
        }

        assert_eq!(game.phase(), GamePhase::Complete);
        let summary = game.session_summary();
        assert_eq!(summary.collected, 2);
        assert!(summary.complete);
        let events = game.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::SessionComplete { .. }))
                .count(),
            1
        );
        assert!(!game.frame(DT));
    }

    #[test]
    fn test_attack_shakes_camera_unless_reduced_motion() {
        let mut game = game_with(ROOM, peaceful());
        game.start();
        run(&mut game, 60);
        game.apply_input(InputEvent::KeyDown(Key::Attack));
        game.frame(DT);
        assert!(game.player().animation().is_attack());
        assert!(game.camera().is_shaking());

        let mut calm = game_with(ROOM, peaceful());
        calm.set_settings(Settings {
            reduced_motion: true,
            ..Settings::default()
        });
        calm.start();
        run(&mut calm, 60);
        calm.apply_input(InputEvent::KeyDown(Key::Attack));
        calm.frame(DT);
        assert_eq!(calm.player().animation(), Animation::Attack1);
        assert!(!calm.camera().is_shaking());
    }

    const ANCHORED_ROOM: &str = "\
........................................\n\
........................................\n\
........................................\n\
........................................\n\
........................................\n\
........................................\n\
.P..........................*.......*...\n\
########################################";

    fn hold_at(game: &mut Game, x: f32, seconds: f32) {
        for _ in 0..(seconds / 0.25) as usize {
            game.player_mut().body.pos.x = x;
            game.frame(0.25);
        }
    }

    #[test]
    fn test_catalog_lands_on_level_anchors() {
        let mut game = game_with(ANCHORED_ROOM, peaceful());
        assert_eq!(game.portfolio().anchors(), &[(28, 6), (36, 6)]);
        game.load_catalog(records(2));
        let xs: Vec<f32> = game.portfolio().items().iter().map(|i| i.pos.x).collect();
        assert_eq!(xs.len(), 2);
        assert!((xs[0] - resting_position(28, 6, PORTFOLIO_ITEM_SIZE).x).abs() < 1e-6);
        assert!((xs[1] - resting_position(36, 6, PORTFOLIO_ITEM_SIZE).x).abs() < 1e-6);
    }

    #[test]
    fn test_indicator_waits_for_delay_and_distance() {
        let far_x = 2.0;
        let mut game = game_with(
            ANCHORED_ROOM,
            Difficulty {
                projects_required: 5,
                ..peaceful()
            },
        );
        game.load_catalog(records(2));
        game.start();
        assert!(game.indicator_target().is_none());

        hold_at(&mut game, far_x, INDICATOR_DELAY - 1.0);
        assert!(game.indicator_target().is_none());

        hold_at(&mut game, far_x, 2.0);
        let target = game.indicator_target().map(|item| item.center().x);
        assert!(target.is_some_and(|x| (x - 28.5).abs() < 0.5));

        // Collecting restarts the wait
        let nearest = game.portfolio().items()[0].pos;
        game.player_mut().body.pos = nearest;
        game.apply_input(InputEvent::KeyDown(Key::Interact));
        game.frame(DT);
        game.apply_input(InputEvent::KeyUp(Key::Interact));
        assert_eq!(game.portfolio().collected(), 1);

        hold_at(&mut game, far_x, 0.25);
        assert!(game.indicator_target().is_none());
        hold_at(&mut game, far_x, INDICATOR_DELAY - 1.0);
        assert!(game.indicator_target().is_none());

        hold_at(&mut game, far_x, 2.0);
        let target = game.indicator_target().map(|item| item.center().x);
        assert!(target.is_some_and(|x| (x - 36.5).abs() < 0.5));
    }

    #[test]
    fn test_extension_duplicates_anchors() {
        let mut game = game_with(ANCHORED_ROOM, peaceful());
        game.start();
        game.player_mut().body.pos.x = 34.0;
        game.frame(DT);
        assert_eq!(game.map().width(), 80);
        assert_eq!(
            game.portfolio().anchors(),
            &[(28, 6), (36, 6), (68, 6), (76, 6)]
        );
    }
}
