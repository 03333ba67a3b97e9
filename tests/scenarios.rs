//! End-to-end scenarios through the public API

use folio_runner::catalog::{self, parse_catalog};
use folio_runner::sim::{
    Game, GameConfig, GameEvent, GamePhase, Health, InputEvent, ItemManager, Key, Player, SpawnConfig, Tilemap,
};
use folio_runner::{Difficulty, EngineError};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

const DT: f32 = 1.0 / 60.0;

const ROOM: &str = "\
........................................\n\
........................................\n\
........................................\n\
........................................\n\
........................................\n\
........................................\n\
.P......................................\n\
########################################";

fn quiet_game(projects_required: usize) -> Game {
    Game::new(GameConfig {
        level: Some(ROOM.to_string()),
        difficulty: Difficulty {
            projects_required,
            enemy_multiplier: 0.0,
            one_hit_kill: false,
            invincibility_blocks_death: false,
        },
        ..GameConfig::default()
    })
    .unwrap()
}

fn run(game: &mut Game, frames: usize) {
    for _ in 0..frames {
        game.frame(DT);
    }
}

#[test]
fn test_scattered_map_doubles_width() {
    let (w, h) = (15, 28);
    let mut rng = Pcg32::seed_from_u64(15);
    let tiles: Vec<u8> = (0..w * h).map(|_| u8::from(rng.random_bool(0.3))).collect();
    let mut map = Tilemap::new(tiles.clone(), w, h).unwrap();
    assert_eq!(map.mask().len(), map.tiles().len());
    let corner = map.get(0, 0);

    map.double_width();

    assert_eq!(map.width(), 30);
    assert_eq!(map.tiles().len(), 30 * 28);
    assert_eq!(map.mask().len(), 30 * 28);
    assert_eq!(map.get(0, 0), corner);
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            assert_eq!(map.get(x, y), Some(tiles[y as usize * w + x as usize]));
            assert_eq!(map.get(x, y), map.get(x + w as i32, y));
        }
    }
}

#[test]
fn test_mismatched_grid_is_rejected() {
    assert!(matches!(
        Tilemap::new(vec![0; 10], 3, 3),
        Err(EngineError::TilemapSize { expected: 9, actual: 10 })
    ));
}

#[test]
fn test_heal_clamps_to_max() {
    let mut player = Player::new(Vec2::new(2.0, 2.0));
    player.health = Health::with_current(5, 2);

    assert_eq!(player.heal(1), 1);
    assert_eq!(player.health.current(), 3);
    assert_eq!(player.heal(10), 2);
    assert_eq!(player.health.current(), 5);
    assert!(player.health.is_full());
}

#[test]
fn test_single_item_cap_holds() {
    let map = Tilemap::new(
        {
            let mut tiles = vec![0u8; 60 * 8];
            tiles[7 * 60..].fill(1);
            tiles
        },
        60,
        8,
    )
    .unwrap();
    let mut rng = Pcg32::seed_from_u64(3);
    let mut items = ItemManager::new(SpawnConfig {
        max_items: 1,
        min_interval: 0.0,
        spawn_chance: 1.0,
        min_distance: 1.0,
    });

    assert!(items.try_spawn(&map, &[], &mut rng));
    assert!(!items.try_spawn(&map, &[], &mut rng));
    assert_eq!(items.len(), 1);

    // Far off the map so nothing is picked up
    let mut player = Player::new(Vec2::new(-100.0, -100.0));
    let mut events = folio_runner::sim::EventQueue::new();
    for _ in 0..120 {
        items.update(DT, &mut player, &map, &[], &mut rng, &mut events);
        assert!(items.len() <= 1);
    }
}

#[test]
fn test_full_session_from_catalog_to_completion() {
    let mut game = quiet_game(2);
    let (tx, rx) = catalog::channel();
    game.attach_catalog(rx);

    let payload = r#"{"projects": [
        {"id": 1, "title": "Lighthouse", "year": 2021},
        {"id": "two", "title": "Field Notes"},
        {"id": 3, "title": "Tidal Atlas", "url": "https://example.org/atlas"}
    ]}"#;
    assert!(tx.send(parse_catalog(payload)));

    run(&mut game, 10);
    assert_eq!(game.phase(), GamePhase::Initializing);
    game.start();
    run(&mut game, 30);
    assert_eq!(game.portfolio().total(), 3);
    assert_eq!(game.portfolio().visible(), 3);
    game.drain_events();

    let mut collected_ids = Vec::new();
    for _ in 0..2 {
        let target = game.portfolio().items()[0].pos;
        game.player_mut().body.pos = target;
        game.apply_input(InputEvent::KeyDown(Key::Interact));
        game.frame(DT);
        game.apply_input(InputEvent::KeyUp(Key::Interact));
        for event in game.drain_events() {
            match event {
                GameEvent::ProjectCollected { id } => collected_ids.push(id),
                GameEvent::SessionComplete { collected, total, .. } => {
                    assert_eq!((collected, total), (2, 3));
                    let json = serde_json::to_value(GameEvent::SessionComplete {
                        elapsed_secs: 1.5,
                        collected,
                        total,
                    })
                    .unwrap();
                    assert_eq!(json["event"], "sessionComplete");
                    assert_eq!(json["elapsedSecs"], 1.5);
                }
                _ => {}
            }
        }
    }

    assert_eq!(collected_ids.len(), 2);
    assert_ne!(collected_ids[0], collected_ids[1]);
    assert_eq!(game.phase(), GamePhase::Complete);
    let summary = game.session_summary();
    assert!(summary.complete);
    assert_eq!(summary.projects_required, 2);
    assert!(!game.frame(DT));
}

#[test]
fn test_death_sends_player_home_with_progress_kept() {
    let mut game = quiet_game(5);
    game.load_catalog(
        (0..4)
            .map(|i| folio_runner::ContentRecord::new(format!("{i}"), format!("P{i}")))
            .collect(),
    );
    game.start();
    run(&mut game, 30);

    let target = game.portfolio().items()[0].pos;
    game.player_mut().body.pos = target;
    game.apply_input(InputEvent::KeyDown(Key::Interact));
    game.frame(DT);
    game.apply_input(InputEvent::KeyUp(Key::Interact));
    assert_eq!(game.portfolio().collected(), 1);
    game.drain_events();

    assert!(game.kill_player());
    game.frame(DT);
    let events = game.drain_events();
    assert!(events.contains(&GameEvent::OpenDeathModal));
    assert_eq!(game.portfolio().collected(), 1);
    assert!(game.player().health.is_full());
    assert_eq!(game.phase(), GamePhase::Playing);
}

#[test]
fn test_events_serialize_with_dom_names() {
    let event = GameEvent::ProjectProximity { near: true };
    let json = serde_json::to_string(&event).unwrap();
    assert_eq!(json, r#"{"event":"projectProximity","near":true}"#);
    assert_eq!(event.name(), "projectProximity");
}
