//! Frame composition
//!
//! Turns a read-only view of the game into one draw list, back to front.

use glam::Vec2;

use super::draw::{DrawList, with_alpha};
use super::font::{self, GLYPH_ROWS};
use super::sprites::{PLAYER_SHEET, PLAYER_SPRITE_SIZE};
use super::vertex::colors;
use crate::Rect;
use crate::consts::ENTITY_DYING_SECONDS;
use crate::sim::camera::Facing;
use crate::sim::entity::EntityState;
use crate::sim::game::Game;
use crate::sim::item::ItemKind;
use crate::sim::particles::{HealthChange, ParticleKind};
use crate::sim::portfolio::PortfolioItem;
use crate::sim::tilemap::EDGES;

const HEALTH_BAR_SIZE: Vec2 = Vec2::new(0.9, 0.1);
const TOOLTIP_SIZE: Vec2 = Vec2::new(3.2, 1.4);
/// Gap between a collectible and the bottom of its tooltip card
const TOOLTIP_GAP: f32 = 0.4;
const TOOLTIP_PADDING: f32 = 0.2;
/// Size of one font pixel on the card (world units)
const TOOLTIP_CELL: f32 = 0.06;
const GLOW_FILL_ALPHA: f32 = 0.35;

pub fn build_frame(game: &Game) -> DrawList {
    let mut list = DrawList::new();
    let camera = game.camera();

    list.background(camera.screen_size(), colors::BACKGROUND_TOP, colors::BACKGROUND_BOTTOM);

    draw_tiles(&mut list, game);

    for item in game.items().items() {
        if !item.visible() {
            continue;
        }
        let pos = item.render_pos();
        let bounds = Rect::new(pos.x, pos.y, item.size, item.size);
        if !camera.is_visible(&bounds) {
            continue;
        }
        let center = bounds.center();
        match item.kind {
            ItemKind::SpeedBoost => {
                list.circle(camera, center, item.size * 0.5, item.kind.color());
                list.arrow(camera, center - Vec2::X * 1.6, center, colors::WHITE);
            }
            ItemKind::Health => {
                list.circle(camera, center, item.size * 0.5, with_alpha(colors::WHITE, 0.85));
                list.plus_glyph(camera, center, item.size * 0.6, item.kind.color());
            }
        }
    }

    for item in game.portfolio().items() {
        let scale = item.render_scale();
        if scale <= 0.0 {
            continue;
        }
        let size = item.size * scale;
        let center = item.center() + Vec2::new(0.0, item.bob_offset());
        let bounds = Rect::new(center.x - size * 0.5, center.y - size * 0.5, size, size);
        if !camera.is_visible(&bounds) {
            continue;
        }
        list.rect(camera, bounds, colors::PORTFOLIO);
        list.rect_outline(camera, bounds, 0.06, colors::PORTFOLIO_RIM);

        if item.tooltip_opacity > 0.0 {
            let card = TOOLTIP_SIZE * item.tooltip_scale();
            let rect = Rect::new(
                center.x - card.x * 0.5,
                bounds.y - TOOLTIP_GAP - card.y,
                card.x,
                card.y,
            );
            list.rect(camera, rect, with_alpha(colors::TOOLTIP, item.tooltip_opacity));
            list.rect_outline(
                camera,
                rect,
                0.05,
                with_alpha(colors::TOOLTIP_BORDER, item.tooltip_opacity),
            );
            draw_tooltip_text(&mut list, game, item, rect);
        }
    }

    for entity in game.entities() {
        let alpha = match entity.state {
            EntityState::Alive => 1.0,
            EntityState::Dying { remaining } => remaining / ENTITY_DYING_SECONDS,
        };
        let b = entity.body.bounds();
        let bounds = Rect::new(b.x, b.y + entity.bob_offset(), b.w, b.h);
        if !camera.is_visible(&bounds) {
            continue;
        }
        list.rect(camera, bounds, with_alpha(colors::ENTITY, alpha));
        let eye_x = bounds.center().x + entity.direction * bounds.w * 0.2;
        list.circle(
            camera,
            Vec2::new(eye_x, bounds.y + bounds.h * 0.35),
            bounds.h * 0.15,
            with_alpha(colors::ENTITY_EYE, alpha),
        );
    }

    let player = game.player();
    let body = player.body.bounds();
    let dest = Rect::new(
        body.center().x - PLAYER_SPRITE_SIZE * 0.5,
        body.bottom() - PLAYER_SPRITE_SIZE,
        PLAYER_SPRITE_SIZE,
        PLAYER_SPRITE_SIZE,
    );
    let tint = if player.invincible {
        with_alpha(colors::WHITE, 0.6)
    } else {
        colors::WHITE
    };
    list.sprite(
        camera,
        &PLAYER_SHEET,
        player.animation(),
        player.animation_frame(),
        dest,
        player.facing == Facing::Left,
        tint,
    );

    if player.health.enabled {
        let anchor = player.health_bar_anchor();
        let opacity = game.health_bar_opacity();
        list.bar(
            camera,
            Rect::new(
                anchor.x - HEALTH_BAR_SIZE.x * 0.5,
                anchor.y - HEALTH_BAR_SIZE.y,
                HEALTH_BAR_SIZE.x,
                HEALTH_BAR_SIZE.y,
            ),
            player.health.fraction(),
            with_alpha(colors::HEALTH_FILL, opacity),
            with_alpha(colors::HEALTH_BACK, opacity),
        );
    }

    for p in game.particles().particles() {
        match p.kind {
            ParticleKind::Spark => {
                list.circle(camera, p.pos, p.size * 0.5, with_alpha(p.color, p.alpha));
            }
            ParticleKind::Glyph { change, .. } => match change {
                HealthChange::Gain => {
                    list.plus_glyph(camera, p.pos, p.size, with_alpha(colors::GAIN, p.alpha))
                }
                HealthChange::Loss => {
                    list.minus_glyph(camera, p.pos, p.size, with_alpha(colors::LOSS, p.alpha))
                }
            },
        }
    }

    if let Some(target) = game.indicator_target() {
        list.arrow(camera, player.body.center(), target.center(), colors::INDICATOR);
    }

    list
}

fn draw_tiles(list: &mut DrawList, game: &Game) {
    let camera = game.camera();
    let map = game.map();
    let trail = game.player().trail();
    let glow_enabled = game.settings().effective_tile_glow();
    let now = game.clock();

    let (x0, y0, x1, y1) = camera.visible_tile_range();
    for y in y0.max(0)..=y1.min(map.height() as i32 - 1) {
        for x in x0.max(0)..=x1.min(map.width() as i32 - 1) {
            if !map.is_solid(x, y) {
                continue;
            }
            let glow = if glow_enabled {
                trail.glow(map.index_of(x as usize, y as usize), now)
            } else {
                0.0
            };
            let tile = Rect::new(x as f32, y as f32, 1.0, 1.0);
            list.rect(camera, tile, colors::TILE);
            if glow > 0.0 {
                list.rect(camera, tile, with_alpha(colors::TILE_GLOW, glow * GLOW_FILL_ALPHA));
            }
            let mask = map.mask_at(x, y);
            for edge in EDGES {
                if mask & edge != 0 {
                    list.glass_edge(camera, x, y, edge, glow);
                }
            }
        }
    }
}

/// Title line, then year and department when the record has them
fn draw_tooltip_text(list: &mut DrawList, game: &Game, item: &PortfolioItem, card: Rect) {
    let scale = item.tooltip_scale();
    let pad = TOOLTIP_PADDING * scale;
    let cell = TOOLTIP_CELL * scale;
    let max_cols = ((card.w - pad * 2.0) / cell).max(0.0) as usize;
    let line_height = cell * (GLYPH_ROWS + 2) as f32;
    let origin = Vec2::new(card.x + pad, card.y + pad);

    let title = font::fit(&item.record.title, max_cols);
    list.text(
        game.camera(),
        origin,
        &title,
        cell,
        with_alpha(colors::TOOLTIP_TITLE, item.tooltip_opacity),
    );

    let detail: Vec<&str> = [item.record.year.as_deref(), item.record.department.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect();
    if !detail.is_empty() {
        let line = font::fit(&detail.join(" - "), max_cols);
        list.text(
            game.camera(),
            origin + Vec2::Y * line_height,
            &line,
            cell,
            with_alpha(colors::TOOLTIP_DETAIL, item.tooltip_opacity),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContentRecord;
    use crate::sim::camera::ZoomRequest;
    use crate::sim::game::GameConfig;

    const ROOM: &str = "\
....................\n\
....................\n\
....................\n\
.P..................\n\
####################";

    fn game() -> Game {
        Game::new(GameConfig {
            level: Some(ROOM.to_string()),
            ..GameConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_frame_starts_with_background_and_draws_tiles() {
        let g = game();
        let list = build_frame(&g);
        let screen = g.camera().screen_size();
        assert_eq!(list.vertices()[0].position, [0.0, 0.0]);
        assert_eq!(list.vertices()[2].position, [screen.x, screen.y]);
        // background + at least a few floor tiles + the player sprite
        assert!(list.len() > 6 * 10);
        assert!(list.vertices().iter().any(|v| v.is_textured()));
    }

    #[test]
    fn test_health_bar_hidden_when_health_disabled() {
        let mut g = game();
        let with_bar = build_frame(&g).len();
        g.player_mut().health.enabled = false;
        let without_bar = build_frame(&g).len();
        assert_eq!(with_bar - without_bar, 12);
    }

    #[test]
    fn test_portfolio_items_appear_after_pop_in() {
        let mut g = game();
        // whole room in view
        g.request_zoom(ZoomRequest::Set(0.5));
        let before = build_frame(&g).len();
        g.load_catalog(vec![ContentRecord::new("a", "A")]);
        g.start();
        for _ in 0..30 {
            g.frame(1.0 / 60.0);
        }
        assert_eq!(g.portfolio().visible(), 1);
        assert!(build_frame(&g).len() > before);
    }

    fn vertices_colored(list: &DrawList, color: [f32; 4]) -> usize {
        list.vertices()
            .iter()
            .filter(|v| v.color[..3] == color[..3])
            .count()
    }

    #[test]
    fn test_tooltip_card_shows_record_title_and_year() {
        let mut g = game();
        g.request_zoom(ZoomRequest::Set(0.5));
        let mut record = ContentRecord::new("a", "Lighthouse");
        record.year = Some("2021".to_string());
        g.load_catalog(vec![record]);
        g.start();
        for _ in 0..30 {
            g.frame(1.0 / 60.0);
        }
        let list = build_frame(&g);
        assert_eq!(vertices_colored(&list, colors::TOOLTIP_TITLE), 0);

        // Stand on the project until the card has faded in
        let target = g.portfolio().items()[0].pos;
        for _ in 0..60 {
            g.player_mut().body.pos = target;
            g.frame(1.0 / 60.0);
        }
        assert!(g.portfolio().items()[0].tooltip_opacity > 0.0);

        let list = build_frame(&g);
        let title_cells: usize = "Lighthouse".chars().map(|c| font::cells(c).count()).sum();
        let year_cells: usize = "2021".chars().map(|c| font::cells(c).count()).sum();
        assert_eq!(vertices_colored(&list, colors::TOOLTIP_TITLE), title_cells * 6);
        assert_eq!(vertices_colored(&list, colors::TOOLTIP_DETAIL), year_cells * 6);
    }
}
