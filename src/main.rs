use macroquad::miniquad::conf::Platform;
use macroquad::prelude::*;

mod config;
mod effects;
mod helpers;
mod map;
mod player;
mod raycast;
mod weapon;

use config::RenderConfig;
use map::Map;
use player::{InputState, Player};
use raycast::RayCaster;

const VIEW_WIDTH: u16 = 640;
const VIEW_HEIGHT: u16 = 400;
const CONFIG_PATH: &str = "config/effects.yaml";
const LEVEL_PATH: &str = "levels/arena.txt";

fn window_conf() -> Conf {
    Conf {
        window_title: "neondash".to_owned(),
        window_width: 1280,
        window_height: 800,
        sample_count: 1,
        platform: Platform {
            linux_wm_class: "neondash",
            ..Default::default()
        },
        ..Default::default()
    }
}

fn gather_input() -> InputState {
    InputState {
        forward: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
        back: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
        strafe_left: is_key_down(KeyCode::A),
        strafe_right: is_key_down(KeyCode::D),
        turn_left: is_key_down(KeyCode::Left),
        turn_right: is_key_down(KeyCode::Right),
        // Edge-triggered: holding space does not queue another dash.
        dash: is_key_pressed(KeyCode::Space),
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let cfg = RenderConfig::load_from(CONFIG_PATH).unwrap_or_else(|err| {
        eprintln!("effects config load failed: {err}, using defaults");
        RenderConfig::default()
    });

    let mut map = Map::load_from_file(LEVEL_PATH).unwrap_or_else(|err| {
        eprintln!("level load failed: {err}, using built-in arena");
        Map::demo()
    });

    let mut player = Player::new(vec2(2.5, 2.5), vec2(1.0, 0.0));
    let mut raycaster = RayCaster::new(
        VIEW_WIDTH,
        VIEW_HEIGHT,
        cfg.palette.clone(),
        cfg.effects.clone(),
    );
    let weapon = weapon::overlay_for(&cfg.weapon);

    let frame_texture = Texture2D::from_image(raycaster.frame());
    frame_texture.set_filter(FilterMode::Nearest);

    let mut score: i32 = 0;
    let mut fps_accum: f32 = 0.0;
    let mut fps: i32 = 0;

    loop {
        let dt = get_frame_time();

        let input = gather_input();
        player.apply_input(&input, dt, &map);
        player.update(dt);

        raycaster.render(&player, &map, dt);

        // frame_hits is rebuilt on the next render; commit it now.
        let hits: Vec<raycast::TargetHit> = raycaster.frame_hits().to_vec();
        for hit in hits {
            if map.hit_target(hit.x, hit.y) {
                score += hit.points;
            }
        }

        if let Some(weapon) = &weapon {
            weapon.draw(raycaster.frame_mut(), &player);
        }

        if is_key_pressed(KeyCode::R) {
            map.reset_targets();
            score = 0;
        }
        if is_key_pressed(KeyCode::F5) {
            if let Err(err) = map.save_to_file(LEVEL_PATH) {
                eprintln!("level save failed: {err}");
            }
        }
        if is_key_pressed(KeyCode::F9) {
            match Map::load_from_file(LEVEL_PATH) {
                Ok(loaded) => {
                    map = loaded;
                    score = 0;
                }
                Err(err) => eprintln!("level load failed: {err}"),
            }
        }

        frame_texture.update(raycaster.frame());

        clear_background(BLACK);
        let scale = (screen_width() / VIEW_WIDTH as f32)
            .min(screen_height() / VIEW_HEIGHT as f32);
        let draw_w = VIEW_WIDTH as f32 * scale;
        let draw_h = VIEW_HEIGHT as f32 * scale;
        draw_texture_ex(
            &frame_texture,
            (screen_width() - draw_w) * 0.5,
            (screen_height() - draw_h) * 0.5,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(draw_w, draw_h)),
                ..Default::default()
            },
        );

        fps_accum += dt;
        if fps_accum >= 1.0 {
            fps = get_fps();
            fps_accum = 0.0;
        }
        draw_text(&format!("SCORE: {score}"), 20.0, 40.0, 30.0, WHITE);
        let dash_label = if player.is_dashing() {
            "DASH".to_string()
        } else if player.dash_cooldown_left() > 0.0 {
            format!("DASH {:.1}s", player.dash_cooldown_left())
        } else {
            "DASH READY".to_string()
        };
        draw_text(&dash_label, 20.0, 70.0, 30.0, SKYBLUE);
        draw_text(&format!("FPS: {fps}"), 20.0, 100.0, 30.0, WHITE);

        next_frame().await;
    }
}
