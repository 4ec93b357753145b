//! player spawn, input, per‑frame physics & biome tracking

use bevy::input::ButtonInput;
use bevy::prelude::*;

use crate::components::*;
use crate::constants::*;
use crate::physics::step_body;
use crate::world::TileWorld;

/* ===========================================================
   spawn (after the world exists)
   =========================================================== */
pub fn spawn_player_system(mut commands: Commands, world: Option<Res<TileWorld>>) {
    let Some(world) = world else { return };
    let pos = world.spawn_position(Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT));
    commands.spawn((Player, Body::player(pos), MoveInput::default()));
}

/* ===========================================================
   input (A / D / Space); absent in headless runs
   =========================================================== */
pub fn player_input_system(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut q: Query<&mut MoveInput, With<Player>>,
) {
    let Some(keys) = keys else { return };
    for mut input in &mut q {
        input.direction = match (keys.pressed(KeyCode::KeyA), keys.pressed(KeyCode::KeyD)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        input.jump = keys.just_pressed(KeyCode::Space);
    }
}

/* ===========================================================
   physics & collision
   =========================================================== */
pub fn physics_system(
    time: Res<Time>,
    world: Option<Res<TileWorld>>,
    mut q: Query<(&mut Body, &mut MoveInput)>,
) {
    let Some(world) = world else { return };
    let dt = time.delta_secs();
    let surroundings = world.surroundings();
    for (mut body, mut input) in &mut q {
        step_body(&mut body, *input, &surroundings, dt);
        // jump is edge‑triggered
        input.jump = false;
    }
}

/* ===========================================================
   active biome follows the player
   =========================================================== */
pub fn active_biome_system(world: Option<ResMut<TileWorld>>, q: Query<&Body, With<Player>>) {
    let Some(mut world) = world else { return };
    let Ok(body) = q.get_single() else { return };

    let last = world.grid().width().saturating_sub(1);
    let column = ((body.center_x() / TILE_SIZE).max(0.0) as usize).min(last);
    if world.config().biome_at_column(column) == world.active_biome() {
        return;
    }
    if let Err(e) = world.set_active_biome(column) {
        error!("active biome update failed: {e}");
    }
}
