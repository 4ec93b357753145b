//! 2‑D tile world: seeded procedural generation plus the collision layer
//! that moving bodies resolve against every frame.

pub mod collision;
pub mod components;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod physics;
pub mod player;
pub mod registry;
pub mod terrain;
pub mod world;

use bevy::prelude::*;

pub use collision::{CollisionIndex, TileRect};
pub use components::{Body, MotionState, MoveInput, Player};
pub use config::{BiomeConfig, WorldConfig};
pub use error::{Result, WorldError};
pub use grid::{HeightMap, TileGrid};
pub use registry::{TileId, TileKind, TileRegistry};
pub use world::{TileWorld, WorldSnapshot};

use player::{active_biome_system, physics_system, player_input_system, spawn_player_system};
use world::generate_world_system;

/// generates the world at startup and steps every body each frame
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldConfig>()
            .add_systems(Startup, (generate_world_system, spawn_player_system).chain())
            .add_systems(
                Update,
                (
                    player_input_system, // A / D + jump
                    physics_system,      // move & collide
                    active_biome_system, // lazy cave masks
                )
                    .chain(),
            );
    }
}
