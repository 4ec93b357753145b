use std::ops::RangeInclusive;

/// -------- tiles & world size --------
pub const TILE_SIZE: f32      = 16.0;
pub const MAP_WIDTH: usize    = 3000;
pub const MAP_HEIGHT: usize   =  200;

/// collision buckets are CELL_SIZE × CELL_SIZE tiles
pub const CELL_SIZE: i32      =   10;

/// reserved ids
pub const AIR_ID: u16         =    0;
pub const EXTENDED_ID: u16    =    1;

/// -------- generation --------
pub const DEFAULT_SEED: u64   = 3638;
/// fraction of a biome band blended into the next biome
pub const BLEND_FRACTION: usize = 5;
/// relative-depth band thresholds (last band is implicit)
pub const DEPTH_BANDS: [f32; 3] = [0.1, 0.2, 0.3];

/// caves start this many tiles under the surface (one screen height)
pub const CAVE_MIN_DEPTH: RangeInclusive<usize> = 22..=45;

pub const LAKE_WIDTH: RangeInclusive<usize> = 8..=40;
pub const LAKE_DEPTH: RangeInclusive<usize> = 4..=16;

/// no tree within this many columns of another
pub const TREE_MIN_SPACING: usize = 2;
/// columns (left side) counted towards clustering
pub const TREE_CLUSTER_RANGE: usize = 10;

/// -------- body phys (pixels, y grows downward) --------
pub const PLAYER_WIDTH: f32   = 16.0;
pub const PLAYER_HEIGHT: f32  = 32.0;
pub const GRAVITY: f32        = 1200.0;
pub const JUMP_HEIGHT: f32    =  350.0;
pub const MOVE_SPEED: f32     =  500.0;

/// underwater: gravity / 10, jump height / 1.25, speed / 2
pub const UNDERWATER_GRAVITY_DIV: f32 = 10.0;
pub const UNDERWATER_JUMP_DIV: f32    = 1.25;
pub const UNDERWATER_SPEED_MUL: f32   = 0.5;
