//! clustered surface trees

use std::collections::BTreeSet;

use rand::Rng;

use crate::config::WorldConfig;
use crate::constants::{AIR_ID, TREE_CLUSTER_RANGE, TREE_MIN_SPACING};
use crate::error::Result;
use crate::grid::TileGrid;
use crate::registry::{TileRegistry, TREE_BASE};

/// `(x, surface_y)` of every tree base
pub type TreeSet = BTreeSet<(usize, usize)>;

/// ground under all three columns, open air right above them
pub fn valid_spawn_point(grid: &TileGrid, registry: &TileRegistry, x: usize, y: usize) -> bool {
    if x == 0 || y == 0 || x + 1 >= grid.width() || y >= grid.height() {
        return false;
    }
    (x - 1..=x + 1).all(|cx| {
        let ground = grid.get(cx, y).unwrap_or(AIR_ID);
        let above = grid.get(cx, y - 1).unwrap_or(AIR_ID);
        ground != AIR_ID && !registry.is_liquid(ground) && above == AIR_ID
    })
}

/// trees on row `y` within `range` columns of `x`
pub fn tree_neighbors(trees: &TreeSet, x: usize, y: usize, range: usize, left: bool, right: bool) -> usize {
    let mut count = 0;
    if left {
        count += (1..=range).filter(|dx| x >= *dx && trees.contains(&(x - dx, y))).count();
    }
    if right {
        count += (1..=range).filter(|dx| trees.contains(&(x + dx, y))).count();
    }
    count
}

/// base chance (percent) plus a tenth of it for every tree already growing to the left
pub fn tree_probability(base: u32, trees: &TreeSet, x: usize, y: usize) -> f32 {
    let base = base as f32;
    let neighbors = tree_neighbors(trees, x, y, TREE_CLUSTER_RANGE, true, false) as f32;
    base + base / 10.0 * neighbors
}

pub fn place_trees<R: Rng>(
    grid: &mut TileGrid,
    config: &WorldConfig,
    registry: &TileRegistry,
    surface: &[usize],
    rng: &mut R,
) -> Result<TreeSet> {
    let tree_base = registry.id_of(TREE_BASE)?;
    let band_w = config.biome_width();
    let mut trees = TreeSet::new();

    for (biome, params) in config.biomes.iter().enumerate() {
        let Some(base) = params.tree_prob else { continue };
        let start = biome * band_w;
        let end = (start + band_w).min(surface.len());

        for x in start..end {
            let y = surface[x];
            if !valid_spawn_point(grid, registry, x, y)
                || tree_neighbors(&trees, x, y, TREE_MIN_SPACING, true, true) > 0
            {
                continue;
            }
            if rng.gen_range(0..=100u32) as f32 <= tree_probability(base, &trees, x, y) {
                trees.insert((x, y));
                grid.set(x, y, tree_base)?;
            }
        }
    }
    Ok(trees)
}
