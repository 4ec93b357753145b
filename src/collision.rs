//! cell‑bucketed rectangles of every solid tile

use std::collections::HashMap;

use bevy::log::info;
use bevy::prelude::*;

use crate::constants::{CELL_SIZE, TILE_SIZE};
use crate::error::{Result, WorldError};
use crate::grid::TileGrid;
use crate::registry::TileRegistry;

/// pixel rect of one tile plus the tile it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRect {
    pub tile: IVec2,
    pub rect: Rect,
}

impl TileRect {
    pub fn new(x: i32, y: i32) -> Self {
        let min = Vec2::new(x as f32, y as f32) * TILE_SIZE;
        Self {
            tile: IVec2::new(x, y),
            rect: Rect::from_corners(min, min + Vec2::splat(TILE_SIZE)),
        }
    }
}

#[inline]
pub fn cell_of(tile: IVec2) -> IVec2 {
    IVec2::new(tile.x.div_euclid(CELL_SIZE), tile.y.div_euclid(CELL_SIZE))
}

/// tile containing a pixel position (y grows downward)
#[inline]
pub fn tile_at(pos: Vec2) -> IVec2 {
    (pos / TILE_SIZE).floor().as_ivec2()
}

#[derive(Debug, Clone, Default)]
pub struct CollisionIndex {
    cells: HashMap<IVec2, Vec<TileRect>>,
    width: usize,
    height: usize,
}

impl CollisionIndex {
    /// one rect per solid tile
    pub fn build(grid: &TileGrid, registry: &TileRegistry) -> Self {
        let mut index = Self {
            cells: HashMap::new(),
            width: grid.width(),
            height: grid.height(),
        };
        for (x, y, id) in grid.iter() {
            if registry.is_solid(id) {
                let r = TileRect::new(x as i32, y as i32);
                index.cells.entry(cell_of(r.tile)).or_default().push(r);
            }
        }
        info!("collision index: {} rects in {} cells", index.len(), index.cell_count());
        index
    }

    /// every rect in the cells `rect` overlaps; callers do the exact test
    pub fn query(&self, rect: Rect) -> Vec<TileRect> {
        let lo = cell_of(tile_at(rect.min));
        let hi = cell_of(tile_at(rect.max));
        let mut out = Vec::new();
        for cx in lo.x..=hi.x {
            for cy in lo.y..=hi.y {
                if let Some(bucket) = self.cells.get(&IVec2::new(cx, cy)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
        out
    }

    /// bring `(x, y)` back in line with the grid; call right after every write
    pub fn resync(&mut self, grid: &TileGrid, registry: &TileRegistry, x: usize, y: usize) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(WorldError::OutOfBounds { x: x as i64, y: y as i64 });
        }
        let r = TileRect::new(x as i32, y as i32);
        let cell = cell_of(r.tile);
        if registry.is_solid(grid.get(x, y)?) {
            let bucket = self.cells.entry(cell).or_default();
            if !bucket.contains(&r) {
                bucket.push(r);
            }
        } else if let Some(bucket) = self.cells.get_mut(&cell) {
            // grid already reads non‑solid here, so the rect can go
            bucket.retain(|t| t.tile != r.tile);
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
        Ok(())
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        let tile = IVec2::new(x, y);
        self.cells
            .get(&cell_of(tile))
            .is_some_and(|bucket| bucket.iter().any(|t| t.tile == tile))
    }

    /// total rects
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Vec::is_empty)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TileGrid, TileRegistry) {
        (TileGrid::new(40, 40), TileRegistry::shipped().unwrap())
    }

    #[test]
    fn test_build_skips_air_and_liquid() {
        let (mut grid, reg) = setup();
        grid.set(3, 3, reg.id_of("stone").unwrap()).unwrap();
        grid.set(4, 3, reg.id_of("water").unwrap()).unwrap();
        grid.set(5, 3, reg.id_of("dirt ramp left").unwrap()).unwrap();
        let index = CollisionIndex::build(&grid, &reg);
        assert_eq!(index.len(), 2);
        assert!(index.contains(3, 3));
        assert!(!index.contains(4, 3));
        assert!(index.contains(5, 3));
    }

    #[test]
    fn test_query_covers_overlapped_cells() {
        let (mut grid, reg) = setup();
        let stone = reg.id_of("stone").unwrap();
        grid.set(9, 9, stone).unwrap();
        grid.set(10, 10, stone).unwrap();
        grid.set(30, 30, stone).unwrap();
        let index = CollisionIndex::build(&grid, &reg);

        // straddles the border between cell (0,0) and cell (1,1)
        let area = Rect::new(9.5 * TILE_SIZE, 9.5 * TILE_SIZE, 10.5 * TILE_SIZE, 10.5 * TILE_SIZE);
        let tiles: Vec<IVec2> = index.query(area).iter().map(|t| t.tile).collect();
        assert!(tiles.contains(&IVec2::new(9, 9)));
        assert!(tiles.contains(&IVec2::new(10, 10)));
        assert!(!tiles.contains(&IVec2::new(30, 30)));
    }

    #[test]
    fn test_resync_add_then_remove() {
        let (mut grid, reg) = setup();
        let mut index = CollisionIndex::build(&grid, &reg);
        let area = TileRect::new(5, 5).rect;

        grid.set(5, 5, reg.id_of("iron").unwrap()).unwrap();
        index.resync(&grid, &reg, 5, 5).unwrap();
        index.resync(&grid, &reg, 5, 5).unwrap();
        let hits: Vec<_> = index.query(area).into_iter().filter(|t| t.tile == IVec2::new(5, 5)).collect();
        assert_eq!(hits.len(), 1, "no duplicate rect");
        assert_eq!(hits[0].rect, area);

        grid.set(5, 5, 0).unwrap();
        index.resync(&grid, &reg, 5, 5).unwrap();
        assert!(index.query(area).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_rect_kept_while_grid_still_solid() {
        let (mut grid, reg) = setup();
        grid.set(2, 2, reg.id_of("stone").unwrap()).unwrap();
        let mut index = CollisionIndex::build(&grid, &reg);
        index.resync(&grid, &reg, 2, 2).unwrap();
        assert!(index.contains(2, 2));
    }

    #[test]
    fn test_solid_replaced_by_water_is_dropped() {
        let (mut grid, reg) = setup();
        grid.set(2, 2, reg.id_of("stone").unwrap()).unwrap();
        let mut index = CollisionIndex::build(&grid, &reg);
        grid.set(2, 2, reg.id_of("water").unwrap()).unwrap();
        index.resync(&grid, &reg, 2, 2).unwrap();
        assert!(!index.contains(2, 2));
    }

    #[test]
    fn test_resync_out_of_bounds() {
        let (grid, reg) = setup();
        let mut index = CollisionIndex::build(&grid, &reg);
        assert_eq!(
            index.resync(&grid, &reg, 40, 0),
            Err(WorldError::OutOfBounds { x: 40, y: 0 })
        );
    }
}
