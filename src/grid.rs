//! fixed‑extent tile grid & per‑column height map (row‑0 = top)

use serde::{Deserialize, Serialize};

use crate::constants::AIR_ID;
use crate::error::{Result, WorldError};
use crate::registry::TileId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    /// row‑major: `y * width + x`
    tiles: Vec<TileId>,
}

impl TileGrid {
    /// all air
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![AIR_ID; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, tiles: Vec<TileId>) -> Result<Self> {
        if tiles.len() != width * height {
            return Err(WorldError::InvalidConfig(format!(
                "tile map holds {} cells, expected {width}×{height}",
                tiles.len()
            )));
        }
        Ok(Self { width, height, tiles })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> Result<usize> {
        if x < self.width && y < self.height {
            Ok(y * self.width + x)
        } else {
            Err(WorldError::OutOfBounds { x: x as i64, y: y as i64 })
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Result<TileId> {
        Ok(self.tiles[self.idx(x, y)?])
    }

    /// signed lookup for the resolver; `None` outside the grid
    #[inline]
    pub fn at(&self, x: i32, y: i32) -> Option<TileId> {
        if self.in_bounds(x as i64, y as i64) {
            Some(self.tiles[y as usize * self.width + x as usize])
        } else {
            None
        }
    }

    /// raw write; runtime callers go through `TileWorld::set_tile`
    pub(crate) fn set(&mut self, x: usize, y: usize, id: TileId) -> Result<()> {
        let i = self.idx(x, y)?;
        self.tiles[i] = id;
        Ok(())
    }

    pub fn as_slice(&self) -> &[TileId] {
        &self.tiles
    }

    /// `(x, y, id)` for every cell
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, TileId)> + '_ {
        let w = self.width;
        self.tiles.iter().enumerate().map(move |(i, id)| (i % w, i / w, *id))
    }
}

/// surface elevation per column, in tile rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightMap {
    columns: Vec<f32>,
}

impl HeightMap {
    pub fn new(columns: Vec<f32>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, x: usize) -> Result<f32> {
        self.columns
            .get(x)
            .copied()
            .ok_or(WorldError::OutOfBounds { x: x as i64, y: 0 })
    }

    /// integer surface row, kept inside a grid of `rows` rows
    pub fn surface_level(&self, x: usize, rows: usize) -> Result<usize> {
        let elev = self.get(x)?;
        Ok((elev.max(0.0) as usize).min(rows.saturating_sub(1)))
    }

    pub fn surface_levels(&self, rows: usize) -> Vec<usize> {
        self.columns
            .iter()
            .map(|e| (e.max(0.0) as usize).min(rows.saturating_sub(1)))
            .collect()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_bounds() {
        let mut grid = TileGrid::new(4, 3);
        assert_eq!(grid.get(3, 2), Ok(AIR_ID));
        assert_eq!(grid.get(4, 0), Err(WorldError::OutOfBounds { x: 4, y: 0 }));
        assert!(grid.set(0, 3, 5).is_err());
        grid.set(1, 2, 7).unwrap();
        assert_eq!(grid.get(1, 2), Ok(7));
        assert_eq!(grid.at(1, 2), Some(7));
        assert_eq!(grid.at(-1, 2), None);
    }

    #[test]
    fn test_from_raw_checks_len() {
        assert!(TileGrid::from_raw(2, 2, vec![0; 3]).is_err());
        assert!(TileGrid::from_raw(2, 2, vec![0; 4]).is_ok());
    }

    #[test]
    fn test_surface_level_floors_and_clamps() {
        let hm = HeightMap::new(vec![3.9, -2.0, 120.0]);
        assert_eq!(hm.surface_level(0, 100), Ok(3));
        assert_eq!(hm.surface_level(1, 100), Ok(0));
        assert_eq!(hm.surface_level(2, 100), Ok(99));
        assert!(hm.surface_level(3, 100).is_err());
    }
}
