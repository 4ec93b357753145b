//! tile / object name ↔ id registry
//!
//! Ids `0` (air) and `1` (extended part of a multi‑tile object) are reserved;
//! everything else is numbered in registration order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{AIR_ID, EXTENDED_ID};
use crate::error::{Result, WorldError};

pub type TileId = u16;

pub const AIR: &str = "air";
pub const EXTENDED: &str = "item extended";
pub const WATER: &str = "water";
pub const TREE_BASE: &str = "tree base";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RampSide {
    Left,
    Right,
}

impl RampSide {
    pub fn as_str(self) -> &'static str {
        match self {
            RampSide::Left => "left",
            RampSide::Right => "right",
        }
    }
}

/// what game logic switches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Air,
    /// non‑origin cell of a multi‑tile object
    Extended,
    Solid,
    Ramp { side: RampSide, material: TileId },
    Liquid,
    /// origin cell of a placed machine / pipe / chest
    Object,
    TreeBase,
}

impl TileKind {
    /// blocks movement and lives in the collision index
    pub fn is_solid(self) -> bool {
        !matches!(self, TileKind::Air | TileKind::Liquid)
    }
}

/// static description used to build the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileClass {
    Solid,
    Ramp { side: RampSide, material: String },
    Liquid,
    Object,
    TreeBase,
}

#[derive(Debug, Clone)]
pub struct TileDef {
    pub name: String,
    pub class: TileClass,
}

impl TileDef {
    pub fn new(name: impl Into<String>, class: TileClass) -> Self {
        Self { name: name.into(), class }
    }
}

/// immutable after construction
#[derive(Debug, Clone)]
pub struct TileRegistry {
    names: Vec<String>,
    kinds: Vec<TileKind>,
    ids: HashMap<String, TileId>,
}

impl TileRegistry {
    pub fn new(defs: &[TileDef]) -> Result<Self> {
        let mut names = vec![AIR.to_string(), EXTENDED.to_string()];
        let mut kinds = vec![TileKind::Air, TileKind::Extended];
        let mut ids = HashMap::from([(AIR.to_string(), AIR_ID), (EXTENDED.to_string(), EXTENDED_ID)]);

        for def in defs {
            if ids.contains_key(&def.name) {
                return Err(WorldError::DuplicateTile(def.name.clone()));
            }
            let id = TileId::try_from(names.len())
                .map_err(|_| WorldError::InvalidConfig("too many tile types".into()))?;
            ids.insert(def.name.clone(), id);
            names.push(def.name.clone());
            // ramp materials are resolved once every name has an id
            kinds.push(TileKind::Air);
        }

        let mut registry = Self { names, kinds, ids };
        for (offset, def) in defs.iter().enumerate() {
            let kind = match &def.class {
                TileClass::Solid => TileKind::Solid,
                TileClass::Ramp { side, material } => TileKind::Ramp {
                    side: *side,
                    material: registry.id_of(material)?,
                },
                TileClass::Liquid => TileKind::Liquid,
                TileClass::Object => TileKind::Object,
                TileClass::TreeBase => TileKind::TreeBase,
            };
            registry.kinds[offset + 2] = kind;
        }
        Ok(registry)
    }

    pub fn id_of(&self, name: &str) -> Result<TileId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| WorldError::UnknownTile(name.to_string()))
    }

    pub fn name_of(&self, id: TileId) -> Result<&str> {
        self.names
            .get(id as usize)
            .map(String::as_str)
            .ok_or(WorldError::UnknownId(id))
    }

    pub fn kind_of(&self, id: TileId) -> Result<TileKind> {
        self.kinds.get(id as usize).copied().ok_or(WorldError::UnknownId(id))
    }

    /// unknown ids are never solid
    pub fn is_solid(&self, id: TileId) -> bool {
        self.kinds.get(id as usize).is_some_and(|k| k.is_solid())
    }

    pub fn is_liquid(&self, id: TileId) -> bool {
        matches!(self.kinds.get(id as usize), Some(TileKind::Liquid))
    }

    pub fn is_ramp(&self, id: TileId) -> bool {
        matches!(self.kinds.get(id as usize), Some(TileKind::Ramp { .. }))
    }

    /// base material of a ramp, the tile itself otherwise
    pub fn material_of(&self, id: TileId) -> Result<TileId> {
        match self.kind_of(id)? {
            TileKind::Ramp { material, .. } => Ok(material),
            _ => Ok(id),
        }
    }

    /// `"<material> ramp <side>"`
    pub fn ramp_of(&self, material: TileId, side: RampSide) -> Result<TileId> {
        let material = self.name_of(material)?;
        self.id_of(&format!("{material} ramp {}", side.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = (TileId, &str)> {
        self.names.iter().enumerate().map(|(i, n)| (i as TileId, n.as_str()))
    }
}

/* ===========================================================
   shipped tile table
   =========================================================== */
pub const TERRAIN_TILES: [&str; 16] = [
    "dirt", "ice", "sand", "clay", "tin", "defiled stone", "stone", "desert fossil",
    "coal", "sandstone", "silver", "copper", "gold", "iron", "hellstone", "obsidian",
];
pub const RAMP_MATERIALS: [&str; 4] = ["dirt", "sand", "stone", "ice"];
pub const PIPE_VARIANTS: usize = 11;

const PRODUCTION: [&str; 8] = [
    "burner furnace", "electric furnace", "steel furnace", "burner drill",
    "electric drill", "assembler", "boiler", "steam engine",
];
const ELECTRICITY: [&str; 2] = ["electric pole", "solar panel"];
const LOGISTICS: [&str; 5] = ["burner inserter", "electric inserter", "inlet pump", "outlet pump", "pipe"];
const STORAGE: [&str; 1] = ["chest"];
const LIQUIDS: [&str; 3] = [WATER, "lava", "honey"];

pub fn default_tile_defs() -> Vec<TileDef> {
    let mut defs: Vec<TileDef> = TERRAIN_TILES.iter().map(|n| TileDef::new(*n, TileClass::Solid)).collect();
    for material in RAMP_MATERIALS {
        for side in [RampSide::Right, RampSide::Left] {
            defs.push(TileDef::new(
                format!("{material} ramp {}", side.as_str()),
                TileClass::Ramp { side, material: material.to_string() },
            ));
        }
    }
    defs.extend(PRODUCTION.iter().map(|n| TileDef::new(*n, TileClass::Object)));
    defs.extend((0..PIPE_VARIANTS).map(|i| TileDef::new(format!("pipe {i}"), TileClass::Object)));
    defs.extend(ELECTRICITY.iter().map(|n| TileDef::new(*n, TileClass::Object)));
    defs.extend(LOGISTICS.iter().map(|n| TileDef::new(*n, TileClass::Object)));
    defs.extend(STORAGE.iter().map(|n| TileDef::new(*n, TileClass::Object)));
    defs.extend(LIQUIDS.iter().map(|n| TileDef::new(*n, TileClass::Liquid)));
    defs.push(TileDef::new(TREE_BASE, TileClass::TreeBase));
    defs
}

impl TileRegistry {
    /// registry over the shipped tile table
    pub fn shipped() -> Result<Self> {
        Self::new(&default_tile_defs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_round_trip_every_name() {
        let reg = TileRegistry::shipped().unwrap();
        let mut seen = HashSet::new();
        for (id, name) in reg.names() {
            assert_eq!(reg.id_of(name).unwrap(), id);
            assert_eq!(reg.name_of(reg.id_of(name).unwrap()).unwrap(), name);
            assert!(seen.insert(id), "id {id} assigned twice");
        }
        assert_eq!(seen.len(), reg.len());
    }

    #[test]
    fn test_reserved_ids() {
        let reg = TileRegistry::shipped().unwrap();
        assert_eq!(reg.id_of(AIR).unwrap(), 0);
        assert_eq!(reg.id_of(EXTENDED).unwrap(), 1);
        assert_eq!(reg.id_of("dirt").unwrap(), 2);
        assert_eq!(reg.kind_of(0).unwrap(), TileKind::Air);
        assert_eq!(reg.kind_of(1).unwrap(), TileKind::Extended);
    }

    #[test]
    fn test_unknown_lookups_fail() {
        let reg = TileRegistry::shipped().unwrap();
        assert_eq!(reg.id_of("mithril"), Err(WorldError::UnknownTile("mithril".into())));
        let bad = reg.len() as TileId;
        assert_eq!(reg.name_of(bad), Err(WorldError::UnknownId(bad)));
        assert!(!reg.is_solid(bad));
    }

    #[test]
    fn test_duplicate_rejected() {
        let defs = vec![TileDef::new("dirt", TileClass::Solid), TileDef::new("dirt", TileClass::Solid)];
        assert_eq!(TileRegistry::new(&defs).unwrap_err(), WorldError::DuplicateTile("dirt".into()));
    }

    #[test]
    fn test_ramp_kind_and_material() {
        let reg = TileRegistry::shipped().unwrap();
        let stone = reg.id_of("stone").unwrap();
        let ramp = reg.ramp_of(stone, RampSide::Left).unwrap();
        assert_eq!(reg.name_of(ramp).unwrap(), "stone ramp left");
        assert_eq!(
            reg.kind_of(ramp).unwrap(),
            TileKind::Ramp { side: RampSide::Left, material: stone }
        );
        assert_eq!(reg.material_of(ramp).unwrap(), stone);
        assert_eq!(reg.material_of(stone).unwrap(), stone);
        assert!(reg.is_ramp(ramp) && reg.is_solid(ramp));
    }

    #[test]
    fn test_ramp_with_unknown_material_fails() {
        let defs = vec![TileDef::new(
            "glass ramp left",
            TileClass::Ramp { side: RampSide::Left, material: "glass".into() },
        )];
        assert_eq!(TileRegistry::new(&defs).unwrap_err(), WorldError::UnknownTile("glass".into()));
    }

    #[test]
    fn test_liquids_are_not_solid() {
        let reg = TileRegistry::shipped().unwrap();
        let water = reg.id_of(WATER).unwrap();
        assert!(reg.is_liquid(water));
        assert!(!reg.is_solid(water));
        assert!(!reg.is_solid(0));
        assert!(reg.is_solid(reg.id_of(TREE_BASE).unwrap()));
    }
}
