//! per‑axis collision resolution & gravity/jump integration
//!
//! Pixel space, y grows downward, row 0 is the top of the map. Each frame a
//! body runs: horizontal move → x collisions → vertical move → y collisions →
//! jump check.

use bevy::prelude::*;

use crate::collision::{CollisionIndex, TileRect};
use crate::components::{Body, MotionState, MoveInput};
use crate::constants::*;
use crate::grid::TileGrid;
use crate::registry::{RampSide, TileKind, TileRegistry};

/// overlaps thinner than this don't count as contact
const CONTACT_EPS: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// read‑only view of everything the resolver consults
#[derive(Clone, Copy)]
pub struct Surroundings<'a> {
    pub grid: &'a TileGrid,
    pub registry: &'a TileRegistry,
    pub index: &'a CollisionIndex,
}

impl Surroundings<'_> {
    /// out of bounds counts as neither air nor liquid
    #[inline]
    fn is_air(&self, x: i32, y: i32) -> bool {
        self.grid.at(x, y) == Some(AIR_ID)
    }

    #[inline]
    fn is_liquid(&self, x: i32, y: i32) -> bool {
        self.grid.at(x, y).is_some_and(|id| self.registry.is_liquid(id))
    }

    fn extent(&self) -> Vec2 {
        Vec2::new(self.grid.width() as f32, self.grid.height() as f32) * TILE_SIZE
    }
}

#[inline]
fn touching(a: Rect, b: Rect) -> bool {
    let i = a.intersect(b);
    i.width() > CONTACT_EPS && i.height() > CONTACT_EPS
}

/// only tiles on the leading side of travel block
#[inline]
fn ahead(velocity: f32, offset: f32) -> bool {
    velocity != 0.0 && velocity.signum() == offset.signum()
}

/* ===========================================================
   integration
   =========================================================== */
pub fn integrate_x(body: &mut Body, direction: f32, dt: f32, right_edge: f32) {
    if direction != 0.0 {
        let speed = if body.underwater {
            body.move_speed * UNDERWATER_SPEED_MUL
        } else {
            body.move_speed
        };
        body.velocity.x = direction.signum() * speed;
        body.pos.x = (body.pos.x + body.velocity.x * dt).clamp(0.0, right_edge.max(0.0));
        if body.state == MotionState::Idle {
            body.state = MotionState::Walking;
        }
    } else {
        body.velocity.x = 0.0;
        if body.state != MotionState::Jumping {
            body.state = MotionState::Idle;
        }
    }
}

/// half the gravity before the move, half after; no top clamp
pub fn integrate_y(body: &mut Body, dt: f32, bottom_edge: f32) {
    let half = body.gravity / 2.0 * dt;
    body.velocity.y += half;
    body.pos.y += body.velocity.y * dt;
    body.velocity.y += half;
    body.pos.y = body.pos.y.min(bottom_edge);
}

/// edge‑triggered; returns whether the jump happened
pub fn try_jump(body: &mut Body, pressed: bool) -> bool {
    if pressed && body.grounded && body.state != MotionState::Jumping {
        body.velocity.y -= body.jump_height;
        body.grounded = false;
        body.state = MotionState::Jumping;
        return true;
    }
    false
}

/* ===========================================================
   collision rules
   =========================================================== */

/// `tile` sits in the body's foot row with enough air above it for the body,
/// plus the cell above‑behind its head
pub fn can_step_over(body: &Body, tile: IVec2, dir: f32, s: &Surroundings) -> bool {
    if body.velocity.y != 0.0 {
        return false;
    }
    // anything higher than the feet is a wall, never a step
    let foot_row = ((body.bottom() - CONTACT_EPS) / TILE_SIZE).floor() as i32;
    if tile.y != foot_row {
        return false;
    }
    let rows = (body.size.y / TILE_SIZE).ceil() as i32;
    (1..=rows).all(|i| s.is_air(tile.x, tile.y - i)) && s.is_air(tile.x - dir.signum() as i32, tile.y - rows)
}

fn collide_x(body: &mut Body, tile: &TileRect, s: &Surroundings) {
    let dir = body.velocity.x.signum();
    if can_step_over(body, tile.tile, dir, s) {
        if body.grounded {
            body.pos.y = tile.rect.min.y - body.size.y;
        }
        return;
    }
    body.pos.x = if dir > 0.0 { tile.rect.min.x - body.size.x } else { tile.rect.max.x };
    body.velocity.x = 0.0;
    body.state = MotionState::Idle;
}

fn collide_y(body: &mut Body, rect: Rect) {
    if body.velocity.y < 0.0 {
        body.pos.y = rect.max.y;
    } else {
        body.pos.y = rect.min.y - body.size.y;
        body.grounded = true;
        if body.state == MotionState::Jumping {
            body.state = MotionState::Idle;
        }
    }
    body.velocity.y = 0.0;
}

/// slope line under the body's centre
pub fn ramp_surface(rect: Rect, side: RampSide, center_x: f32) -> f32 {
    let rel_x = (center_x - rect.min.x).clamp(0.0, TILE_SIZE);
    match side {
        RampSide::Left => rect.min.y + (TILE_SIZE - rel_x),
        RampSide::Right => rect.min.y + rel_x,
    }
}

/// clamps only while moving down; `stick` keeps a walking body on a descending slope
fn collide_ramp(body: &mut Body, rect: Rect, side: RampSide, stick: bool) {
    if body.velocity.y <= 0.0 {
        return;
    }
    let ramp_y = ramp_surface(rect, side, body.center_x());
    let feet = body.bottom();
    // feet must be inside the ramp's row, never snap a body up through it
    if feet < rect.min.y || feet > rect.max.y + TILE_SIZE / 2.0 {
        return;
    }
    if feet > ramp_y || stick {
        body.pos.y = ramp_y - body.size.y;
        body.velocity.y = 0.0;
        body.grounded = true;
        if body.state == MotionState::Jumping {
            body.state = MotionState::Idle;
        }
    }
}

/// every footprint cell, from the tile holding the top edge down, holds liquid
pub fn is_underwater(body: &Body, s: &Surroundings) -> bool {
    let w = ((body.size.x / TILE_SIZE) as i32).max(1);
    let h = ((body.size.y / TILE_SIZE) as i32).max(1);
    let origin = (body.pos / TILE_SIZE).floor().as_ivec2();
    (0..w).all(|dx| (0..h).all(|dy| s.is_liquid(origin.x + dx, origin.y + dy)))
}

/// re‑evaluated every call, never sticky
pub fn update_submersion(body: &mut Body, s: &Surroundings) {
    body.underwater = is_underwater(body, s);
    if body.underwater {
        body.gravity = body.default_gravity / UNDERWATER_GRAVITY_DIV;
        body.jump_height = body.default_jump_height / UNDERWATER_JUMP_DIV;
    } else {
        body.gravity = body.default_gravity;
        body.jump_height = body.default_jump_height;
    }
}

/// resolve one axis against the nearby tiles; never fails
pub fn resolve_axis(body: &mut Body, axis: Axis, s: &Surroundings) {
    let near = s.index.query(body.rect());
    if near.is_empty() {
        body.grounded = false;
        body.state = MotionState::Jumping;
        update_submersion(body, s);
        return;
    }

    let was_grounded = body.grounded;
    if axis == Axis::Y && body.velocity.y > 0.0 {
        body.grounded = false;
    }

    // slopes first, so a ramp lifts the body before the tile beside it blocks
    let (ramps, flat): (Vec<_>, Vec<_>) = near.into_iter().partition(|t| {
        s.grid.at(t.tile.x, t.tile.y).is_some_and(|id| s.registry.is_ramp(id))
    });

    for tile in ramps.iter().chain(flat.iter()) {
        if !touching(body.rect(), tile.rect) {
            continue;
        }
        let Some(id) = s.grid.at(tile.tile.x, tile.tile.y) else { continue };
        match s.registry.kind_of(id) {
            Ok(TileKind::Ramp { side, .. }) => {
                // walking down the slope keeps the feet on it
                let downhill = match side {
                    RampSide::Right => body.velocity.x > 0.0,
                    RampSide::Left => body.velocity.x < 0.0,
                };
                collide_ramp(body, tile.rect, side, axis == Axis::Y && was_grounded && downhill)
            }
            Ok(kind) if kind.is_solid() => match axis {
                Axis::X if ahead(body.velocity.x, tile.rect.center().x - body.center_x()) => {
                    collide_x(body, tile, s)
                }
                Axis::Y if ahead(body.velocity.y, tile.rect.center().y - body.rect().center().y) => {
                    collide_y(body, tile.rect)
                }
                _ => {}
            },
            _ => {}
        }
    }
    update_submersion(body, s);
}

/// one frame for one body
pub fn step_body(body: &mut Body, input: MoveInput, s: &Surroundings, dt: f32) {
    let extent = s.extent();
    integrate_x(body, input.direction, dt, extent.x - body.size.x);
    resolve_axis(body, Axis::X, s);
    integrate_y(body, dt, extent.y - body.size.y);
    resolve_axis(body, Axis::Y, s);
    try_jump(body, input.jump);
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    struct Scene {
        grid: TileGrid,
        registry: TileRegistry,
        index: CollisionIndex,
    }

    impl Scene {
        /// solid ground from `ground_row` down
        fn new(width: usize, height: usize, ground_row: usize) -> Self {
            let registry = TileRegistry::shipped().unwrap();
            let stone = registry.id_of("stone").unwrap();
            let mut grid = TileGrid::new(width, height);
            for x in 0..width {
                for y in ground_row..height {
                    grid.set(x, y, stone).unwrap();
                }
            }
            let index = CollisionIndex::build(&grid, &registry);
            Self { grid, registry, index }
        }

        fn put(&mut self, x: usize, y: usize, name: &str) {
            let id = self.registry.id_of(name).unwrap();
            self.grid.set(x, y, id).unwrap();
            self.index.resync(&self.grid, &self.registry, x, y).unwrap();
        }

        fn view(&self) -> Surroundings<'_> {
            Surroundings { grid: &self.grid, registry: &self.registry, index: &self.index }
        }
    }

    fn standing_at(tile_x: f32, ground_row: usize) -> Body {
        let mut body = Body::player(Vec2::new(tile_x * TILE_SIZE, ground_row as f32 * TILE_SIZE - PLAYER_HEIGHT));
        body.grounded = true;
        body.state = MotionState::Idle;
        body
    }

    #[test]
    fn test_gravity_half_steps() {
        let mut body = Body::player(Vec2::ZERO);
        integrate_y(&mut body, 0.1, 10_000.0);
        assert_eq!(body.velocity.y, 120.0);
        assert!((body.pos.y - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_bottom_edge_clamp() {
        let mut body = Body::player(Vec2::new(0.0, 95.0));
        integrate_y(&mut body, 1.0, 100.0);
        assert_eq!(body.pos.y, 100.0);
    }

    #[test]
    fn test_free_fall_without_tiles() {
        let scene = Scene::new(20, 20, 20);
        let mut body = standing_at(5.0, 5);
        step_body(&mut body, MoveInput::default(), &scene.view(), DT);
        assert!(!body.grounded);
        assert_eq!(body.state, MotionState::Jumping);
        assert!(body.velocity.y > 0.0);
    }

    #[test]
    fn test_lands_on_ground() {
        let scene = Scene::new(20, 20, 10);
        let mut body = Body::player(Vec2::new(5.0 * TILE_SIZE, 40.0));
        for _ in 0..120 {
            step_body(&mut body, MoveInput::default(), &scene.view(), DT);
        }
        assert!(body.grounded);
        assert_eq!(body.state, MotionState::Idle);
        assert_eq!(body.bottom(), 10.0 * TILE_SIZE);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_wall_blocks_walking() {
        let mut scene = Scene::new(20, 20, 10);
        for y in 4..10 {
            scene.put(8, y, "stone");
        }
        let mut body = standing_at(5.0, 10);
        let right = MoveInput { direction: 1.0, jump: false };
        for _ in 0..60 {
            step_body(&mut body, right, &scene.view(), DT);
        }
        assert_eq!(body.pos.x + body.size.x, 8.0 * TILE_SIZE);
        assert_eq!(body.bottom(), 10.0 * TILE_SIZE);
    }

    #[test]
    fn test_steps_onto_single_tile() {
        let mut scene = Scene::new(20, 20, 10);
        scene.put(8, 9, "stone");
        let mut body = standing_at(5.0, 10);
        let right = MoveInput { direction: 1.0, jump: false };
        let mut climbed = false;
        for _ in 0..30 {
            step_body(&mut body, right, &scene.view(), DT);
            let over_step = body.pos.x + body.size.x > 8.0 * TILE_SIZE + 1.0 && body.pos.x < 9.0 * TILE_SIZE;
            if over_step && body.bottom() == 9.0 * TILE_SIZE {
                climbed = true;
            }
        }
        assert!(climbed);
        assert!(body.pos.x > 9.0 * TILE_SIZE, "kept walking past the step");
    }

    #[test]
    fn test_body_high_wall_is_not_a_step() {
        let mut scene = Scene::new(20, 20, 10);
        scene.put(8, 8, "stone");
        scene.put(8, 9, "stone");
        let mut body = standing_at(5.0, 10);
        let right = MoveInput { direction: 1.0, jump: false };
        for _ in 0..60 {
            step_body(&mut body, right, &scene.view(), DT);
            assert_eq!(body.bottom(), 10.0 * TILE_SIZE, "lifted onto the wall");
        }
        assert_eq!(body.pos.x + body.size.x, 8.0 * TILE_SIZE);
        assert_eq!(body.state, MotionState::Idle);
    }

    #[test]
    fn test_step_needs_tile_at_feet() {
        let mut scene = Scene::new(20, 20, 10);
        scene.put(8, 8, "stone");
        let body = standing_at(7.0, 10);
        let view = scene.view();
        // head‑high tile with air above and behind it
        assert!(!can_step_over(&body, IVec2::new(8, 8), 1.0, &view));
        scene.put(8, 8, "air");
        scene.put(8, 9, "stone");
        assert!(can_step_over(&body, IVec2::new(8, 9), 1.0, &scene.view()));
    }

    #[test]
    fn test_ceiling_stops_jump() {
        let mut scene = Scene::new(20, 20, 10);
        for x in 3..8 {
            scene.put(x, 6, "stone");
        }
        let mut body = standing_at(5.0, 10);
        // settle, then jump
        step_body(&mut body, MoveInput::default(), &scene.view(), DT);
        step_body(&mut body, MoveInput { direction: 0.0, jump: true }, &scene.view(), DT);
        assert_eq!(body.state, MotionState::Jumping);
        let mut lowest_top = f32::MAX;
        for _ in 0..30 {
            step_body(&mut body, MoveInput::default(), &scene.view(), DT);
            lowest_top = lowest_top.min(body.pos.y);
        }
        assert!(lowest_top >= 7.0 * TILE_SIZE - 1e-3);
    }

    #[test]
    fn test_jump_needs_ground() {
        let mut body = Body::player(Vec2::ZERO);
        assert!(!try_jump(&mut body, true));
        body.grounded = true;
        body.state = MotionState::Idle;
        assert!(!try_jump(&mut body, false));
        assert!(try_jump(&mut body, true));
        assert_eq!(body.velocity.y, -JUMP_HEIGHT);
        assert!(!try_jump(&mut body, true));
    }

    #[test]
    fn test_ramp_surface_lines() {
        let rect = TileRect::new(2, 3).rect;
        let (left, top) = (rect.min.x, rect.min.y);
        assert_eq!(ramp_surface(rect, RampSide::Right, left), top);
        assert_eq!(ramp_surface(rect, RampSide::Right, left + TILE_SIZE), top + TILE_SIZE);
        assert_eq!(ramp_surface(rect, RampSide::Left, left), top + TILE_SIZE);
        assert_eq!(ramp_surface(rect, RampSide::Left, left + TILE_SIZE), top);
        assert_eq!(ramp_surface(rect, RampSide::Left, left + 4.0), top + 12.0);
    }

    #[test]
    fn test_walking_down_ramp_is_smooth() {
        // ground at row 10 left of column 8, row 11 from column 8 on, ramp on the high side
        let mut scene = Scene::new(20, 20, 11);
        for x in 0..8 {
            scene.put(x, 10, "stone");
        }
        scene.put(7, 10, "stone ramp right");
        let mut body = standing_at(4.0, 10);
        let right = MoveInput { direction: 1.0, jump: false };
        let mut prev = body.pos.y;
        for _ in 0..40 {
            step_body(&mut body, right, &scene.view(), DT);
            assert!((body.pos.y - prev).abs() <= TILE_SIZE, "jumped {} px", body.pos.y - prev);
            prev = body.pos.y;
        }
        assert!(body.pos.x > 9.0 * TILE_SIZE);
        assert!(body.grounded);
        assert_eq!(body.bottom(), 11.0 * TILE_SIZE);
    }

    #[test]
    fn test_walking_up_ramp_is_smooth() {
        let mut scene = Scene::new(20, 20, 11);
        for x in 8..20 {
            scene.put(x, 10, "stone");
        }
        scene.put(8, 10, "stone ramp left");
        let mut body = standing_at(4.0, 11);
        let right = MoveInput { direction: 1.0, jump: false };
        let mut prev = body.pos.y;
        for _ in 0..40 {
            step_body(&mut body, right, &scene.view(), DT);
            assert!((body.pos.y - prev).abs() <= TILE_SIZE);
            prev = body.pos.y;
        }
        assert!(body.pos.x > 10.0 * TILE_SIZE, "was stopped at {}", body.pos.x);
        assert_eq!(body.bottom(), 10.0 * TILE_SIZE);
    }

    #[test]
    fn test_underwater_toggles_with_footprint() {
        let mut scene = Scene::new(20, 20, 12);
        for x in 0..6 {
            for y in 0..12 {
                scene.put(x, y, "water");
            }
        }
        scene.put(3, 4, "stone");
        let mut body = Body::player(Vec2::new(2.0 * TILE_SIZE, 3.0 * TILE_SIZE));
        update_submersion(&mut body, &scene.view());
        assert!(body.underwater);
        assert_eq!(body.gravity, GRAVITY / UNDERWATER_GRAVITY_DIV);
        assert_eq!(body.jump_height, JUMP_HEIGHT / UNDERWATER_JUMP_DIV);

        body.pos.x += TILE_SIZE;
        update_submersion(&mut body, &scene.view());
        assert!(!body.underwater);
        assert_eq!(body.gravity, GRAVITY);
    }

    #[test]
    fn test_head_above_water_is_not_submerged() {
        let mut scene = Scene::new(20, 20, 12);
        for x in 0..6 {
            for y in 5..12 {
                scene.put(x, y, "water");
            }
        }
        // top edge inside row 4 (air), the rest of the body in water
        let mut body = Body::player(Vec2::new(2.0 * TILE_SIZE, 4.6 * TILE_SIZE));
        update_submersion(&mut body, &scene.view());
        assert!(!body.underwater);

        body.pos.y = 5.0 * TILE_SIZE;
        update_submersion(&mut body, &scene.view());
        assert!(body.underwater);
    }

    #[test]
    fn test_underwater_halves_speed() {
        let mut body = Body::player(Vec2::ZERO);
        body.underwater = true;
        integrate_x(&mut body, 1.0, 1.0, 10_000.0);
        assert_eq!(body.velocity.x, MOVE_SPEED * UNDERWATER_SPEED_MUL);
    }

    #[test]
    fn test_side_edges_clamp() {
        let mut body = Body::player(Vec2::new(5.0, 0.0));
        integrate_x(&mut body, -1.0, 1.0, 100.0);
        assert_eq!(body.pos.x, 0.0);
        integrate_x(&mut body, 1.0, 1.0, 100.0);
        assert_eq!(body.pos.x, 100.0);
        assert_eq!(body.state, MotionState::Jumping, "airborne state is kept");
    }
}
