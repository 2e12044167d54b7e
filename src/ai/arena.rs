//! Arena grid model and builder
//!
//! Discretizes the arena ground plane (XZ) into square cells. Each cell
//! records the destructible obstacle standing on its center, if any. The
//! grid is built once per scene setup and reused by every pathfinding run.

use glam::Vec3;
use hecs::Entity;
use smallvec::SmallVec;

use crate::core::ArenaConfig;
use crate::geometry::Aabb;

/// Cell sizes at or below this are treated as degenerate
const MIN_CELL_SIZE: f32 = 0.0001;

/// Integer coordinates of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
}

impl CellCoord {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A grid cell and the obstacle occupying it
///
/// The obstacle is a plain entity handle: the grid never keeps it alive and
/// a destroyed obstacle simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub coord: CellCoord,
    pub obstacle: Option<Entity>,
}

/// Transient per-cell state owned by a single pathfinding run
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchState {
    /// Accumulated cost from the start cell
    pub cost: f32,
    /// Heuristic estimate to the goal cell
    pub heuristic: f32,
    /// Predecessor cell index
    pub parent: Option<usize>,
    /// Already expanded
    pub closed: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            cost: f32::INFINITY,
            heuristic: 0.0,
            parent: None,
            closed: false,
        }
    }
}

/// Obstacle geometry as reported by the obstacle query service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleFootprint {
    pub entity: Entity,
    pub bounds: Aabb,
}

/// Obstacle query service
///
/// Supplies obstacle geometry to the grid builder and durability to the
/// pathfinder.
pub trait ObstacleQuery {
    /// All live obstacles, in a stable enumeration order
    fn obstacles(&self) -> Vec<ObstacleFootprint>;

    /// Live obstacles whose geometry intersects `region` on the ground plane
    fn obstacles_in(&self, region: &Aabb) -> Vec<ObstacleFootprint> {
        self.obstacles()
            .into_iter()
            .filter(|o| o.bounds.intersects_xz(region))
            .collect()
    }

    /// Remaining durability of an obstacle; `None` once it no longer exists
    fn durability(&self, entity: Entity) -> Option<f32>;
}

/// A fixed 2D grid over the arena
#[derive(Debug, Clone)]
pub struct ArenaGrid {
    /// Width in cells (x)
    width: usize,
    /// Height in cells (z)
    height: usize,
    /// Cell size in world units
    cell_size: f32,
    /// World position of the grid's minimum corner
    origin: Vec3,
    cells: Vec<Cell>,
    pub(crate) search: Vec<SearchState>,
}

impl ArenaGrid {
    /// Create an empty grid. Dimensions and cell size are clamped to safe minimums.
    #[must_use]
    pub fn new(width: usize, height: usize, cell_size: f32, origin: Vec3) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let cell_size = sanitize_cell_size(cell_size);

        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell {
                coord: CellCoord::new(x, y),
                obstacle: None,
            }))
            .collect();

        Self {
            width,
            height,
            cell_size,
            origin,
            cells,
            search: vec![SearchState::default(); width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: a grid has at least one cell
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// World-space area covered by the grid
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let extent = Vec3::new(
            self.width as f32 * self.cell_size,
            0.0,
            self.height as f32 * self.cell_size,
        );
        Aabb::new(self.origin, self.origin + extent)
    }

    pub(crate) fn index(&self, coord: CellCoord) -> usize {
        coord.y * self.width + coord.x
    }

    pub(crate) fn coord_of(&self, index: usize) -> CellCoord {
        CellCoord::new(index % self.width, index / self.width)
    }

    /// Look up a cell, `None` if out of bounds
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        if coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        self.cells.get(self.index(coord))
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Assign (or clear) the obstacle occupying a cell
    pub fn set_obstacle(&mut self, coord: CellCoord, obstacle: Option<Entity>) {
        if coord.x < self.width && coord.y < self.height {
            let index = self.index(coord);
            self.cells[index].obstacle = obstacle;
        }
    }

    /// Obstacle occupying a cell
    #[must_use]
    pub fn obstacle_at(&self, coord: CellCoord) -> Option<Entity> {
        self.cell(coord).and_then(|cell| cell.obstacle)
    }

    /// Number of cells with an obstacle
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.obstacle.is_some()).count()
    }

    /// World position of a cell's center
    #[must_use]
    pub fn world_position(&self, coord: CellCoord) -> Vec3 {
        self.origin
            + Vec3::new(
                (coord.x as f32 + 0.5) * self.cell_size,
                0.0,
                (coord.y as f32 + 0.5) * self.cell_size,
            )
    }

    /// Cell containing a world position, `None` outside the grid
    #[must_use]
    pub fn world_to_cell(&self, position: Vec3) -> Option<CellCoord> {
        let (x, y) = self.raw_cell(position);
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(CellCoord::new(x as usize, y as usize))
    }

    /// Cell containing a world position, clamped onto the grid edge
    #[must_use]
    pub fn world_to_cell_clamped(&self, position: Vec3) -> CellCoord {
        let (x, y) = self.raw_cell(position);
        CellCoord::new(
            x.clamp(0, self.width as i64 - 1) as usize,
            y.clamp(0, self.height as i64 - 1) as usize,
        )
    }

    fn raw_cell(&self, position: Vec3) -> (i64, i64) {
        let local = position - self.origin;
        (
            (local.x / self.cell_size).floor() as i64,
            (local.z / self.cell_size).floor() as i64,
        )
    }

    /// 4-connected neighbors of a cell
    #[must_use]
    pub fn neighbors(&self, coord: CellCoord) -> SmallVec<[CellCoord; 4]> {
        let mut result = SmallVec::new();

        if coord.x + 1 < self.width {
            result.push(CellCoord::new(coord.x + 1, coord.y));
        }
        if coord.x > 0 {
            result.push(CellCoord::new(coord.x - 1, coord.y));
        }
        if coord.y + 1 < self.height {
            result.push(CellCoord::new(coord.x, coord.y + 1));
        }
        if coord.y > 0 {
            result.push(CellCoord::new(coord.x, coord.y - 1));
        }

        result
    }

    /// Clear search state before a pathfinding run
    pub(crate) fn reset_search(&mut self) {
        self.search.fill(SearchState::default());
    }
}

fn sanitize_cell_size(cell_size: f32) -> f32 {
    if cell_size.is_finite() && cell_size > MIN_CELL_SIZE {
        cell_size
    } else {
        1.0
    }
}

fn cells_along(length: f32, cell_size: f32) -> usize {
    ((length / cell_size).ceil() as usize).max(1)
}

/// Region the grid must cover when auto-fitting
///
/// Covers start, goal and every obstacle, padded on the ground plane and
/// floored to one unit per side.
#[must_use]
pub fn fit_region(start: Vec3, goal: Vec3, obstacles: &[ObstacleFootprint], padding: f32) -> Aabb {
    let region = obstacles
        .iter()
        .fold(Aabb::from_point(start).including(goal), |acc, o| {
            acc.union(&o.bounds)
        })
        .padded_xz(padding);

    let size = region.size_xz();
    let max = Vec3::new(
        region.min.x + size.x.max(1.0),
        region.max.y,
        region.min.z + size.y.max(1.0),
    );
    Aabb::new(region.min, max)
}

/// Build the arena grid for a start/goal pair.
///
/// With `auto_fit` the grid covers start, goal and all obstacles plus
/// padding; otherwise it is `fixed_size` centered on `origin`. Each cell is
/// assigned the first obstacle (in query order) whose footprint contains
/// its center.
#[must_use]
pub fn build_grid(
    obstacles: &dyn ObstacleQuery,
    start: Vec3,
    goal: Vec3,
    config: &ArenaConfig,
) -> ArenaGrid {
    let cell_size = sanitize_cell_size(config.cell_size);
    if cell_size != config.cell_size {
        log::warn!(
            "Degenerate cell size {}, falling back to {cell_size}",
            config.cell_size
        );
    }

    let (origin, width, height) = if config.auto_fit {
        let region = fit_region(start, goal, &obstacles.obstacles(), config.padding);
        let size = region.size_xz();
        (
            Vec3::new(region.min.x, config.origin.y, region.min.z),
            cells_along(size.x, cell_size),
            cells_along(size.y, cell_size),
        )
    } else {
        let size = config.fixed_size.max(glam::Vec2::ZERO);
        (
            config.origin - Vec3::new(size.x, 0.0, size.y) * 0.5,
            cells_along(size.x, cell_size),
            cells_along(size.y, cell_size),
        )
    };

    let mut grid = ArenaGrid::new(width, height, cell_size, origin);
    let candidates = obstacles.obstacles_in(&grid.bounds());

    for index in 0..grid.len() {
        let coord = grid.coord_of(index);
        let center = grid.world_position(coord);
        let occupant = candidates
            .iter()
            .find(|o| o.bounds.contains_xz(center))
            .map(|o| o.entity);
        grid.cells[index].obstacle = occupant;
    }

    log::info!(
        "Built arena grid {}x{} (cell size {}), {} of {} cells occupied",
        grid.width,
        grid.height,
        grid.cell_size,
        grid.occupied_count(),
        grid.len()
    );

    grid
}
