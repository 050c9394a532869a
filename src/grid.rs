use std::fmt::{self, Display};
use std::ops::{Deref, DerefMut};

use anyhow::{ensure, Result};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Terrain kind of a single maze cell.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Tile {
    #[default]
    Empty,
    Wall,
    /// Passable, but twice as expensive to step onto as [Tile::Empty].
    Slow,
}

impl Tile {
    /// Cost of stepping onto this tile, or [None] for impassable walls.
    pub fn step_cost(&self) -> Option<u32> {
        match self {
            Tile::Empty => Some(1),
            Tile::Slow => Some(2),
            Tile::Wall => None,
        }
    }

    pub fn is_passable(&self) -> bool {
        self.step_cost().is_some()
    }
}

impl Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Tile::Empty => " ",
                Tile::Wall => "X",
                Tile::Slow => "$",
            }
        )
    }
}

/// A cell coordinate. Signed so that neighbor candidates can fall outside
/// the grid and be rejected by [Maze::in_bounds] instead of underflowing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four axis-aligned neighbors, always in +x, -x, +y, -y order.
    /// Path reconstruction relies on this order to break distance ties.
    pub fn neighbors(&self) -> [Point; 4] {
        [
            Point::new(self.x + 1, self.y),
            Point::new(self.x - 1, self.y),
            Point::new(self.x, self.y + 1),
            Point::new(self.x, self.y - 1),
        ]
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Finalized distance of one cell from the origin. [None] until the solver
/// commits a value at dequeue time.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Distance(Option<u32>);

impl Deref for Distance {
    type Target = Option<u32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Distance {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(d) => write!(f, "{:3} ", d),
            None => write!(f, "  . "),
        }
    }
}

/// Settings for creating a maze, as supplied by a host's settings form.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct MazeConfig {
    pub size: usize,
    pub wall_probability: f64,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            size: 20,
            wall_probability: 0.0,
        }
    }
}

impl MazeConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.size > 0, "maze size must be at least 1");
        ensure!(
            (0.0..=1.0).contains(&self.wall_probability),
            "wall probability must lie in [0, 1], got {}",
            self.wall_probability
        );
        Ok(())
    }
}

/// The maze: the tile layout plus the search bookkeeping that the solver
/// writes and a renderer reads.
///
/// Indexing is x-first (`tiles[x][y]`). The search runs from the origin at
/// the top-left corner to the goal at the bottom-right corner; neither is
/// ever a wall. The vector fields are public so a renderer can draw them,
/// but must be treated as read-only outside this crate; all mutation goes
/// through [Maze::set_tile], [Maze::reset_search] and the solver.
#[derive(Clone, Debug)]
pub struct Maze {
    pub size: usize,
    pub tiles: Vec<Vec<Tile>>,
    pub distances: Vec<Vec<Distance>>,
    pub explored: Vec<Vec<bool>>,
    locked: bool,
}

impl Maze {
    /// An all-empty maze of the given size.
    pub fn empty(size: usize) -> Result<Maze> {
        ensure!(size > 0, "maze size must be at least 1");
        let mut maze = Maze {
            size,
            tiles: vec![vec![Tile::Empty; size]; size],
            distances: vec![vec![Distance::default(); size]; size],
            explored: vec![vec![false; size]; size],
            locked: false,
        };
        maze.reset_search();
        Ok(maze)
    }

    /// Generates a maze from `config`, drawing each cell independently
    /// from `rng`: a wall with probability `wall_probability`, empty
    /// otherwise (one `gen_bool` draw per cell). Pass a seeded
    /// [rand::rngs::StdRng] for a reproducible layout. The origin and goal
    /// are cleared afterwards.
    pub fn generate(config: &MazeConfig, rng: &mut impl Rng) -> Result<Maze> {
        config.validate()?;
        let mut maze = Maze::empty(config.size)?;
        for column in maze.tiles.iter_mut() {
            for tile in column.iter_mut() {
                if rng.gen_bool(config.wall_probability) {
                    *tile = Tile::Wall;
                }
            }
        }
        maze.clear_ends();
        Ok(maze)
    }

    /// [Maze::generate] with [rand::thread_rng].
    pub fn random(config: &MazeConfig) -> Result<Maze> {
        Maze::generate(config, &mut rand::thread_rng())
    }

    /// The search origin, fixed at the top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(0, 0)
    }

    /// The search goal, fixed at the bottom-right corner.
    pub fn goal(&self) -> Point {
        Point::new(self.size as i32 - 1, self.size as i32 - 1)
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.size && (p.y as usize) < self.size
    }

    pub fn tile(&self, p: Point) -> Tile {
        self.tiles[p.x as usize][p.y as usize]
    }

    pub fn distance(&self, p: Point) -> Distance {
        self.distances[p.x as usize][p.y as usize]
    }

    pub fn is_explored(&self, p: Point) -> bool {
        self.explored[p.x as usize][p.y as usize]
    }

    /// Paints one cell. Ignored for coordinates outside the grid and while
    /// the maze is locked: painting and solving are mutually exclusive.
    /// The origin and goal are re-cleared after every edit, so walling
    /// either endpoint has no effect.
    pub fn set_tile(&mut self, p: Point, tile: Tile) {
        if !self.in_bounds(p) {
            debug!("ignoring edit outside the grid at {}", p);
            return;
        }
        if self.locked {
            debug!("ignoring edit at {} while the maze is locked", p);
            return;
        }
        self.tiles[p.x as usize][p.y as usize] = tile;
        self.clear_ends();
    }

    /// True once the goal's distance has been finalized.
    pub fn is_solved(&self) -> bool {
        self.distance(self.goal()).is_some()
    }

    /// True while any finalized distance exists; edits are ignored until
    /// [Maze::reset_search].
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Clears the distance field and explored set without touching the
    /// tiles, so the same layout can be solved again. The origin starts
    /// explored: it is seeded into the frontier, never discovered.
    pub fn reset_search(&mut self) {
        for column in self.distances.iter_mut() {
            for distance in column.iter_mut() {
                *distance = Distance::default();
            }
        }
        for column in self.explored.iter_mut() {
            for explored in column.iter_mut() {
                *explored = false;
            }
        }
        self.explored[0][0] = true;
        self.locked = false;
    }

    // Origin and goal are never walls.
    fn clear_ends(&mut self) {
        self.tiles[0][0] = Tile::Empty;
        self.tiles[self.size - 1][self.size - 1] = Tile::Empty;
    }

    pub(crate) fn finalize(&mut self, p: Point, distance: u32) {
        *self.distances[p.x as usize][p.y as usize] = Some(distance);
        self.locked = true;
    }

    pub(crate) fn mark_explored(&mut self, p: Point) {
        self.explored[p.x as usize][p.y as usize] = true;
    }
}

impl Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                write!(f, "{}", self.tiles[x][y])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
