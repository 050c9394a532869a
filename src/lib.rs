//! # mazestep
//!
//! The core of an interactive grid-maze visualizer: paint walls on a
//! square grid, then watch a
//! [breadth-first search](https://en.wikipedia.org/wiki/Breadth-first_search)
//! flood the grid one tile per step and trace the shortest path back to
//! the origin. The crate owns the data model, the step-wise solver state
//! machine and the path reconstruction; rendering and input belong to the
//! host application, which registers a [MazeObserver] for events and draws
//! from the [Maze]'s public fields.
//!
//! ```
//! use mazestep::{Maze, MazeConfig, Solver};
//!
//! let mut maze = Maze::random(&MazeConfig::default()).unwrap();
//! let mut solver = Solver::new();
//! solver.skip(&mut maze);
//! if maze.is_solved() {
//!     let trace = solver.trace_path(&maze);
//!     println!("path of {} tiles", trace.cells.len());
//! }
//! ```

pub mod grid;
pub mod path;
pub mod solver;

pub use grid::{Distance, Maze, MazeConfig, Point, Tile};
pub use path::{reconstruct, PathTrace};
pub use solver::{Frontier, FrontierNode, MazeObserver, Solver, SolverState};
