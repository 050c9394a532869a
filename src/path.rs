//! Walking a solved distance field back from the goal to the origin.

use crate::grid::{Maze, Point};

/// The reconstructed route, goal first, origin last.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathTrace {
    pub cells: Vec<Point>,
    pub start: Point,
    pub goal: Point,
    pub total_cost: u32,
}

/// Walks the distance field from the goal back to the origin, stepping to
/// the in-bounds neighbor with the strictly smallest finalized distance
/// (ties broken by the +x, -x, +y, -y enumeration order; unreached
/// neighbors never win). Valid because finalized distances form a
/// non-increasing chain from goal to origin.
///
/// Panics if the maze is not solved, or if the walk reaches a cell with no
/// finalized neighbor; both mean the caller skipped the [Maze::is_solved]
/// check.
pub fn reconstruct(maze: &Maze) -> PathTrace {
    let goal = maze.goal();
    let total_cost = maze
        .distance(goal)
        .expect("path reconstruction requires a solved maze");

    let mut current = goal;
    let mut cells = vec![current];

    while current != maze.origin() {
        let mut best: Option<(Point, u32)> = None;
        for neighbor in current.neighbors() {
            if !maze.in_bounds(neighbor) {
                continue;
            }
            let Some(distance) = *maze.distance(neighbor) else {
                continue;
            };
            if best.map_or(true, |(_, smallest)| distance < smallest) {
                best = Some((neighbor, distance));
            }
        }
        let Some((next, _)) = best else {
            panic!("no finalized neighbor below {current} in the distance field");
        };
        current = next;
        cells.push(current);
    }

    PathTrace {
        cells,
        start: maze.origin(),
        goal,
        total_cost,
    }
}
