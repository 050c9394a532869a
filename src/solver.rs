use std::collections::VecDeque;

use log::{debug, error};

use crate::grid::{Maze, Point};
use crate::path::{self, PathTrace};

/// A discovered-but-not-yet-finalized tile. The distance is the path cost
/// computed when the tile was discovered, not when it is dequeued.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FrontierNode {
    pub pos: Point,
    pub distance: u32,
}

/// FIFO queue of frontier nodes: push at the tail, pop at the head, no
/// reordering, no priority. Expanding in discovery order is what makes the
/// search breadth-first.
#[derive(Clone, Debug, Default)]
pub struct Frontier {
    nodes: VecDeque<FrontierNode>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: FrontierNode) {
        self.nodes.push_back(node);
    }

    pub fn pop(&mut self) -> Option<FrontierNode> {
        self.nodes.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Callbacks a renderer registers on the [Solver]. All methods default to
/// no-ops so hosts implement only what they draw.
pub trait MazeObserver {
    /// A tile was dequeued and its distance finalized.
    fn tile_visited(&mut self, _pos: Point) {}

    /// The goal's distance was finalized.
    fn solved(&mut self) {}

    /// The frontier emptied before the goal was reached.
    fn unsolvable(&mut self) {}

    /// One cell of the reconstructed path, goal first.
    fn path_step(&mut self, _pos: Point) {}
}

/// Execution state of the solver.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SolverState {
    /// The frontier holds only the seed; nothing is finalized yet.
    Idle,
    /// [Solver::tick] advances the search.
    Running,
    /// Ticks are ignored; in-flight state is kept and resumable.
    Paused,
    /// The goal was finalized.
    Solved,
    /// The frontier emptied with the goal unreached.
    Unsolvable,
}

/// Breadth-first search over a [Maze], one tile expansion per [Solver::step]
/// so a host can animate the flood. Drive it manually with
/// [Solver::step]/[Solver::skip], or from a clock with
/// [Solver::play]/[Solver::pause]/[Solver::tick].
pub struct Solver {
    frontier: Frontier,
    state: SolverState,
    observers: Vec<Box<dyn MazeObserver>>,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// A solver seeded with the origin at distance 0. Pair it with a
    /// freshly constructed (or [Solver::reset]) maze.
    pub fn new() -> Self {
        Self {
            frontier: Self::seed(),
            state: SolverState::Idle,
            observers: Vec::new(),
        }
    }

    fn seed() -> Frontier {
        let mut frontier = Frontier::new();
        frontier.push(FrontierNode {
            pos: Point::new(0, 0),
            distance: 0,
        });
        frontier
    }

    /// Registers a renderer callback. Observers are invoked in
    /// registration order.
    pub fn add_observer(&mut self, observer: Box<dyn MazeObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Abandons the current search: clears the maze's search fields,
    /// re-seeds the frontier with the origin and returns to
    /// [SolverState::Idle]. The tile layout is kept, so the same maze can
    /// be solved again without repainting.
    pub fn reset(&mut self, maze: &mut Maze) {
        maze.reset_search();
        self.frontier = Self::seed();
        self.state = SolverState::Idle;
    }

    /// True while the search can make progress: the goal is not finalized
    /// and the frontier is non-empty.
    pub fn can_step(&self, maze: &Maze) -> bool {
        !maze.is_solved() && !self.frontier.is_empty()
    }

    /// Expands a single tile: dequeues the head of the frontier, commits
    /// its distance (which locks the maze against edits), then enqueues
    /// every in-bounds, passable, unexplored neighbor with the cost of
    /// stepping onto it added. Emits [MazeObserver::tile_visited] for the
    /// expanded tile. No-op once the maze is solved or the frontier is
    /// empty.
    ///
    /// The frontier is a plain FIFO, so a cell first discovered through a
    /// cost-2 [Slow](crate::grid::Tile::Slow) edge keeps that distance even
    /// if a cheaper route through a later dequeue exists; distances next to
    /// slow terrain are an approximation of the true minimum.
    pub fn step(&mut self, maze: &mut Maze) {
        if maze.is_solved() {
            return;
        }
        let Some(node) = self.frontier.pop() else {
            return;
        };
        maze.finalize(node.pos, node.distance);

        for neighbor in node.pos.neighbors() {
            if !maze.in_bounds(neighbor) || maze.is_explored(neighbor) {
                continue;
            }
            let Some(cost) = maze.tile(neighbor).step_cost() else {
                continue;
            };
            maze.mark_explored(neighbor);
            self.frontier.push(FrontierNode {
                pos: neighbor,
                distance: node.distance + cost,
            });
        }

        self.emit(|o| o.tile_visited(node.pos));
    }

    /// Timer-driven loop body: call this on every clock tick while
    /// animating. Does nothing unless [SolverState::Running]; announces the
    /// terminal state once the search has finished.
    pub fn tick(&mut self, maze: &mut Maze) {
        if self.state != SolverState::Running {
            return;
        }
        if maze.is_solved() {
            debug!("goal finalized at distance {:?}", *maze.distance(maze.goal()));
            self.state = SolverState::Solved;
            self.emit(|o| o.solved());
        } else if self.frontier.is_empty() {
            error!("the maze has no solution");
            self.state = SolverState::Unsolvable;
            self.emit(|o| o.unsolvable());
        } else {
            self.step(maze);
        }
    }

    /// Drains the search synchronously. Emits [MazeObserver::solved] once
    /// if the goal ends up finalized; an already-finished solver emits
    /// nothing.
    pub fn skip(&mut self, maze: &mut Maze) {
        while self.can_step(maze) {
            self.step(maze);
        }
        if maze.is_solved() {
            if self.state != SolverState::Solved {
                self.state = SolverState::Solved;
                self.emit(|o| o.solved());
            }
        } else {
            self.state = SolverState::Unsolvable;
        }
    }

    /// Starts consuming ticks. Ignored in the terminal states; [Solver::reset]
    /// first to search again.
    pub fn play(&mut self) {
        if matches!(self.state, SolverState::Idle | SolverState::Paused) {
            self.state = SolverState::Running;
        }
    }

    /// Stops consuming ticks without touching the frontier or the maze.
    pub fn pause(&mut self) {
        if self.state == SolverState::Running {
            self.state = SolverState::Paused;
        }
    }

    /// Reconstructs the path on a solved maze, emitting
    /// [MazeObserver::path_step] for every cell, goal first. See
    /// [path::reconstruct] for the preconditions.
    pub fn trace_path(&mut self, maze: &Maze) -> PathTrace {
        let trace = path::reconstruct(maze);
        for &cell in &trace.cells {
            self.emit(|o| o.path_step(cell));
        }
        trace
    }

    fn emit(&mut self, event: impl Fn(&mut dyn MazeObserver)) {
        for observer in self.observers.iter_mut() {
            event(observer.as_mut());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::{Maze, Tile};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    enum Event {
        Visited(Point),
        Solved,
        Unsolvable,
        PathStep(Point),
    }

    #[derive(Clone, Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<Event>>>,
    }

    impl MazeObserver for Recorder {
        fn tile_visited(&mut self, pos: Point) {
            self.events.borrow_mut().push(Event::Visited(pos));
        }

        fn solved(&mut self) {
            self.events.borrow_mut().push(Event::Solved);
        }

        fn unsolvable(&mut self) {
            self.events.borrow_mut().push(Event::Unsolvable);
        }

        fn path_step(&mut self, pos: Point) {
            self.events.borrow_mut().push(Event::PathStep(pos));
        }
    }

    fn recorded_solver() -> (Solver, Rc<RefCell<Vec<Event>>>) {
        let recorder = Recorder::default();
        let events = recorder.events.clone();
        let mut solver = Solver::new();
        solver.add_observer(Box::new(recorder));
        (solver, events)
    }

    #[test]
    fn fresh_search_state() {
        let mut maze = Maze::empty(3).unwrap();
        let mut solver = Solver::new();
        solver.reset(&mut maze);

        assert_eq!(solver.state(), SolverState::Idle);
        assert!(maze.distances.iter().flatten().all(|d| d.is_none()));
        assert!(maze.is_explored(Point::new(0, 0)));
        assert_eq!(maze.explored.iter().flatten().filter(|e| **e).count(), 1);

        solver.step(&mut maze);
        assert_eq!(*maze.distance(Point::new(0, 0)), Some(0));
    }

    #[test]
    fn manhattan_distances_on_an_open_grid() {
        let mut maze = Maze::empty(3).unwrap();
        let mut solver = Solver::new();
        solver.skip(&mut maze);

        assert_eq!(solver.state(), SolverState::Solved);
        for x in 0..3 {
            for y in 0..3 {
                assert_eq!(*maze.distance(Point::new(x, y)), Some((x + y) as u32));
            }
        }
    }

    #[test]
    fn drain_outcomes_are_mutually_exclusive() {
        for walled in [false, true] {
            let mut maze = Maze::empty(2).unwrap();
            if walled {
                maze.set_tile(Point::new(0, 1), Tile::Wall);
                maze.set_tile(Point::new(1, 0), Tile::Wall);
            }
            let mut solver = Solver::new();
            while solver.can_step(&maze) {
                solver.step(&mut maze);
            }
            if walled {
                assert!(!maze.is_solved() && solver.frontier().is_empty());
            } else {
                assert!(maze.is_solved());
            }
        }
    }

    #[test]
    fn walled_off_goal_is_unsolvable() {
        let mut maze = Maze::empty(2).unwrap();
        maze.set_tile(Point::new(0, 1), Tile::Wall);
        maze.set_tile(Point::new(1, 0), Tile::Wall);

        let (mut solver, events) = recorded_solver();
        solver.skip(&mut maze);

        assert_eq!(solver.state(), SolverState::Unsolvable);
        assert!(!maze.is_solved());
        assert!(solver.frontier().is_empty());
        assert!(!events.borrow().contains(&Event::Solved));
    }

    #[test]
    fn dequeue_distances_never_decrease_on_a_uniform_grid() {
        let mut maze = Maze::empty(4).unwrap();
        let (mut solver, events) = recorded_solver();
        solver.skip(&mut maze);

        let distances: Vec<u32> = events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Visited(p) => Some(maze.distance(*p).unwrap()),
                _ => None,
            })
            .collect();
        assert!(!distances.is_empty());
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn skip_after_solved_is_a_no_op() {
        let mut maze = Maze::empty(3).unwrap();
        let (mut solver, events) = recorded_solver();
        solver.skip(&mut maze);
        let count = events.borrow().len();
        assert_eq!(
            events.borrow().iter().filter(|e| **e == Event::Solved).count(),
            1
        );

        solver.skip(&mut maze);
        assert_eq!(events.borrow().len(), count);
    }

    #[test]
    fn slow_tiles_cost_two() {
        let mut maze = Maze::empty(2).unwrap();
        maze.set_tile(Point::new(0, 1), Tile::Slow);
        let mut solver = Solver::new();
        solver.skip(&mut maze);

        assert_eq!(*maze.distance(Point::new(1, 0)), Some(1));
        assert_eq!(*maze.distance(Point::new(0, 1)), Some(2));
        assert_eq!(*maze.distance(Point::new(1, 1)), Some(2));
    }

    #[test]
    fn step_is_a_no_op_once_the_goal_is_finalized() {
        let mut maze = Maze::empty(3).unwrap();
        maze.set_tile(Point::new(0, 1), Tile::Wall);
        maze.set_tile(Point::new(1, 1), Tile::Wall);
        let (mut solver, events) = recorded_solver();
        solver.skip(&mut maze);
        assert!(maze.is_solved());
        assert!(!solver.frontier().is_empty());

        let count = events.borrow().len();
        solver.step(&mut maze);
        assert_eq!(events.borrow().len(), count);
        assert!(maze.distance(Point::new(1, 2)).is_none());
    }

    #[test]
    fn tick_only_advances_while_running() {
        let mut maze = Maze::empty(2).unwrap();
        let (mut solver, events) = recorded_solver();

        solver.tick(&mut maze);
        assert!(events.borrow().is_empty());
        assert!(maze.distance(Point::new(0, 0)).is_none());

        solver.play();
        assert_eq!(solver.state(), SolverState::Running);
        solver.tick(&mut maze);
        assert_eq!(*maze.distance(Point::new(0, 0)), Some(0));

        solver.pause();
        assert_eq!(solver.state(), SolverState::Paused);
        let count = events.borrow().len();
        solver.tick(&mut maze);
        assert_eq!(events.borrow().len(), count);
    }

    #[test]
    fn tick_announces_solved_once() {
        let mut maze = Maze::empty(2).unwrap();
        let (mut solver, events) = recorded_solver();
        solver.play();
        for _ in 0..16 {
            solver.tick(&mut maze);
        }
        assert_eq!(solver.state(), SolverState::Solved);
        assert_eq!(
            events.borrow().iter().filter(|e| **e == Event::Solved).count(),
            1
        );

        // terminal: further play/tick are ignored
        solver.play();
        solver.tick(&mut maze);
        assert_eq!(
            events.borrow().iter().filter(|e| **e == Event::Solved).count(),
            1
        );
    }

    #[test]
    fn tick_reports_unsolvable_mazes() {
        let mut maze = Maze::empty(2).unwrap();
        maze.set_tile(Point::new(0, 1), Tile::Wall);
        maze.set_tile(Point::new(1, 0), Tile::Wall);
        let (mut solver, events) = recorded_solver();
        solver.play();
        for _ in 0..8 {
            solver.tick(&mut maze);
        }
        assert_eq!(solver.state(), SolverState::Unsolvable);
        assert_eq!(
            events
                .borrow()
                .iter()
                .filter(|e| **e == Event::Unsolvable)
                .count(),
            1
        );
    }

    #[test]
    fn stepping_locks_editing_until_reset() {
        let mut maze = Maze::empty(3).unwrap();
        let mut solver = Solver::new();
        solver.step(&mut maze);
        assert!(maze.is_locked());
        maze.set_tile(Point::new(1, 1), Tile::Wall);
        assert_eq!(maze.tile(Point::new(1, 1)), Tile::Empty);

        solver.reset(&mut maze);
        assert!(!maze.is_locked());
        maze.set_tile(Point::new(1, 1), Tile::Wall);
        assert_eq!(maze.tile(Point::new(1, 1)), Tile::Wall);
    }

    #[test]
    fn reset_allows_resolving_the_same_layout() {
        let mut maze = Maze::empty(3).unwrap();
        maze.set_tile(Point::new(1, 0), Tile::Wall);
        let mut solver = Solver::new();
        solver.skip(&mut maze);
        assert!(maze.is_solved());

        solver.reset(&mut maze);
        assert_eq!(solver.state(), SolverState::Idle);
        assert_eq!(maze.tile(Point::new(1, 0)), Tile::Wall);
        assert!(!maze.is_solved());

        solver.skip(&mut maze);
        assert!(maze.is_solved());
    }

    #[test]
    fn single_cell_maze_solves_immediately() {
        let mut maze = Maze::empty(1).unwrap();
        let mut solver = Solver::new();
        solver.skip(&mut maze);
        assert_eq!(solver.state(), SolverState::Solved);
        assert_eq!(*maze.distance(Point::new(0, 0)), Some(0));

        let trace = solver.trace_path(&maze);
        assert_eq!(trace.cells, vec![Point::new(0, 0)]);
        assert_eq!(trace.total_cost, 0);
    }

    #[test]
    fn trace_path_emits_every_cell() {
        let mut maze = Maze::empty(3).unwrap();
        let (mut solver, events) = recorded_solver();
        solver.skip(&mut maze);

        let trace = solver.trace_path(&maze);
        let steps: Vec<Point> = events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::PathStep(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(steps, trace.cells);
    }
}
