use std::cell::RefCell;
use std::rc::Rc;

use mazestep::{Maze, MazeConfig, MazeObserver, Point, Solver, SolverState};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Counts expansions so the summary can report how much of the grid the
/// search flooded.
#[derive(Default)]
struct StepCounter {
    expanded: Rc<RefCell<usize>>,
}

impl MazeObserver for StepCounter {
    fn tile_visited(&mut self, _pos: Point) {
        *self.expanded.borrow_mut() += 1;
    }
}

/// Usage: mazestep [size] [wall_probability] [seed]
fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = MazeConfig {
        size: match args.next() {
            Some(arg) => arg.parse()?,
            None => MazeConfig::default().size,
        },
        wall_probability: match args.next() {
            Some(arg) => arg.parse()?,
            None => 0.25,
        },
    };
    let mut maze = match args.next() {
        Some(seed) => Maze::generate(&config, &mut StdRng::seed_from_u64(seed.parse()?))?,
        None => Maze::random(&config)?,
    };

    println!("{}", maze);

    let counter = StepCounter::default();
    let expanded = counter.expanded.clone();
    let mut solver = Solver::new();
    solver.add_observer(Box::new(counter));
    solver.skip(&mut maze);

    for y in 0..maze.size {
        for x in 0..maze.size {
            print!("{}", maze.distances[x][y]);
        }
        println!();
    }
    println!("expanded {} tiles", expanded.borrow());

    match solver.state() {
        SolverState::Solved => {
            let trace = solver.trace_path(&maze);
            println!(
                "solved: {} tiles from {} back to {} at cost {}",
                trace.cells.len(),
                trace.goal,
                trace.start,
                trace.total_cost
            );
        }
        SolverState::Unsolvable => println!("the maze has no solution"),
        _ => unreachable!("skip always reaches a terminal state"),
    }

    Ok(())
}
