use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use gridlife::{pattern, step, Cell, DenseBoard, GridState, RuleSet};

fn board_with(pattern: &gridlife::Pattern, x: i64, y: i64, size: u32) -> DenseBoard {
    let mut grid = GridState::new(size, size);
    grid.place_pattern(x, y, pattern);
    grid.to_dense()
}

fn live(board: &DenseBoard) -> BTreeSet<Cell> {
    board.to_cells().into_iter().collect()
}

fn run(board: DenseBoard, rules: &RuleSet, steps: usize) -> DenseBoard {
    (0..steps).fold(board, |b, _| step(&b, rules).board)
}

#[test]
fn glider_translates_after_four_steps() {
    let start = board_with(&pattern::GLIDER, 5, 5, 20);
    let after = run(start.clone(), &RuleSet::CONWAY, 4);

    let expected: BTreeSet<Cell> = live(&start)
        .into_iter()
        .map(|c| Cell::new(c.x + 1, c.y + 1))
        .collect();
    assert_eq!(live(&after), expected);
}

#[test]
fn glider_crosses_the_wrap() {
    // 20 full periods move it 20 cells on a 20x20 torus: back where it started.
    let start = board_with(&pattern::GLIDER, 17, 17, 20);
    let after = run(start.clone(), &RuleSet::CONWAY, 80);
    assert_eq!(live(&after), live(&start));
}

#[test]
fn blinker_has_period_two() {
    let start = board_with(&pattern::BLINKER, 8, 8, 20);
    let once = run(start.clone(), &RuleSet::CONWAY, 1);
    assert_ne!(live(&once), live(&start));
    assert_eq!(run(start.clone(), &RuleSet::CONWAY, 2), start);
}

#[test]
fn block_is_a_still_life() {
    let start = board_with(&pattern::BLOCK, 9, 9, 20);
    let outcome = step(&start, &RuleSet::CONWAY);
    assert_eq!(outcome.board, start);
    assert_eq!((outcome.births, outcome.deaths), (0, 0));
}

#[test]
fn pulsar_has_period_three() {
    let start = board_with(&pattern::PULSAR, 10, 10, 40);
    assert_ne!(run(start.clone(), &RuleSet::CONWAY, 1), start);
    assert_eq!(run(start.clone(), &RuleSet::CONWAY, 3), start);
}

#[test]
fn lwss_moves_two_cells_per_period() {
    let start = board_with(&pattern::LWSS, 10, 10, 40);
    let after = run(start.clone(), &RuleSet::CONWAY, 4);
    assert_eq!(live(&after).len(), live(&start).len());
    let shifted: BTreeSet<Cell> = live(&start).into_iter().map(|c| Cell::new(c.x + 2, c.y)).collect();
    let back: BTreeSet<Cell> = live(&start).into_iter().map(|c| Cell::new(c.x - 2, c.y)).collect();
    assert!(live(&after) == shifted || live(&after) == back);
}

#[test]
fn gosper_gun_grows() {
    let start = board_with(&pattern::GOSPER_GUN, 2, 2, 60);
    let before = start.population();
    let after = run(start, &RuleSet::CONWAY, 30);
    assert!(after.population() > before);
}

#[test]
fn population_balances_births_and_deaths() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut grid = GridState::new(64, 48);
    grid.randomize(0.35, &mut rng);
    let mut board = grid.to_dense();

    for _ in 0..20 {
        let before = board.population() as u64;
        let outcome = step(&board, &RuleSet::CONWAY);
        let after = outcome.board.population() as u64;
        assert_eq!(after, before + outcome.births - outcome.deaths);
        board = outcome.board;
    }
}

#[test]
fn wrap_counts_across_corners() {
    // Three live corners make (0,0) come alive under B3.
    let board = DenseBoard::from_cells([Cell::new(9, 9), Cell::new(9, 0), Cell::new(0, 9)], 10, 10);
    assert!(step(&board, &RuleSet::CONWAY).board.get(0, 0));
}
