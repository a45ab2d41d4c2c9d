use std::thread;
use std::time::{Duration, Instant};

use gridlife::{
    pattern, EditOutcome, GenerationUpdate, LifeError, SchedulerState, Simulation, SimulationConfig,
};

const WAIT: Duration = Duration::from_secs(3);

fn board(width: u32, height: u32) -> Simulation {
    Simulation::new(SimulationConfig {
        width,
        height,
        rate: 30,
        ..SimulationConfig::default()
    })
    .unwrap()
}

/// Ticks like a host loop until `done` holds, collecting every update.
fn pump(sim: &mut Simulation, mut done: impl FnMut(&Simulation) -> bool) -> Vec<GenerationUpdate> {
    let deadline = Instant::now() + WAIT;
    let mut updates = Vec::new();
    while !done(sim) {
        assert!(Instant::now() < deadline, "timed out in state {}", sim.state());
        updates.extend(sim.tick().unwrap());
        thread::sleep(Duration::from_millis(2));
    }
    updates
}

#[test]
fn three_manual_steps_arrive_in_order() {
    let mut sim = board(20, 20);
    let _ = sim.place_pattern(5, 5, &pattern::GLIDER);

    sim.step_once().unwrap();
    sim.step_once().unwrap();
    sim.step_once().unwrap();

    let updates = sim.settle(WAIT).unwrap();
    assert_eq!(updates.len(), 3);
    for (i, update) in updates.iter().enumerate() {
        assert_eq!(update.generation, i as u64 + 1);
        assert_eq!(update.population, 5);
    }
    assert_eq!(sim.state(), SchedulerState::Idle);

    // One more brings the glider back to its shape, shifted by (1, 1).
    sim.step_once().unwrap();
    sim.settle(WAIT).unwrap();
    let shifted: Vec<(u32, u32)> = sim.grid().sorted_cells().iter().map(|c| (c.x, c.y)).collect();
    let mut expected: Vec<(u32, u32)> = pattern::GLIDER.cells.iter().map(|&(dx, dy)| (6 + dx, 6 + dy)).collect();
    expected.sort_by_key(|&(x, y)| (y, x));
    assert_eq!(shifted, expected);
}

#[test]
fn continuous_run_publishes_consecutive_generations() {
    let mut sim = board(30, 30);
    let _ = sim.place_pattern(10, 10, &pattern::BLINKER);
    sim.start().unwrap();

    let updates = pump(&mut sim, |s| s.grid().generation() >= 5);
    assert_eq!(sim.state(), SchedulerState::Running);
    let generations: Vec<u64> = updates.iter().map(|u| u.generation).collect();
    assert_eq!(generations, (1..=generations.len() as u64).collect::<Vec<_>>());

    sim.stop();
    assert_eq!(sim.state(), SchedulerState::Idle);
}

#[test]
fn results_after_stop_are_discarded() {
    let mut sim = board(30, 30);
    let _ = sim.place_pattern(10, 10, &pattern::GLIDER);
    sim.start().unwrap();
    pump(&mut sim, |s| s.grid().generation() >= 1);

    sim.stop();
    let generation = sim.grid().generation();
    let cells = sim.grid().sorted_cells();

    thread::sleep(Duration::from_millis(100));
    assert!(sim.tick().unwrap().is_empty());
    assert_eq!(sim.grid().generation(), generation);
    assert_eq!(sim.grid().sorted_cells(), cells);

    // Editing works again.
    assert_eq!(sim.toggle(0, 0), EditOutcome::Applied);
}

#[test]
fn rule_change_mid_run_applies_to_next_generation() {
    let mut sim = board(20, 20);
    let _ = sim.place_pattern(5, 5, &pattern::BLOCK);
    sim.start().unwrap();
    pump(&mut sim, |s| s.grid().generation() >= 2);
    assert_eq!(sim.grid().population(), 4);

    // Under B/S nothing survives and nothing is born.
    sim.set_rules("B/S").unwrap();
    let target = sim.grid().generation() + 2;
    pump(&mut sim, |s| s.grid().generation() >= target);
    assert_eq!(sim.grid().population(), 0);
    assert_eq!(sim.state(), SchedulerState::Running);
    sim.stop();
}

#[test]
fn rate_bounds_step_frequency() {
    let mut sim = board(20, 20);
    let _ = sim.place_pattern(5, 5, &pattern::BLINKER);
    assert_eq!(sim.set_rate(0), 1);
    assert_eq!(sim.set_rate(100), 30);
    assert_eq!(sim.set_rate(5), 5);

    sim.start().unwrap();
    // First step fires as soon as the run is acknowledged.
    pump(&mut sim, |s| s.grid().generation() >= 1);
    let started = Instant::now();
    pump(&mut sim, |s| s.grid().generation() >= 3);
    // Two more steps at 5/s need at least ~400ms.
    assert!(started.elapsed() >= Duration::from_millis(350));
    sim.stop();
}

#[test]
fn rate_change_while_running_keeps_the_run_going() {
    let mut sim = board(20, 20);
    let _ = sim.place_pattern(5, 5, &pattern::BLINKER);
    sim.start().unwrap();
    pump(&mut sim, |s| s.grid().generation() >= 2);

    assert_eq!(sim.set_rate(4), 4);
    let from = sim.grid().generation();
    let slowed = Instant::now();
    let updates = pump(&mut sim, |s| s.grid().generation() >= from + 3);
    // Three steps at 4/s: at most one may already have been due.
    assert!(slowed.elapsed() >= Duration::from_millis(450));
    assert_eq!(sim.state(), SchedulerState::Running);
    let generations: Vec<u64> = updates.iter().map(|u| u.generation).collect();
    assert_eq!(generations, (from + 1..=from + generations.len() as u64).collect::<Vec<_>>());

    assert_eq!(sim.set_rate(30), 30);
    let from = sim.grid().generation();
    let sped_up = Instant::now();
    let updates = pump(&mut sim, |s| s.grid().generation() >= from + 3);
    assert!(sped_up.elapsed() < Duration::from_millis(450));
    assert_eq!(updates.first().map(|u| u.generation), Some(from + 1));
    assert_eq!(sim.state(), SchedulerState::Running);
    sim.stop();
}

#[test]
fn edits_are_refused_while_running() {
    let mut sim = board(20, 20);
    sim.start().unwrap();
    pump(&mut sim, |s| s.state() == SchedulerState::Running);

    assert_eq!(sim.toggle(1, 1), EditOutcome::WhileRunning);
    assert_eq!(sim.set_cell(2, 2, true), EditOutcome::WhileRunning);
    assert_eq!(sim.place_pattern(0, 0, &pattern::GLIDER), EditOutcome::WhileRunning);
    assert_eq!(sim.resize(40, 40), EditOutcome::WhileRunning);
    assert_eq!(sim.randomize(0.5), EditOutcome::WhileRunning);
    assert!(sim.grid().cells().is_empty());

    let err = sim.step_once().unwrap_err();
    assert!(matches!(err, LifeError::Engine(_)));
    sim.stop();
}

#[test]
fn manual_steps_then_run() {
    let mut sim = board(20, 20);
    let _ = sim.place_pattern(5, 5, &pattern::BLINKER);
    sim.step_once().unwrap();
    sim.settle(WAIT).unwrap();
    assert_eq!(sim.grid().generation(), 1);

    sim.start().unwrap();
    pump(&mut sim, |s| s.grid().generation() >= 3);
    sim.stop();
    assert_eq!(sim.stats().births, sim.stats().deaths);
}

#[test]
fn shutdown_joins_engine() {
    let mut sim = board(20, 20);
    sim.start().unwrap();
    sim.shutdown();
}
