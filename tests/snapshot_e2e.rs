use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use chrono::{TimeZone, Utc};
use tempfile::tempdir;

use gridlife::{
    pattern, snapshot_filename, Cell, LifeError, RuleSet, Simulation, SimulationConfig, Snapshot,
    SnapshotError, SnapshotRejection,
};

fn sim() -> Simulation {
    Simulation::new(SimulationConfig::default()).unwrap()
}

#[test]
fn save_and_load_through_a_file() {
    let dir = tempdir().unwrap();
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
    let path = dir.path().join(snapshot_filename("gridlife", "json", at));
    assert!(path.ends_with("gridlife_2024-06-01T12-30-00.json"));

    let mut original = sim();
    let _ = original.place_pattern(95, 95, &pattern::GLIDER);
    original.set_rules("B36/S23").unwrap();
    {
        let mut out = BufWriter::new(File::create(&path).unwrap());
        original.save_to(&mut out).unwrap();
        out.flush().unwrap();
    }

    let mut restored = sim();
    restored
        .load_from(&mut BufReader::new(File::open(&path).unwrap()))
        .unwrap();
    assert_eq!(restored.grid().sorted_cells(), original.grid().sorted_cells());
    assert_eq!(restored.rules().to_string(), "B36/S23");
    assert_eq!(restored.stats().generation, 0);
}

#[test]
fn undersized_board_is_rejected_and_state_kept() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tiny.json");
    std::fs::write(
        &path,
        r#"{"version":"1.0","width":5,"height":50,"rules":"B3/S23","generation":3,"cells":["1,1"]}"#,
    )
    .unwrap();

    let mut sim = sim();
    let _ = sim.place_pattern(10, 10, &pattern::BLOCK);
    let before = sim.grid().clone();

    let err = sim
        .load_from(&mut BufReader::new(File::open(&path).unwrap()))
        .unwrap_err();
    let LifeError::Snapshot(SnapshotError::InvalidSnapshot { reason }) = err else {
        panic!("expected snapshot rejection, got {err}");
    };
    assert_eq!(reason, SnapshotRejection::DimensionsOutOfRange { width: 5, height: 50 });
    assert!(reason.to_string().contains("out of range"));
    assert_eq!(sim.grid(), &before);
}

#[test]
fn unparsable_rules_fall_back_to_conway() {
    let mut sim = sim();
    sim.set_rules("B2/S").unwrap();
    sim.load_json(r#"{"width":20,"height":20,"rules":"B3/S2x","cells":[[1,2],"3,4"]}"#)
        .unwrap();
    assert_eq!(sim.rules(), RuleSet::CONWAY);
    assert_eq!(sim.grid().sorted_cells(), vec![Cell::new(1, 2), Cell::new(3, 4)]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = File::open(dir.path().join("absent.json")).map_err(LifeError::from).unwrap_err();
    assert!(matches!(err, LifeError::Io(_)));
}

#[test]
fn snapshot_json_uses_camel_case_and_keys() {
    let mut sim = sim();
    let _ = sim.set_cell(7, 3, true);
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let snap = sim.snapshot_at(at);

    let mut buf = Vec::new();
    snap.write_to(&mut buf).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(value["version"], "1.0");
    assert_eq!(value["cells"][0], "7,3");
    assert_eq!(value["savedAt"], "2024-01-02T03:04:05Z");

    assert_eq!(Snapshot::from_value(value).unwrap(), snap);
}
