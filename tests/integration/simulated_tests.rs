//! End-to-end runs against the in-memory grid, with door and vent motion.

use airlock::adapters::simulated::SimulatedGrid;
use airlock::app::commands::UpdateSource;
use airlock::app::events::AppEvent;
use airlock::app::ports::{DisplayId, DoorId, DoorPort, VentId, VentPort};
use airlock::app::service::AirlockService;
use airlock::fsm::TaskKind;

use crate::mock_grid::LogSink;

const CONFIG: &str = r#"
[Airlock]
AirVentTag = "Airlock Vent"
ExteriorDoorsTag = "Airlock Exterior"
InteriorDoorsTag = "Airlock Interior"
"#;

const EXTERIOR: [DoorId; 2] = [DoorId(0), DoorId(1)];
const INTERIOR: [DoorId; 2] = [DoorId(2), DoorId(3)];
const VENT: VentId = VentId(0);

/// One host invocation followed by one tick of grid physics.
fn tick(service: &mut AirlockService, grid: &mut SimulatedGrid, sink: &mut LogSink, argument: &str) {
    let mut source = UpdateSource::NONE;
    if service.update_requested() {
        source = source | UpdateSource::ONCE;
    }
    if !argument.is_empty() {
        source = source | UpdateSource::TRIGGER;
    }
    service.run(argument, source, grid, sink).unwrap();
    grid.advance_physics();
}

fn widest(grid: &SimulatedGrid, doors: &[DoorId]) -> f32 {
    doors
        .iter()
        .filter_map(|d| grid.open_ratio(*d))
        .fold(0.0, f32::max)
}

/// Doors on a side only move while the chamber matches that side.
fn assert_pressure_safe(grid: &SimulatedGrid) {
    let oxygen = grid.oxygen_level(VENT);
    if widest(grid, &EXTERIOR) > 0.0 {
        assert_eq!(oxygen, 0.0, "exterior open with oxygen {oxygen}");
    }
    if widest(grid, &INTERIOR) > 0.0 {
        assert_eq!(oxygen, 1.0, "interior open with oxygen {oxygen}");
    }
}

#[test]
fn cycle_from_pressurized_chamber_opens_exterior() {
    let mut grid = SimulatedGrid::standard(0.25, 0.2);
    let mut sink = LogSink::new();
    let mut service = AirlockService::new(CONFIG, &grid, &mut sink).unwrap();

    tick(&mut service, &mut grid, &mut sink, "airlock_enter");
    let mut ticks = 0;
    while service.update_requested() && ticks < 100 {
        tick(&mut service, &mut grid, &mut sink, "");
        assert_pressure_safe(&grid);
        ticks += 1;
    }
    for _ in 0..4 {
        grid.advance_physics();
    }

    assert!(ticks < 100, "cycle never finished");
    assert!(grid.is_depressurizing(VENT));
    assert_eq!(grid.oxygen_level(VENT), 0.0);
    assert_eq!(widest(&grid, &EXTERIOR), 1.0);
    assert_eq!(widest(&grid, &INTERIOR), 0.0);
    assert_eq!(
        sink.count(|e| *e == AppEvent::TaskCompleted(TaskKind::AirlockCycle)),
        1
    );
}

#[test]
fn walk_out_script_never_opens_against_pressure() {
    let mut grid = SimulatedGrid::standard(0.25, 0.2);
    let mut sink = LogSink::new();
    let mut service = AirlockService::new(CONFIG, &grid, &mut sink).unwrap();

    let script = [
        "interior_enter",
        "",
        "",
        "",
        "",
        "airlock_enter",
        "interior_exit",
    ];
    for line in script {
        tick(&mut service, &mut grid, &mut sink, line);
        assert_pressure_safe(&grid);
    }
    let mut ticks = 0;
    while service.update_requested() && ticks < 100 {
        tick(&mut service, &mut grid, &mut sink, "");
        assert_pressure_safe(&grid);
        ticks += 1;
    }
    for line in ["exterior_enter", "airlock_exit", "exterior_exit", "", "", "", ""] {
        tick(&mut service, &mut grid, &mut sink, line);
        assert_pressure_safe(&grid);
    }

    assert_eq!(service.occupancy(), 0);
    assert_eq!(widest(&grid, &EXTERIOR), 0.0);
    assert_eq!(widest(&grid, &INTERIOR), 0.0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::TaskSuperseded(_))), 0);
}

#[test]
fn toggle_runs_group_through_full_motion() {
    let mut grid = SimulatedGrid::standard(0.25, 0.2);
    let mut sink = LogSink::new();
    let mut service = AirlockService::new(CONFIG, &grid, &mut sink).unwrap();

    tick(&mut service, &mut grid, &mut sink, "toggle_exterior");
    let mut peak: f32 = 0.0;
    let mut ticks = 0;
    while service.update_requested() && ticks < 100 {
        tick(&mut service, &mut grid, &mut sink, "");
        peak = peak.max(widest(&grid, &EXTERIOR));
        ticks += 1;
    }
    for _ in 0..4 {
        grid.advance_physics();
    }

    assert_eq!(peak, 1.0);
    assert_eq!(widest(&grid, &EXTERIOR), 0.0);
    assert_eq!(widest(&grid, &INTERIOR), 0.0);
}

#[test]
fn removed_door_stalls_until_wait_budget() {
    let mut grid = SimulatedGrid::standard(0.25, 0.2);
    let mut sink = LogSink::new();
    let config = format!("{CONFIG}WaitTimeoutTicks = 10\n");
    let mut service = AirlockService::new(config, &grid, &mut sink).unwrap();
    grid.remove_door(INTERIOR[1]);

    tick(&mut service, &mut grid, &mut sink, "airlock_enter");
    let mut ticks = 0;
    while service.update_requested() && ticks < 100 {
        tick(&mut service, &mut grid, &mut sink, "");
        ticks += 1;
    }

    assert_eq!(ticks, 11);
    assert!(!grid.is_depressurizing(VENT));
    assert_eq!(grid.oxygen_level(VENT), 1.0);
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::TaskTimedOut {
            kind: TaskKind::AirlockCycle,
            wait_point: "doors-closed",
            ticks: 11,
        })
    );
}

#[test]
fn info_panel_shows_status() {
    let mut grid = SimulatedGrid::standard(0.25, 0.2);
    let mut sink = LogSink::new();
    let mut service = AirlockService::new(CONFIG, &grid, &mut sink).unwrap();

    tick(&mut service, &mut grid, &mut sink, "interior_enter");

    let panel = grid.display_text(DisplayId(0)).unwrap();
    assert!(panel.starts_with("Airlock  tick 1"), "panel: {panel}");
    assert!(panel.contains("Oxygen   100%"), "panel: {panel}");
    assert_eq!(grid.display_text(DisplayId(1)), Some(""));
}
