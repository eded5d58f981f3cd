//! Integration tests for the argument → handler → task → grid pipeline.
//!
//! Doors and oxygen in the mock never move by themselves, so each test
//! sets them to the values a real grid would reach.

use airlock::app::commands::{AirlockCommand, UpdateSource};
use airlock::app::events::AppEvent;
use airlock::app::service::AirlockService;
use airlock::error::Result;
use airlock::fsm::TaskKind;
use airlock::layout::Side;

use crate::mock_grid::{CONFIG, EXTERIOR, GridCall, INTERIOR, LogSink, MockGrid};

fn make_service() -> (AirlockService, MockGrid, LogSink) {
    let grid = MockGrid::standard();
    let mut sink = LogSink::new();
    let service = AirlockService::new(CONFIG, &grid, &mut sink).unwrap();
    sink.clear();
    (service, grid, sink)
}

/// Deliver one invocation the way a host does: `ONCE` when the service
/// asked for it, `TRIGGER` when there is an argument.
fn tick(
    service: &mut AirlockService,
    grid: &mut MockGrid,
    sink: &mut LogSink,
    argument: &str,
) -> Result<()> {
    let mut source = UpdateSource::NONE;
    if service.update_requested() {
        source = source | UpdateSource::ONCE;
    }
    if !argument.is_empty() {
        source = source | UpdateSource::TRIGGER;
    }
    service.run(argument, source, grid, sink)
}

fn started(sink: &LogSink) -> usize {
    sink.count(|e| matches!(e, AppEvent::TaskStarted(_)))
}

// ── Occupancy-driven equalize ─────────────────────────────────

#[test]
fn interior_enter_starts_one_task_per_empty_to_occupied() {
    let (mut service, mut grid, mut sink) = make_service();
    grid.oxygen = 0.2;

    for _ in 0..3 {
        tick(&mut service, &mut grid, &mut sink, "interior_enter").unwrap();
    }

    assert_eq!(service.occupancy(), 3);
    assert_eq!(started(&sink), 1);
    assert_eq!(
        service.current_task(),
        Some(TaskKind::Equalize(Side::Interior))
    );
    assert_eq!(grid.depressurizing(), Some(false));
    assert_eq!(grid.opened(INTERIOR[0]), 0);
}

#[test]
fn interior_equalize_opens_only_at_full_pressure() {
    let (mut service, mut grid, mut sink) = make_service();
    grid.oxygen = 0.6;
    tick(&mut service, &mut grid, &mut sink, "interior_enter").unwrap();
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    assert_eq!(grid.opened(INTERIOR[0]), 0);
    assert!(service.update_requested());

    grid.oxygen = 1.0;
    tick(&mut service, &mut grid, &mut sink, "").unwrap();

    assert_eq!(grid.opened(INTERIOR[0]), 1);
    assert_eq!(grid.opened(INTERIOR[1]), 1);
    assert_eq!(grid.opened(EXTERIOR[0]), 0);
    assert!(!service.update_requested());
    assert_eq!(
        sink.count(|e| *e == AppEvent::TaskCompleted(TaskKind::Equalize(Side::Interior))),
        1
    );
}

#[test]
fn exterior_enter_depressurizes_then_opens_exterior() {
    let (mut service, mut grid, mut sink) = make_service();
    grid.oxygen = 1.0;
    tick(&mut service, &mut grid, &mut sink, "exterior_enter").unwrap();
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    assert_eq!(grid.depressurizing(), Some(true));
    assert_eq!(grid.opened(EXTERIOR[0]), 0);

    grid.oxygen = 0.0;
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    assert_eq!(grid.opened(EXTERIOR[0]), 1);
    assert_eq!(grid.opened(EXTERIOR[1]), 1);
    assert_eq!(grid.opened(INTERIOR[0]), 0);
}

// ── Exits ─────────────────────────────────────────────────────

#[test]
fn exits_close_their_side_even_at_zero() {
    let (mut service, mut grid, mut sink) = make_service();

    tick(&mut service, &mut grid, &mut sink, "exterior_exit").unwrap();

    assert_eq!(service.occupancy(), 0);
    assert_eq!(
        grid.calls,
        vec![GridCall::Close(EXTERIOR[0]), GridCall::Close(EXTERIOR[1])]
    );
    assert_eq!(
        sink.events,
        vec![AppEvent::OccupancyUnderflow(AirlockCommand::ExteriorExit)]
    );

    tick(&mut service, &mut grid, &mut sink, "interior_exit").unwrap();
    assert_eq!(grid.closed(INTERIOR[0]), 1);
    assert_eq!(grid.closed(INTERIOR[1]), 1);
}

#[test]
fn airlock_exit_only_decrements() {
    let (mut service, mut grid, mut sink) = make_service();
    // Chamber short of full pressure: the interior task stays pending.
    grid.oxygen = 0.2;
    tick(&mut service, &mut grid, &mut sink, "interior_enter").unwrap();
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    let calls = grid.calls.len();

    service
        .run("airlock_exit", UpdateSource::TRIGGER, &mut grid, &mut sink)
        .unwrap();

    assert_eq!(service.occupancy(), 0);
    assert_eq!(grid.calls.len(), calls);
    assert_eq!(
        grid.count(|c| matches!(c, GridCall::Open(_) | GridCall::Close(_))),
        0
    );
    assert_eq!(
        service.current_task(),
        Some(TaskKind::Equalize(Side::Interior))
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::OccupancyUnderflow(_))), 0);
}

// ── Airlock cycle ─────────────────────────────────────────────

fn cycle_at(oxygen: f32) -> (AirlockService, MockGrid) {
    let (mut service, mut grid, mut sink) = make_service();
    grid.oxygen = oxygen;
    tick(&mut service, &mut grid, &mut sink, "airlock_enter").unwrap();
    // Settle, then the closed-doors check and decide.
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    assert!(grid.calls.is_empty());
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    (service, grid)
}

#[test]
fn cycle_at_half_pressure_goes_interior() {
    let (service, grid) = cycle_at(0.5);
    assert_eq!(grid.depressurizing(), Some(false));
    assert_eq!(service.status(&grid).wait_point, Some("oxygen"));
}

#[test]
fn cycle_above_half_pressure_goes_exterior() {
    let (_, grid) = cycle_at(0.51);
    assert_eq!(grid.depressurizing(), Some(true));
}

#[test]
fn cycle_waits_for_every_door_to_close() {
    let (mut service, mut grid, mut sink) = make_service();
    grid.set_side(&INTERIOR, 1.0);
    tick(&mut service, &mut grid, &mut sink, "airlock_enter").unwrap();
    for _ in 0..5 {
        tick(&mut service, &mut grid, &mut sink, "").unwrap();
    }
    assert!(grid.depressurizing().is_none());
    assert_eq!(
        service.status(&grid).wait_point,
        Some("doors-closed")
    );

    grid.set_side(&INTERIOR[..1], 0.0);
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    assert!(grid.depressurizing().is_none());

    grid.set_side(&INTERIOR[1..], 0.0);
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    assert_eq!(grid.depressurizing(), Some(true));
}

#[test]
fn walk_from_interior_to_exterior() {
    let (mut service, mut grid, mut sink) = make_service();
    grid.oxygen = 1.0;

    // Interior sensor: pressurized already, interior opens at once.
    tick(&mut service, &mut grid, &mut sink, "interior_enter").unwrap();
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    assert_eq!(grid.opened(INTERIOR[0]), 1);
    grid.set_side(&INTERIOR, 1.0);

    // Into the chamber; the interior sensor clears behind.
    tick(&mut service, &mut grid, &mut sink, "airlock_enter").unwrap();
    tick(&mut service, &mut grid, &mut sink, "interior_exit").unwrap();
    assert_eq!(grid.closed(INTERIOR[0]), 1);
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    grid.set_side(&INTERIOR, 0.0);
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    assert_eq!(grid.depressurizing(), Some(true));

    grid.oxygen = 0.0;
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    assert_eq!(grid.opened(EXTERIOR[0]), 1);
    assert!(!service.update_requested());

    // Out through the exterior: no new sequence starts.
    tick(&mut service, &mut grid, &mut sink, "exterior_enter").unwrap();
    tick(&mut service, &mut grid, &mut sink, "airlock_exit").unwrap();
    tick(&mut service, &mut grid, &mut sink, "exterior_exit").unwrap();

    assert_eq!(service.occupancy(), 0);
    assert_eq!(started(&sink), 2);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::TaskSuperseded(_))), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::OccupancyUnderflow(_))), 0);
    assert_eq!(grid.closed(EXTERIOR[0]), 1);
}

#[test]
fn newer_task_supersedes_running_one() {
    let (mut service, mut grid, mut sink) = make_service();
    grid.oxygen = 0.3;
    tick(&mut service, &mut grid, &mut sink, "interior_enter").unwrap();
    tick(&mut service, &mut grid, &mut sink, "").unwrap();

    tick(&mut service, &mut grid, &mut sink, "airlock_enter").unwrap();

    assert_eq!(service.current_task(), Some(TaskKind::AirlockCycle));
    assert_eq!(
        &sink.events[sink.events.len() - 2..],
        &[
            AppEvent::TaskSuperseded(TaskKind::Equalize(Side::Interior)),
            AppEvent::TaskStarted(TaskKind::AirlockCycle),
        ]
    );

    // The superseded task never opens the interior.
    grid.oxygen = 1.0;
    for _ in 0..4 {
        tick(&mut service, &mut grid, &mut sink, "").unwrap();
    }
    assert_eq!(grid.opened(INTERIOR[0]), 0);
    assert_eq!(grid.opened(EXTERIOR[0]), 0);
}

#[test]
fn stalled_cycle_times_out_with_budget() {
    let mut grid = MockGrid::standard();
    let mut sink = LogSink::new();
    let config = format!("{CONFIG}WaitTimeoutTicks = 3\n");
    let mut service = AirlockService::new(config, &grid, &mut sink).unwrap();
    grid.set_side(&EXTERIOR[..1], 0.5);

    tick(&mut service, &mut grid, &mut sink, "airlock_enter").unwrap();
    let mut resumes = 0;
    while service.update_requested() && resumes < 20 {
        tick(&mut service, &mut grid, &mut sink, "").unwrap();
        resumes += 1;
    }

    // Three suspensions fit the budget; the fourth abandons the task.
    assert_eq!(resumes, 4);
    assert_eq!(service.current_task(), None);
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::TaskTimedOut {
            kind: TaskKind::AirlockCycle,
            wait_point: "doors-closed",
            ticks: 4,
        })
    );
}

// ── Manual toggle ─────────────────────────────────────────────

#[test]
fn toggle_interior_issues_exactly_two_toggles() {
    let (mut service, mut grid, mut sink) = make_service();

    tick(&mut service, &mut grid, &mut sink, "toggle_interior").unwrap();
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    assert_eq!(grid.toggled(INTERIOR[0]), 1);

    grid.set_side(&INTERIOR, 0.5);
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    assert_eq!(grid.toggled(INTERIOR[0]), 1);

    grid.set_side(&INTERIOR, 1.0);
    tick(&mut service, &mut grid, &mut sink, "").unwrap();

    for door in INTERIOR {
        assert_eq!(grid.toggled(door), 2);
    }
    for door in EXTERIOR {
        assert_eq!(grid.toggled(door), 0);
    }
    assert!(!service.update_requested());
    assert_eq!(service.occupancy(), 0);
}

#[test]
fn toggle_exterior_drives_exterior_group() {
    let (mut service, mut grid, mut sink) = make_service();
    grid.set_side(&EXTERIOR, 1.0);

    tick(&mut service, &mut grid, &mut sink, "Toggle_Exterior").unwrap();
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    // Open and still: classified closing, so wait for fully closed.
    tick(&mut service, &mut grid, &mut sink, "").unwrap();
    grid.set_side(&EXTERIOR, 0.0);
    tick(&mut service, &mut grid, &mut sink, "").unwrap();

    assert_eq!(grid.toggled(EXTERIOR[0]), 2);
    assert_eq!(grid.toggled(INTERIOR[0]), 0);
    assert_eq!(
        sink.count(|e| *e == AppEvent::TaskCompleted(TaskKind::ToggleTwice(Side::Exterior))),
        1
    );
}

// ── Arguments and ticks ───────────────────────────────────────

#[test]
fn invalid_argument_is_echoed_and_ignored() {
    let (mut service, mut grid, mut sink) = make_service();

    service
        .run("Open_Sesame now", UpdateSource::TERMINAL, &mut grid, &mut sink)
        .unwrap();

    assert_eq!(sink.events, vec![AppEvent::InvalidArgument("open_sesame".into())]);
    assert!(grid.calls.is_empty());
    assert_eq!(service.occupancy(), 0);
    assert_eq!(service.current_task(), None);
}

#[test]
fn resume_without_task_is_idle() {
    let (mut service, mut grid, mut sink) = make_service();
    service
        .run("", UpdateSource::ONCE, &mut grid, &mut sink)
        .unwrap();
    assert!(grid.calls.is_empty());
    assert!(sink.events.is_empty());
    assert!(!service.update_requested());
}

#[test]
fn task_started_on_resume_tick_steps_immediately() {
    let (mut service, mut grid, mut sink) = make_service();
    grid.oxygen = 1.0;
    service
        .run(
            "interior_enter",
            UpdateSource::TRIGGER | UpdateSource::ONCE,
            &mut grid,
            &mut sink,
        )
        .unwrap();
    assert_eq!(grid.opened(INTERIOR[0]), 1);
    assert_eq!(service.current_task(), None);
}

#[test]
fn status_snapshot_serializes() {
    let (mut service, mut grid, mut sink) = make_service();
    grid.oxygen = 0.25;
    grid.set_side(&EXTERIOR[1..], 0.75);
    tick(&mut service, &mut grid, &mut sink, "interior_enter").unwrap();
    tick(&mut service, &mut grid, &mut sink, "").unwrap();

    let status = service.status(&grid);
    assert_eq!(status.tick, 2);
    assert_eq!(status.occupancy, 1);
    assert_eq!(status.task, Some(TaskKind::Equalize(Side::Interior)));
    assert_eq!(status.wait_point, Some("oxygen"));
    assert_eq!(status.oxygen_level, Some(0.25));
    assert_eq!(status.exterior_open, Some(0.75));
    assert_eq!(status.interior_open, Some(0.0));
    assert!(status.update_requested);

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["occupancy"], 1);
    assert_eq!(json["wait_point"], "oxygen");
    assert!(json["fault"].is_null());
}
