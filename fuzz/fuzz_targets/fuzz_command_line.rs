//! Fuzz target: command-line parsing and dispatch
//!
//! Feeds arbitrary text through `parse_line` and then through a live
//! service on the simulated grid.  Parsing must never panic, an accepted
//! token must round-trip through its name, and dispatch must never fail
//! on a healthy configuration.
//!
//! cargo fuzz run fuzz_command_line

#![no_main]

use airlock::adapters::log_sink::LogEventSink;
use airlock::adapters::simulated::SimulatedGrid;
use airlock::app::commands::{AirlockCommand, UpdateSource, parse_line};
use airlock::app::service::AirlockService;
use libfuzzer_sys::fuzz_target;

const CONFIG: &str = "[Airlock]\n\
    AirVentTag = \"Airlock Vent\"\n\
    ExteriorDoorsTag = \"Airlock Exterior\"\n\
    InteriorDoorsTag = \"Airlock Interior\"\n";

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(Some(cmd)) = parse_line(text) {
        assert_eq!(cmd.name().parse::<AirlockCommand>(), Ok(cmd));
    }

    let mut grid = SimulatedGrid::standard(0.25, 0.2);
    let mut sink = LogEventSink::new();
    let Ok(mut service) = AirlockService::new(CONFIG, &grid, &mut sink) else {
        return;
    };
    // One line per tick, resuming whenever asked.
    for line in text.lines() {
        let mut source = UpdateSource::TRIGGER;
        if service.update_requested() {
            source = source | UpdateSource::ONCE;
        }
        assert!(service.run(line, source, &mut grid, &mut sink).is_ok());
        grid.advance_physics();
    }
});
