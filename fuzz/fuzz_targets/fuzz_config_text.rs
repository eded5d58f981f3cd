//! Fuzz target: `AirlockSettings::parse` and `layout::resolve`
//!
//! Arbitrary configuration text must either resolve or fail with a
//! `ConfigError`; a successful parse must keep all three tags.
//!
//! cargo fuzz run fuzz_config_text

#![no_main]

use airlock::adapters::simulated::SimulatedGrid;
use airlock::config::{self, AirlockSettings};
use airlock::layout;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = config::has_section(text, config::INFO_SECTION);

    if let Ok(settings) = AirlockSettings::parse(text) {
        assert_ne!(settings.wait_budget_ticks, Some(0));
        let grid = SimulatedGrid::standard(0.25, 0.2);
        if let Ok(layout) = layout::resolve_settings(settings, &grid) {
            assert!(layout.exterior.doors().iter().all(|d| !layout.interior.contains(*d)));
        }
    }
});
