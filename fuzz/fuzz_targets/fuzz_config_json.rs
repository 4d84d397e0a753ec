//! Fuzz target: `StaircaseConfig::merge_json`
//!
//! Feeds arbitrary bytes through the JSON parser and into the config merge.
//! Whatever the input, the merged config must stay inside its clamps.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use stairsweep::config::{ON_TIME_SECS, SEGMENT_DELAY_MS, StaircaseConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(root) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let mut config = StaircaseConfig::default();
    if config.merge_json(&root).is_err() {
        assert_eq!(config, StaircaseConfig::default());
        return;
    }

    assert!(SEGMENT_DELAY_MS.contains(&config.segment_delay_ms));
    assert!(ON_TIME_SECS.contains(&(config.on_time_ms / 1000)));
    assert_eq!(config.on_time_ms % 1000, 0);
});
