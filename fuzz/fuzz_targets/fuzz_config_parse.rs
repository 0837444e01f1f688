// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz dispatcher config TOML parsing and validation.
#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(config) = rfd_config::parse_toml(s) else {
        return;
    };

    match rfd_config::validate_config(&config) {
        Ok(warnings) => {
            for w in &warnings {
                let _ = format!("{w}");
            }
        }
        Err(e) => {
            let _ = format!("{e}");
        }
    }

    if let Ok(toml_str) = toml::to_string(&config) {
        if let Ok(rt) = rfd_config::parse_toml(&toml_str) {
            assert_eq!(config, rt, "TOML round-trip must be lossless");
        }
    }

    if let Ok(json) = serde_json::to_string(&config) {
        let _ = serde_json::from_str::<rfd_config::DispatcherConfig>(&json);
    }
});
