// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz JSON catalog loading.
//!
//! Feeds arbitrary strings through `TemplateRegistry::from_json_str`,
//! verifying that loading never panics and every loaded class can report
//! its template text.
#![no_main]
use libfuzzer_sys::fuzz_target;
use sce_templates::{TemplateRegistry, TemplateResolver};
use std::collections::BTreeMap;

fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    let registry = match TemplateRegistry::from_json_str(s) {
        Ok(r) => r,
        Err(e) => {
            let _ = format!("{e}");
            return;
        }
    };

    let ids: Vec<String> = registry.class_ids().map(str::to_owned).collect();
    for class in ids {
        assert!(registry.contains(&class));
        let _ = registry.template(&class).expect("registered class has a template");
        let _ = registry.sql_state(&class);
        let _ = registry.resolve(&class, &BTreeMap::new());
    }
});
