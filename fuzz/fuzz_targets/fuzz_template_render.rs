// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz template parsing and rendering.
//!
//! Verifies:
//! 1. Parsing arbitrary text never panics.
//! 2. A template with every placeholder supplied always renders.
//! 3. A template without placeholders renders to its source text.
#![no_main]
use libfuzzer_sys::fuzz_target;
use sce_templates::Template;
use std::collections::BTreeMap;

fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    let template = Template::parse(s);
    assert_eq!(template.as_str(), s);

    let params: BTreeMap<String, String> = template
        .placeholders()
        .map(|name| (name.to_owned(), format!("v_{name}")))
        .collect();
    let rendered = template
        .render(&params)
        .expect("all placeholders supplied");

    if params.is_empty() {
        assert_eq!(rendered, s);
    }
});
