// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz SparkError construction, display, and DTO round-trips.
//!
//! Verifies:
//! 1. Deserializing arbitrary strings as ErrorKind never panics.
//! 2. Literal errors display their message verbatim.
//! 3. Class errors display as `[CLASS] message`.
//! 4. SparkErrorDto round-trips through JSON.
#![no_main]
use libfuzzer_sys::fuzz_target;
use sce_error::{ErrorKind, Interop, SparkError, SparkErrorDto};
use sce_templates::TemplateRegistry;
use std::collections::BTreeMap;

fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    // --- Property 1: JSON deserialization never panics ---
    if let Ok(kind) = serde_json::from_str::<ErrorKind>(s) {
        assert_eq!(kind.to_string(), kind.as_str());
        assert!(kind.is_a(ErrorKind::Base));
    }

    let kind = ErrorKind::ALL[data.first().copied().unwrap_or(0) as usize % ErrorKind::ALL.len()];
    let cap = Interop::ALL[data.len() % Interop::ALL.len()];

    // --- Property 2: literal messages are verbatim ---
    let literal = SparkError::with_message(kind, s).compose(cap);
    assert_eq!(literal.to_string(), s);
    assert!(literal.behaves_as(cap));

    // --- Property 3: classified display ---
    let registry = TemplateRegistry::new()
        .with_template("FUZZ_CLASS", "got <value>")
        .expect("valid class id");
    let params = BTreeMap::from([("value".to_owned(), s.to_owned())]);
    let classified = SparkError::with_class(kind, &registry, "FUZZ_CLASS", params)
        .expect("registered class with all parameters");
    assert_eq!(classified.to_string(), format!("[FUZZ_CLASS] got {s}"));

    // --- Property 4: DTO JSON round-trip ---
    let dto = SparkErrorDto::from(&classified);
    let json = serde_json::to_string(&dto).expect("SparkErrorDto must serialize");
    let rt: SparkErrorDto = serde_json::from_str(&json).expect("round-trip must succeed");
    assert_eq!(dto, rt);
    let rebuilt = SparkError::try_from(rt).expect("snapshot satisfies the contract");
    assert_eq!(rebuilt.to_string(), classified.to_string());
});
