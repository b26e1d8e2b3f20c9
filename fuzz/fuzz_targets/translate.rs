//! Fuzz the named-placeholder translator.
//!
//! Translation must never panic, and a successful translation must agree
//! with `placeholder_names` on which names it bound.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pooldb_bind::{PlaceholderStyle, placeholder_names, translate};
use pooldb_types::Binds;

#[derive(Debug, Arbitrary)]
struct Input {
    query: String,
    names: Vec<String>,
    style: u8,
}

fuzz_target!(|input: Input| {
    let style = match input.style % 4 {
        0 => PlaceholderStyle::Dollar,
        1 => PlaceholderStyle::Question,
        2 => PlaceholderStyle::Colon,
        _ => PlaceholderStyle::AtP,
    };
    let binds: Binds = input
        .names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i as i64))
        .collect();

    let Ok(statement) = translate(&input.query, &binds, style) else {
        return;
    };
    let Ok(names) = placeholder_names(&input.query) else {
        panic!("translate accepted a query placeholder_names rejected");
    };

    assert_eq!(statement.param_names().len(), statement.params().len());
    if style.is_numbered() {
        assert_eq!(statement.param_names().len(), names.len());
    }
    for name in names {
        assert!(binds.contains(name));
    }
});
