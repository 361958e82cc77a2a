#![forbid(unsafe_code)]

//! Proptest strategies for attribute-name grammar coverage.
//!
//! Generators produce (raw attribute name, expected canonical name) pairs
//! spanning the full surface grammar: optional vendor prefixes, mixed
//! separators, and case-varied marker segments. The expected names come from
//! independent split-based oracles, not from the normalizer under test.

use proptest::prelude::*;

/// One separator character.
pub fn separator() -> impl Strategy<Value = char> {
    prop_oneof![Just(':'), Just('-'), Just('_')]
}

/// `word` with each letter's case chosen independently.
pub fn mixed_case(word: &str) -> impl Strategy<Value = String> {
    let chars: Vec<char> = word.chars().collect();
    proptest::collection::vec(any::<bool>(), chars.len()).prop_map(move |flags| {
        chars
            .iter()
            .zip(flags)
            .map(|(c, upper)| {
                if upper {
                    c.to_ascii_uppercase()
                } else {
                    *c
                }
            })
            .collect()
    })
}

/// Empty, `x` + separator, or `data` + separator (case-varied).
pub fn vendor_prefix() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        (mixed_case("x"), separator()).prop_map(|(word, sep)| format!("{word}{sep}")),
        (mixed_case("data"), separator()).prop_map(|(word, sep)| format!("{word}{sep}")),
    ]
}

/// Lowercase tail with underscore-separated segments (`foo_bar_baz`).
pub fn underscore_tail() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,5}(_[a-z][a-z0-9]{0,5}){0,3}"
}

/// camelCase tail (`fooBarBaz`).
pub fn camel_tail() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,4}([A-Z][a-z0-9]{0,4}){0,3}"
}

/// A full property attribute: (raw name, expected camelCase canonical).
pub fn property_attribute() -> impl Strategy<Value = (String, String)> {
    (
        vendor_prefix(),
        mixed_case("ngce"),
        separator(),
        mixed_case("prop"),
        separator(),
        underscore_tail(),
    )
        .prop_map(|(prefix, ngce, sep1, marker, sep2, tail)| {
            let raw = format!("{prefix}{ngce}{sep1}{marker}{sep2}{tail}");
            (raw, camel_oracle(&tail))
        })
}

/// A full event attribute with an underscore tail: (raw name, expected
/// kebab-case canonical).
pub fn event_attribute() -> impl Strategy<Value = (String, String)> {
    (
        vendor_prefix(),
        mixed_case("ngce"),
        separator(),
        mixed_case("on"),
        separator(),
        underscore_tail(),
    )
        .prop_map(|(prefix, ngce, sep1, marker, sep2, tail)| {
            let raw = format!("{prefix}{ngce}{sep1}{marker}{sep2}{tail}");
            (raw, kebab_oracle(&tail))
        })
}

/// A full event attribute with a camelCase tail: (raw name, expected
/// kebab-case canonical).
pub fn camel_event_attribute() -> impl Strategy<Value = (String, String)> {
    (
        mixed_case("ngce"),
        separator(),
        mixed_case("on"),
        separator(),
        camel_tail(),
    )
        .prop_map(|(ngce, sep1, marker, sep2, tail)| {
            let raw = format!("{ngce}{sep1}{marker}{sep2}{tail}");
            (raw, kebab_from_camel_oracle(&tail))
        })
}

/// Arbitrary printable soup, for never-panics properties.
pub fn arbitrary_name() -> impl Strategy<Value = String> {
    "\\PC{0,40}"
}

/// Expected camelCase for a lowercase underscore tail, by splitting.
#[must_use]
pub fn camel_oracle(tail: &str) -> String {
    let mut segments = tail.split('_');
    let mut out = String::new();
    if let Some(first) = segments.next() {
        out.push_str(first);
    }
    for segment in segments {
        let mut chars = segment.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Expected kebab-case for a lowercase underscore tail, by splitting.
#[must_use]
pub fn kebab_oracle(tail: &str) -> String {
    tail.split('_').collect::<Vec<_>>().join("-")
}

/// Expected kebab-case for a camelCase tail, by case boundaries.
#[must_use]
pub fn kebab_from_camel_oracle(tail: &str) -> String {
    let mut out = String::new();
    for c in tail.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
