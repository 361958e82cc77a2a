#![forbid(unsafe_code)]

//! Attribute-name grammar: classification and canonicalization.
//!
//! Template authors declare bindings in several equivalent surface syntaxes.
//! The separators between segments may independently be `:`, `-`, or `_`, an
//! optional `x`/`data` vendor prefix may precede the whole name, and the
//! `ngce`/`prop`/`on` marker segments match case-insensitively:
//!
//! ```text
//! ngce-prop-my_name="expr"      property binding, camelCase target `myName`
//! ngce:on:my_event="expr"       event binding, kebab-case target `my-event`
//! data-ngce-prop-test="expr"    vendor prefix, stripped before matching
//! ngce-props="expr"             bulk property map (no target name)
//! ngce-events="expr"            bulk event-handler map (no target name)
//! ```
//!
//! [`classify`] reduces any of these to a [`BindingTarget`]; names that do not
//! fit the grammar yield `None` and stay ordinary attributes for every other
//! consumer of the attribute table.
//!
//! # Invariants
//!
//! 1. [`classify`] is a pure function: no side effects, no dependency on
//!    element or scope state, same input always yields the same answer.
//! 2. Canonicalization is deterministic and is the identity on
//!    already-canonical input (camelCase property names, kebab-case event
//!    names).
//! 3. Malformed names are never an error: empty tails, missing separators,
//!    and unknown marker segments all yield `None`, never a panic — the
//!    grammar must survive arbitrary byte soup from templates.

use core::fmt;

/// Which side of the bridge a recognized attribute drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BindingKind {
    /// One element property driven by one reactive expression.
    Property,
    /// One native event evaluated against one expression.
    Event,
    /// A whole map of properties from a single expression (`ngce-props`).
    BulkProperties,
    /// A whole map of event handlers from a single expression (`ngce-events`).
    BulkEvents,
}

impl BindingKind {
    /// Whether this kind carries a map instead of a single named target.
    #[must_use]
    pub const fn is_bulk(self) -> bool {
        matches!(self, Self::BulkProperties | Self::BulkEvents)
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property => write!(f, "property"),
            Self::Event => write!(f, "event"),
            Self::BulkProperties => write!(f, "bulk-properties"),
            Self::BulkEvents => write!(f, "bulk-events"),
        }
    }
}

/// A classified attribute name: binding kind plus canonical target name.
///
/// For bulk kinds the name is empty — the targets come from the evaluated
/// map, not the attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingTarget {
    pub kind: BindingKind,
    pub name: String,
}

impl BindingTarget {
    fn new(kind: BindingKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

const SEPARATORS: [u8; 3] = [b':', b'-', b'_'];

fn is_separator(byte: u8) -> bool {
    SEPARATORS.contains(&byte)
}

/// Case-insensitive ASCII comparison of a byte slice against a marker word.
fn eq_marker(bytes: &[u8], word: &[u8]) -> bool {
    bytes.len() == word.len()
        && bytes
            .iter()
            .zip(word)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

/// Strip one optional `x` or `data` vendor prefix (plus its separator).
///
/// Case-insensitive; at most one prefix is removed. Offsets are safe to slice
/// at because every matched byte is ASCII.
fn strip_vendor_prefix(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= 2 && bytes[0].eq_ignore_ascii_case(&b'x') && is_separator(bytes[1]) {
        return &name[2..];
    }
    if bytes.len() >= 5 && eq_marker(&bytes[..4], b"data") && is_separator(bytes[4]) {
        return &name[5..];
    }
    name
}

/// Classify one raw attribute name.
///
/// Returns the binding kind and canonical target name when the name fits the
/// grammar, `None` otherwise. Never panics, regardless of input.
///
/// ```
/// use ngce_core::attr::{classify, BindingKind};
///
/// let t = classify("x-ngce-prop-my_name").unwrap();
/// assert_eq!(t.kind, BindingKind::Property);
/// assert_eq!(t.name, "myName");
///
/// let t = classify("ngce:on:fooBar").unwrap();
/// assert_eq!(t.kind, BindingKind::Event);
/// assert_eq!(t.name, "foo-bar");
///
/// assert!(classify("unrelated-attr").is_none());
/// ```
#[must_use]
pub fn classify(raw_name: &str) -> Option<BindingTarget> {
    let name = strip_vendor_prefix(raw_name);
    let bytes = name.as_bytes();
    if bytes.len() < 5 || !eq_marker(&bytes[..4], b"ngce") || !is_separator(bytes[4]) {
        return None;
    }
    let rest = &name[5..];

    // Bulk forms: the marker word is the whole remainder.
    if rest.eq_ignore_ascii_case("props") {
        return Some(BindingTarget::new(BindingKind::BulkProperties, ""));
    }
    if rest.eq_ignore_ascii_case("events") {
        return Some(BindingTarget::new(BindingKind::BulkEvents, ""));
    }

    // Per-target forms: marker segment, separator, non-empty tail. The
    // separator byte is ASCII, so splitting there is always a char boundary.
    let sep = rest.bytes().position(is_separator)?;
    let marker = rest[..sep].as_bytes();
    let tail = &rest[sep + 1..];
    if tail.is_empty() {
        return None;
    }
    if eq_marker(marker, b"prop") {
        Some(BindingTarget::new(
            BindingKind::Property,
            canonical_property_name(tail),
        ))
    } else if eq_marker(marker, b"on") {
        Some(BindingTarget::new(
            BindingKind::Event,
            canonical_event_name(tail),
        ))
    } else {
        None
    }
}

/// Canonical property name for an attribute tail: camelCase.
///
/// Alias for [`underscore_to_camel`]; exists so call sites name the rule
/// rather than the mechanism.
#[must_use]
pub fn canonical_property_name(tail: &str) -> String {
    underscore_to_camel(tail)
}

/// Canonical event name for an attribute tail: kebab-case.
///
/// Underscore segments become camelCase first, a leading Pascal capital is
/// lowered, then every remaining ASCII capital becomes a hyphen-preceded
/// lowercase letter. Literal hyphens pass through unchanged, so
/// `foo_bar`, `fooBar`, and `foo-bar` all canonicalize to `foo-bar`.
#[must_use]
pub fn canonical_event_name(tail: &str) -> String {
    camel_to_kebab(&pascal_to_camel(&underscore_to_camel(tail)))
}

/// Convert underscore-marked names to camelCase in a single pass.
///
/// Each character immediately following an underscore is upper-cased and the
/// underscore removed (`my_name` → `myName`, `a_bcd_e` → `aBcdE`). A trailing
/// underscore with no successor passes through literally.
#[must_use]
pub fn underscore_to_camel(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '_' {
            match chars.next() {
                Some(next) => out.extend(next.to_uppercase()),
                None => out.push('_'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Convert camelCase to kebab-case: every ASCII capital becomes `-` plus its
/// lowercase form (`firstVal` → `first-val`). Already-kebab input is unchanged.
#[must_use]
pub fn camel_to_kebab(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 2);
    for ch in input.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Lower-case the first character (`AnotherThing` → `anotherThing`).
#[must_use]
pub fn pascal_to_camel(input: &str) -> String {
    let mut chars = input.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = String::with_capacity(input.len());
    out.extend(first.to_lowercase());
    out.push_str(chars.as_str());
    out
}

/// PascalCase straight to kebab-case (`OhYeah` → `oh-yeah`).
#[must_use]
pub fn pascal_to_kebab(input: &str) -> String {
    camel_to_kebab(&pascal_to_camel(input))
}

/// Whether a canonical property name denotes a native DOM event-handler
/// property: `on` followed by one or more ASCII letters, case-insensitive.
///
/// Deliberately an over-approximation (the same one host frameworks apply to
/// `on*` attribute names): `onclick`, `ONCLICK`, and `onAnything` all match.
/// Property bindings targeting such names are rejected so they can never
/// install native event handlers behind the event-binding path's back.
#[must_use]
pub fn is_dom_event_property(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 2
        && bytes[0].eq_ignore_ascii_case(&b'o')
        && bytes[1].eq_ignore_ascii_case(&b'n')
        && bytes[2..].iter().all(u8::is_ascii_alphabetic)
}
