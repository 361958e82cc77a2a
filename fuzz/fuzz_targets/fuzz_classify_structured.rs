#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ngce_core::attr::{self, BindingKind};

#[derive(Arbitrary, Debug, Clone, Copy)]
enum Sep {
    Colon,
    Hyphen,
    Underscore,
}

impl Sep {
    fn ch(self) -> char {
        match self {
            Self::Colon => ':',
            Self::Hyphen => '-',
            Self::Underscore => '_',
        }
    }
}

#[derive(Arbitrary, Debug, Clone, Copy)]
enum Prefix {
    None,
    X(Sep),
    Data(Sep),
}

#[derive(Arbitrary, Debug)]
enum Form {
    Property { sep: Sep, tail: String },
    Event { sep: Sep, tail: String },
    BulkProperties,
    BulkEvents,
}

#[derive(Arbitrary, Debug)]
struct Recipe {
    prefix: Prefix,
    sep: Sep,
    shout: bool,
    form: Form,
}

fn segment(base: &str, shout: bool) -> String {
    if shout {
        base.to_ascii_uppercase()
    } else {
        base.to_string()
    }
}

fuzz_target!(|recipe: Recipe| {
    let mut raw = String::new();
    match recipe.prefix {
        Prefix::None => {}
        Prefix::X(sep) => {
            raw.push('x');
            raw.push(sep.ch());
        }
        Prefix::Data(sep) => {
            raw.push_str("data");
            raw.push(sep.ch());
        }
    }
    raw.push_str(&segment("ngce", recipe.shout));
    raw.push(recipe.sep.ch());

    let expected = match &recipe.form {
        Form::Property { sep, tail } => {
            raw.push_str(&segment("prop", recipe.shout));
            raw.push(sep.ch());
            raw.push_str(tail);
            (!tail.is_empty()).then_some(BindingKind::Property)
        }
        Form::Event { sep, tail } => {
            raw.push_str(&segment("on", recipe.shout));
            raw.push(sep.ch());
            raw.push_str(tail);
            (!tail.is_empty()).then_some(BindingKind::Event)
        }
        Form::BulkProperties => {
            raw.push_str(&segment("props", recipe.shout));
            Some(BindingKind::BulkProperties)
        }
        Form::BulkEvents => {
            raw.push_str(&segment("events", recipe.shout));
            Some(BindingKind::BulkEvents)
        }
    };

    match (attr::classify(&raw), expected) {
        (Some(target), Some(kind)) => {
            assert_eq!(target.kind, kind);
            match kind {
                BindingKind::Property => match &recipe.form {
                    Form::Property { tail, .. } => {
                        assert_eq!(target.name, attr::canonical_property_name(tail));
                    }
                    _ => unreachable!(),
                },
                BindingKind::Event => match &recipe.form {
                    Form::Event { tail, .. } => {
                        assert_eq!(target.name, attr::canonical_event_name(tail));
                    }
                    _ => unreachable!(),
                },
                BindingKind::BulkProperties | BindingKind::BulkEvents => {
                    assert!(target.name.is_empty());
                }
            }
        }
        (None, None) => {}
        (got, want) => panic!("classification mismatch for {raw:?}: {got:?} vs {want:?}"),
    }
});
