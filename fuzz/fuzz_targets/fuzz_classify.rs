#![no_main]

use libfuzzer_sys::fuzz_target;
use ngce_core::attr::{self, BindingKind};

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };
    let Some(target) = attr::classify(name) else {
        return;
    };
    match target.kind {
        BindingKind::Property => {
            // Underscore folding is single-pass, so only underscore-free
            // canonical names are guaranteed fixed points.
            if !target.name.contains('_') {
                assert_eq!(attr::canonical_property_name(&target.name), target.name);
            }
        }
        BindingKind::Event => {
            if !target.name.contains('_') {
                assert_eq!(attr::canonical_event_name(&target.name), target.name);
            }
        }
        BindingKind::BulkProperties | BindingKind::BulkEvents => {
            assert!(target.name.is_empty());
        }
    }
});
