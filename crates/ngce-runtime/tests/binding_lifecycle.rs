#![forbid(unsafe_code)]

//! Integration tests: the full compile → link → live → teardown lifecycle
//! against the in-memory harness host.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ngce_core::error::BindError;
use ngce_core::host::HostError;
use ngce_harness::Fixture;
use serde_json::{Value, json};

// ============================================================================
// Property phase
// ============================================================================

#[test]
fn initial_apply_runs_before_any_propagation() {
    let fixture = Fixture::with_attributes(&[("ngce-prop-disabled", "isDisabled")]);
    fixture.set("isDisabled", json!(true));

    let session = fixture.bind().unwrap();

    assert_eq!(fixture.scope.digest_count(), 0);
    assert_eq!(fixture.element.property("disabled"), Some(json!(true)));
    assert_eq!(session.watch_count(), 1);
    assert!(fixture.scope.all_watches_deep());
}

#[test]
fn property_reapplies_on_scope_change() {
    let fixture = Fixture::with_attributes(&[("ngce-prop-disabled", "isDisabled")]);
    fixture.set("isDisabled", json!(false));
    let _session = fixture.bind().unwrap();
    assert_eq!(fixture.element.property("disabled"), Some(json!(false)));

    fixture.set("isDisabled", json!(true));
    fixture.digest();
    assert_eq!(fixture.element.property("disabled"), Some(json!(true)));

    fixture.set("isDisabled", json!(false));
    fixture.digest();
    assert_eq!(fixture.element.property("disabled"), Some(json!(false)));
}

#[test]
fn deep_change_inside_a_bound_object_reapplies() {
    let fixture = Fixture::with_attributes(&[("ngce-prop-config", "config")]);
    fixture.set("config", json!({ "theme": "dark", "size": 2 }));
    let _session = fixture.bind().unwrap();
    fixture.digest();

    fixture.set("config", json!({ "theme": "light", "size": 2 }));
    fixture.digest();

    assert_eq!(
        fixture.element.property("config"),
        Some(json!({ "theme": "light", "size": 2 }))
    );
}

#[test]
fn later_declaration_wins_for_duplicate_targets() {
    let fixture = Fixture::with_attributes(&[
        ("ngce-prop-value", "lhs"),
        ("ngce:prop:value", "rhs"),
    ]);
    fixture.set("lhs", json!("first"));
    fixture.set("rhs", json!("second"));

    let session = fixture.bind().unwrap();

    assert_eq!(fixture.element.property("value"), Some(json!("second")));
    assert_eq!(session.watch_count(), 2);
}

#[test]
fn vendor_prefixes_and_separators_normalize_end_to_end() {
    let fixture = Fixture::with_attributes(&[
        ("x-ngce:prop:user_name", "who"),
        ("data-ngce-on-save", "record($event)"),
    ]);
    fixture.set("who", json!("ada"));
    fixture
        .host
        .register_expr("record($event)", |_, _| Ok(Value::Null));

    let session = fixture.bind().unwrap();

    assert_eq!(fixture.element.property("userName"), Some(json!("ada")));
    assert_eq!(fixture.element.listener_count("save"), 1);
    assert_eq!(session.watch_count(), 1);
    assert_eq!(session.listener_count(), 1);
}

// ============================================================================
// Event phase
// ============================================================================

#[test]
fn event_expression_runs_in_a_fresh_cycle() {
    let fixture = Fixture::with_attributes(&[("ngce-on-foo", "name = name + 3")]);
    fixture.set("name", json!("Misko"));

    let calls = Rc::new(Cell::new(0usize));
    let seen = Rc::clone(&calls);
    fixture.host.register_expr("name = name + 3", move |scope, _| {
        seen.set(seen.get() + 1);
        let current = scope
            .get("name")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let next = format!("{current}3");
        scope.set("name", json!(next));
        Ok(json!(next))
    });

    let _session = fixture.bind().unwrap();
    let delivered = fixture.element.fire("foo", &json!({ "type": "foo" }));

    assert_eq!(delivered, 1);
    assert_eq!(calls.get(), 1);
    assert_eq!(fixture.scope.get("name"), Some(json!("Misko3")));
    assert_eq!(fixture.scope.digest_count(), 1);
}

#[test]
fn event_payload_reaches_the_expression_local() {
    let fixture = Fixture::with_attributes(&[("ngce-on-notify", "record($event)")]);

    let recorded = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&recorded);
    fixture.host.register_expr("record($event)", move |_, local| {
        sink.borrow_mut().push(local.cloned().unwrap_or(Value::Null));
        Ok(Value::Null)
    });

    let _session = fixture.bind().unwrap();
    fixture.element.fire("notify", &json!({ "detail": 7 }));

    assert_eq!(*recorded.borrow(), vec![json!({ "detail": 7 })]);
}

#[test]
fn camel_case_event_listens_under_kebab_name() {
    let fixture = Fixture::with_attributes(&[("ngce-on-myChange", "record($event)")]);
    fixture
        .host
        .register_expr("record($event)", |_, _| Ok(Value::Null));

    let _session = fixture.bind().unwrap();

    assert_eq!(fixture.element.listener_count("my-change"), 1);
    assert_eq!(fixture.element.fire("my-change", &json!(null)), 1);
    assert_eq!(fixture.element.fire("myChange", &json!(null)), 0);
}

#[test]
fn event_during_propagation_evaluates_directly() {
    let fixture = Fixture::with_attributes(&[
        ("ngce-prop-status", "probe()"),
        ("ngce-on-ping", "tally($event)"),
    ]);

    let armed = Rc::new(Cell::new(false));
    let trigger = Rc::clone(&armed);
    let element = fixture.element.clone();
    fixture.host.register_expr("probe()", move |_, _| {
        if trigger.replace(false) {
            element.fire("ping", &json!(1));
        }
        Ok(json!("ready"))
    });

    let hits = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&hits);
    fixture.host.register_expr("tally($event)", move |scope, _| {
        counter.set(counter.get() + 1);
        let n = scope.get("pings").and_then(|v| v.as_i64()).unwrap_or(0);
        scope.set("pings", json!(n + 1));
        Ok(Value::Null)
    });

    let _session = fixture.bind().unwrap();
    armed.set(true);
    // The probe fires mid-digest; a wrapped dispatch would panic here.
    fixture.digest();

    assert_eq!(hits.get(), 1);
    assert_eq!(fixture.scope.get("pings"), Some(json!(1)));
    assert_eq!(fixture.scope.digest_count(), 1);
}

// ============================================================================
// Live-phase failures
// ============================================================================

#[test]
fn evaluation_failure_is_reported_and_skipped() {
    let fixture = Fixture::with_attributes(&[
        ("ngce-prop-first", "flaky()"),
        ("ngce-prop-second", "b"),
    ]);
    fixture.set("a", json!(1));
    fixture.set("b", json!(2));

    let fail = Rc::new(Cell::new(false));
    let switch = Rc::clone(&fail);
    fixture.host.register_expr("flaky()", move |scope, _| {
        if switch.get() {
            return Err(HostError::new("flaky blew up"));
        }
        Ok(scope.get("a").unwrap_or(Value::Null))
    });

    let session = fixture.bind().unwrap();
    fixture.digest(); // settle the first-fire pass

    fail.set(true);
    fixture.digest();

    assert_eq!(fixture.element.property("first"), Some(json!(1)));
    assert_eq!(
        fixture.host.reported(),
        vec![BindError::Eval {
            attribute: "ngce-prop-first".to_string(),
            source: HostError::new("flaky blew up"),
        }]
    );
    assert_eq!(session.watch_count(), 2);

    // Recovery: the watch is still live and picks up the next good value.
    fail.set(false);
    fixture.set("a", json!(5));
    fixture.digest();
    assert_eq!(fixture.element.property("first"), Some(json!(5)));
    assert_eq!(fixture.host.reported().len(), 1);
}

#[test]
fn failing_event_expression_reports_and_siblings_survive() {
    let fixture = Fixture::with_attributes(&[
        ("ngce-on-boom", "explode()"),
        ("ngce-on-safe", "record($event)"),
    ]);
    fixture
        .host
        .register_expr("explode()", |_, _| Err(HostError::new("kaboom")));
    let recorded = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&recorded);
    fixture.host.register_expr("record($event)", move |_, local| {
        sink.borrow_mut().push(local.cloned().unwrap_or(Value::Null));
        Ok(Value::Null)
    });

    let session = fixture.bind().unwrap();

    assert_eq!(fixture.element.fire("boom", &json!(null)), 1);
    assert_eq!(
        fixture.host.reported(),
        vec![BindError::Eval {
            attribute: "ngce-on-boom".to_string(),
            source: HostError::new("kaboom"),
        }]
    );
    // The failed dispatch still ran inside a completed cycle.
    assert_eq!(fixture.scope.digest_count(), 1);

    fixture.element.fire("safe", &json!("ok"));
    assert_eq!(*recorded.borrow(), vec![json!("ok")]);
    assert_eq!(session.listener_count(), 2);
}

// ============================================================================
// Setup failures
// ============================================================================

#[test]
fn disallowed_dom_event_property_fails_compile() {
    let fixture = Fixture::with_attributes(&[("ngce-prop-onclick", "handler")]);
    let err = fixture.bind().unwrap_err();
    assert_eq!(
        err,
        BindError::DisallowedProperty {
            attribute: "ngce-prop-onclick".to_string(),
            property: "onclick".to_string(),
        }
    );
    assert!(err.is_setup_failure());

    let shouting = Fixture::with_attributes(&[("ngce-prop-ONCLICK", "handler")]);
    let err = shouting.bind().unwrap_err();
    assert_eq!(
        err,
        BindError::DisallowedProperty {
            attribute: "ngce-prop-ONCLICK".to_string(),
            property: "ONCLICK".to_string(),
        }
    );
}

#[test]
fn uncompilable_expression_fails_bind_with_no_partial_state() {
    let fixture = Fixture::with_attributes(&[("ngce-prop-x", "broken (")]);
    fixture.host.fail_compile("broken (");

    let err = fixture.bind().unwrap_err();

    assert!(matches!(
        &err,
        BindError::Compile { attribute, .. } if attribute == "ngce-prop-x"
    ));
    assert!(err.is_setup_failure());
    assert_eq!(fixture.scope.watcher_count(), 0);
    assert_eq!(fixture.element.property_count(), 0);
}

#[test]
fn failing_initial_apply_aborts_before_observers_register() {
    let fixture = Fixture::with_attributes(&[
        ("ngce-prop-a", "a"),
        ("ngce-prop-d", "doomed()"),
    ]);
    fixture.set("a", json!(1));
    fixture
        .host
        .register_expr("doomed()", |_, _| Err(HostError::new("no initial value")));

    let err = fixture.bind().unwrap_err();

    assert_eq!(
        err,
        BindError::InitialApply {
            attribute: "ngce-prop-d".to_string(),
            source: HostError::new("no initial value"),
        }
    );
    // Earlier writes in declaration order already landed; no observer did.
    assert_eq!(fixture.element.property("a"), Some(json!(1)));
    assert_eq!(fixture.scope.watcher_count(), 0);
    assert_eq!(fixture.element.listener_total(), 0);
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn destruction_signal_tears_down_exactly_once() {
    let fixture = Fixture::with_attributes(&[
        ("ngce-prop-disabled", "isDisabled"),
        ("ngce-on-save", "record($event)"),
    ]);
    fixture.set("isDisabled", json!(false));
    fixture
        .host
        .register_expr("record($event)", |_, _| Ok(Value::Null));

    let session = fixture.bind().unwrap();
    assert_eq!(fixture.scope.watcher_count(), 1);
    assert_eq!(fixture.element.listener_total(), 1);

    fixture.element.destroy();

    assert!(session.is_disposed());
    assert_eq!(session.watch_count(), 0);
    assert_eq!(fixture.scope.watcher_count(), 0);
    assert_eq!(fixture.element.listener_total(), 0);

    // Neither a repeat signal nor a manual dispose does anything further.
    fixture.element.destroy();
    session.dispose();
    assert!(fixture.host.reported().is_empty());
}

#[test]
fn manual_dispose_releases_guards() {
    let fixture = Fixture::with_attributes(&[("ngce-prop-value", "v")]);
    fixture.set("v", json!(1));

    let session = fixture.bind().unwrap();
    session.dispose();

    assert!(session.is_disposed());
    assert_eq!(fixture.scope.watcher_count(), 0);

    fixture.element.destroy();
    assert!(fixture.host.reported().is_empty());
}

#[test]
fn parent_destruction_cascades_to_bound_child() {
    let fixture = Fixture::with_attributes(&[("ngce-prop-value", "v")]);
    fixture.set("v", json!(1));
    let session = fixture.bind().unwrap();

    let parent = ngce_harness::ModelElement::new("host-view");
    parent.add_child(&fixture.element);
    parent.destroy();

    assert!(fixture.element.is_destroyed());
    assert!(session.is_disposed());
    assert_eq!(fixture.scope.watcher_count(), 0);
}

#[test]
fn failing_disposer_is_reported_and_isolated() {
    let fixture = Fixture::with_attributes(&[
        ("ngce-prop-a", "a"),
        ("ngce-prop-b", "b"),
        ("ngce-on-evt", "record($event)"),
    ]);
    fixture.set("a", json!(1));
    fixture.set("b", json!(2));
    fixture
        .host
        .register_expr("record($event)", |_, _| Ok(Value::Null));

    let session = fixture.bind().unwrap();
    assert_eq!(fixture.scope.watcher_count(), 2);

    fixture.scope.fail_next_unwatch();
    session.dispose();

    assert_eq!(
        fixture.host.reported(),
        vec![BindError::Teardown {
            attribute: "ngce-prop-a".to_string(),
            source: HostError::new("watch removal refused"),
        }]
    );
    // The refused guard leaves its watcher behind; the sibling still came out
    // and the listener detach still ran.
    assert_eq!(fixture.scope.watcher_count(), 1);
    assert_eq!(fixture.element.listener_total(), 0);
    assert!(session.is_disposed());
}
