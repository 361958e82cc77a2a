//! Benchmarks for attribute classification and name canonicalization.
//!
//! Run with: cargo bench -p ngce-core --bench classify_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ngce_core::attr::{camel_to_kebab, canonical_event_name, canonical_property_name, classify};
use std::hint::black_box;

fn bench_classify_recognized(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify/recognized");

    for (label, raw) in [
        ("prop_plain", "ngce-prop-disabled"),
        ("prop_underscore", "ngce-prop-my_long_prop_name"),
        ("prop_prefixed", "data-ngce:prop:value"),
        ("event_camel", "ngce-on-myCustomEvent"),
        ("event_prefixed", "x_ngce_on_value_changed"),
        ("bulk_props", "ngce-props"),
        ("bulk_events", "data-ngce-events"),
    ] {
        group.bench_with_input(BenchmarkId::new("classify", label), &raw, |b, raw| {
            b.iter(|| black_box(classify(raw)))
        });
    }

    group.finish();
}

fn bench_classify_misses(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify/misses");

    for (label, raw) in [
        ("unrelated", "class"),
        ("unrelated_long", "data-analytics-category-override"),
        ("near_miss_marker", "ngce-pro-x"),
        ("near_miss_tail", "ngce-prop-"),
        ("ng_attr", "ng-if"),
    ] {
        group.bench_with_input(BenchmarkId::new("classify", label), &raw, |b, raw| {
            b.iter(|| black_box(classify(raw)))
        });
    }

    group.finish();
}

fn bench_canonicalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonicalize");

    group.bench_function("property_underscores", |b| {
        b.iter(|| black_box(canonical_property_name("my_long_prop_name")))
    });

    group.bench_function("event_camel_tail", |b| {
        b.iter(|| black_box(canonical_event_name("myCustomEventName")))
    });

    group.bench_function("event_mixed_tail", |b| {
        b.iter(|| black_box(canonical_event_name("My-camel_title_Mixed")))
    });

    group.bench_function("camel_to_kebab", |b| {
        b.iter(|| black_box(camel_to_kebab("aVeryLongCamelCaseIdentifier")))
    });

    group.finish();
}

/// One element's worth of attributes, scanned the way the compiler does it.
fn bench_attribute_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify/scan");

    let attrs = [
        "id",
        "class",
        "ngce-prop-disabled",
        "ngce-prop-user_name",
        "data-ngce:on:value_changed",
        "ngce-on-close",
        "style",
        "aria-label",
        "ngce-props",
        "data-test-id",
    ];

    group.throughput(Throughput::Elements(attrs.len() as u64));
    group.bench_function("mixed_10", |b| {
        b.iter(|| {
            for raw in &attrs {
                black_box(classify(raw));
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_classify_recognized,
    bench_classify_misses,
    bench_canonicalization,
    bench_attribute_scan,
);

criterion_main!(benches);
