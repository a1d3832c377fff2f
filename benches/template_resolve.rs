// SPDX-License-Identifier: MIT OR Apache-2.0
//! Benchmarks for catalog loading and template resolution across catalog
//! sizes and placeholder counts.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::collections::BTreeMap;

use sce_templates::{Template, TemplateRegistry, TemplateResolver};

// ── Helpers ─────────────────────────────────────────────────────────────

fn catalog_json(classes: usize) -> String {
    let entries: Vec<String> = (0..classes)
        .map(|i| {
            format!(
                r#""CLASS_{i}": {{"message": ["class {i} failed for <name> at <position>"], "sqlState": "22000"}}"#
            )
        })
        .collect();
    format!("{{{}}}", entries.join(","))
}

fn template_with(placeholders: usize) -> (String, BTreeMap<String, String>) {
    let mut text = String::from("failure:");
    let mut params = BTreeMap::new();
    for i in 0..placeholders {
        text.push_str(&format!(" field <p{i}> was invalid;"));
        params.insert(format!("p{i}"), format!("value-{i}"));
    }
    (text, params)
}

// ── Benches ─────────────────────────────────────────────────────────────

fn bench_load_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_catalog");
    for &count in &[10usize, 100, 1_000] {
        let json = catalog_json(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &json, |b, json| {
            b.iter(|| TemplateRegistry::from_json_str(black_box(json)).unwrap());
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let registry = TemplateRegistry::from_json_str(&catalog_json(1_000)).unwrap();
    let params = BTreeMap::from([
        ("name".to_string(), "col_a".to_string()),
        ("position".to_string(), "17".to_string()),
    ]);

    group.bench_function("hit", |b| {
        b.iter(|| registry.resolve(black_box("CLASS_500"), black_box(&params)))
    });
    group.bench_function("unknown_class", |b| {
        b.iter(|| registry.resolve(black_box("CLASS_UNKNOWN"), black_box(&params)))
    });
    group.finish();
}

fn bench_render_placeholders(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_placeholders");
    for &count in &[1usize, 8, 64] {
        let (text, params) = template_with(count);
        let template = Template::parse(text);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &(template, params),
            |b, (template, params)| b.iter(|| template.render(black_box(params)).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_load_catalog,
    bench_resolve,
    bench_render_placeholders,
);
criterion_main!(benches);
