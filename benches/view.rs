//! Benchmarks for spark-view
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use spark_view::expression::{Evaluator, parse};
use spark_view::reactivity::DataStore;
use spark_view::{App, AppOptions, MemoryTree, NodeId, Value};

// =============================================================================
// HELPERS
// =============================================================================

/// `<div id="app">` with `rows` paragraphs, each interpolating `count`.
fn counter_tree(rows: usize) -> MemoryTree {
    let tree = MemoryTree::new();
    let root = tree.element_with("div", &[("id", "app")]);
    for _ in 0..rows {
        let p = tree.child(root, "p", &[(":title", "'n=' + count")]);
        tree.append_text(p, "Count: {{ count }} of {{ total }}");
    }
    tree
}

fn counter_options() -> AppOptions {
    AppOptions::new()
        .element_selector("#app")
        .data("count", 0)
        .data("total", 100)
}

// =============================================================================
// EXPRESSION BENCHMARKS
// =============================================================================

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_expression", |b| {
        b.iter(|| black_box(parse("items[idx].name ? a + b * 2 : 'none'")))
    });
}

fn bench_evaluate_cached(c: &mut Criterion) {
    let store = DataStore::new();
    store.declare("a", Value::from(2));
    store.declare("b", Value::from(3));
    let evaluator = Evaluator::new();
    c.bench_function("evaluate_cached", |b| {
        b.iter(|| black_box(evaluator.evaluate("a * b + 1", &store, None)))
    });
}

fn bench_evaluate_tracked(c: &mut Criterion) {
    let store = DataStore::new();
    store.declare("a", Value::from(2));
    let evaluator = Evaluator::new();
    let node = NodeId::new(0, 0);
    c.bench_function("evaluate_tracked", |b| {
        b.iter(|| black_box(evaluator.evaluate("a > 1 ? 'big' : 'small'", &store, Some(node))))
    });
}

// =============================================================================
// STORE BENCHMARKS
// =============================================================================

fn bench_store_set_same_value(c: &mut Criterion) {
    let store = DataStore::new();
    store.declare("n", Value::from(42));
    c.bench_function("store_set_same_value", |b| {
        b.iter(|| store.set("n", black_box(Value::from(42))))
    });
}

// =============================================================================
// APP BENCHMARKS
// =============================================================================

fn bench_mount(c: &mut Criterion) {
    let mut group = c.benchmark_group("mount");
    for rows in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, &rows| {
            b.iter(|| {
                let tree = counter_tree(rows);
                black_box(App::new(tree, counter_options()))
            })
        });
    }
    group.finish();
}

fn bench_set_rerender(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_rerender");
    for rows in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, &rows| {
            let app = App::new(counter_tree(rows), counter_options()).unwrap();
            let mut n = 0;
            b.iter(|| {
                n += 1;
                app.set("count", black_box(n)).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_model_input(c: &mut Criterion) {
    let tree = MemoryTree::new();
    let root = tree.element_with("div", &[("id", "app")]);
    let input = tree.child(root, "input", &[("e-model", "name")]);
    let label = tree.child(root, "span", &[]);
    tree.append_text(label, "Hello {{ name }}");
    let _app = App::new(
        tree.clone(),
        AppOptions::new().element_selector("#app").data("name", ""),
    )
    .unwrap();

    let mut n = 0u64;
    c.bench_function("model_input", |b| {
        b.iter(|| {
            n += 1;
            tree.input(input, &n.to_string()).unwrap()
        })
    });
}

criterion_group!(
    expression_benches,
    bench_parse,
    bench_evaluate_cached,
    bench_evaluate_tracked,
);

criterion_group!(store_benches, bench_store_set_same_value);

criterion_group!(app_benches, bench_mount, bench_set_rerender, bench_model_input);

criterion_main!(expression_benches, store_benches, app_benches);
