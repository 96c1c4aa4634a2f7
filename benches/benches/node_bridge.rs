// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_node` reads, writes and creation.
//!
//! Pre-creation traffic only touches the shadow store; after creation the
//! cost depends on whether the caller is on the affine context.

use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use understory_affinity::{AffineQueue, AffineThread};
use understory_node::{HeadlessLayer, Node, NodeConfig, WritePolicy, props};

fn layer(context: Arc<dyn understory_affinity::AffineContext>) -> Node<HeadlessLayer> {
    Node::new(context, || Ok::<_, &'static str>(HeadlessLayer::new()))
}

fn configure(node: &Node<HeadlessLayer>) {
    node.set(props::FRAME, Rect::new(0.0, 0.0, 320.0, 200.0));
    node.set(props::ANCHOR_POINT, Point::ZERO);
    node.set(props::ALPHA, 0.8);
    node.set(props::HIDDEN, false);
    node.set(props::NAME, Some("card".to_owned()));
    node.set(props::BORDER_WIDTH, 1.0);
    node.set_needs_display();
}

fn bench_shadow(c: &mut Criterion) {
    let queue = AffineQueue::new();
    let mut group = c.benchmark_group("node/shadow");

    group.bench_function("set", |b| {
        let node = layer(Arc::new(queue.clone()));
        b.iter(|| node.set(props::ALPHA, black_box(0.5)));
    });

    group.bench_function("get/pending", |b| {
        let node = layer(Arc::new(queue.clone()));
        node.set(props::ALPHA, 0.5);
        b.iter(|| black_box(node.get(props::ALPHA)));
    });

    group.bench_function("get/default", |b| {
        let node = layer(Arc::new(queue.clone()));
        b.iter(|| black_box(node.get(props::BOUNDS)));
    });

    group.finish();
}

fn bench_create(c: &mut Criterion) {
    let queue = AffineQueue::new();
    let mut group = c.benchmark_group("node/create");

    group.bench_function("empty", |b| {
        b.iter_batched(
            || layer(Arc::new(queue.clone())),
            |node| black_box(node.ensure_created().is_ok()),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("configured", |b| {
        b.iter_batched(
            || {
                let node = layer(Arc::new(queue.clone()));
                configure(&node);
                node
            },
            |node| black_box(node.ensure_created().is_ok()),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_created(c: &mut Criterion) {
    let mut group = c.benchmark_group("node/created");

    let queue = AffineQueue::new();
    let direct = layer(Arc::new(queue));
    let _ = direct.ensure_created();
    group.bench_function("set/affine", |b| {
        b.iter(|| direct.set(props::ALPHA, black_box(0.5)));
    });
    group.bench_function("get/affine", |b| {
        b.iter(|| black_box(direct.get(props::ALPHA)));
    });

    let Ok(main) = AffineThread::spawn("bench-main") else {
        return;
    };
    let marshaled = layer(Arc::new(main.handle()));
    let _ = marshaled.ensure_created();
    group.bench_function("set/marshaled", |b| {
        b.iter(|| marshaled.set(props::ALPHA, black_box(0.5)));
    });
    group.bench_function("get/marshaled", |b| {
        b.iter(|| black_box(marshaled.get(props::ALPHA)));
    });

    let deferred = Node::with_config(
        NodeConfig::new().with_write_policy(WritePolicy::Deferred),
        Arc::new(main.handle()),
        || Ok::<_, &'static str>(HeadlessLayer::new()),
    );
    let _ = deferred.ensure_created();
    group.bench_function("set/deferred", |b| {
        b.iter(|| deferred.set(props::ALPHA, black_box(0.5)));
    });

    group.finish();
}

criterion_group!(benches, bench_shadow, bench_create, bench_created);
criterion_main!(benches);
