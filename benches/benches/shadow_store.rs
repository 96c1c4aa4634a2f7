// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for the sequenced `understory_property` store.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Rect;
use understory_node::{BackingKind, props};
use understory_property::{ErasedValue, PropertyStore, Sequence};

fn filled(writes: u64) -> PropertyStore<u32> {
    let mut store = PropertyStore::new(0);
    for seq in 0..writes {
        let index = u16::try_from(seq % props::COUNT as u64).unwrap_or(0);
        let id = understory_property::PropertyId::new(index);
        store.set_erased(id, ErasedValue::new(seq), Sequence::new(seq));
    }
    store
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("shadow_store/write");

    group.bench_function("typed/same_property", |b| {
        let mut store = PropertyStore::new(0_u32);
        let mut seq = 0;
        b.iter(|| {
            seq += 1;
            black_box(store.set(props::ALPHA, 0.5, Sequence::new(seq)))
        });
    });

    group.bench_function("typed/stale", |b| {
        let mut store = PropertyStore::new(0_u32);
        store.set(props::FRAME, Rect::ZERO, Sequence::new(u64::MAX));
        b.iter(|| black_box(store.set(props::FRAME, Rect::ZERO, Sequence::new(1))));
    });

    group.bench_function("read/hit", |b| {
        let store = filled(props::COUNT as u64);
        b.iter(|| black_box(store.get_erased(props::id::ALPHA).is_some()));
    });

    group.finish();

    let mut group = c.benchmark_group("shadow_store/drain_sorted");
    let registry = BackingKind::Layer.properties();
    for &writes in &[4_u64, 16, props::COUNT as u64] {
        group.bench_with_input(BenchmarkId::from_parameter(writes), &writes, |b, &writes| {
            b.iter_batched(
                || filled(writes),
                |mut store| black_box(store.drain_sorted(registry)),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_store);
criterion_main!(benches);
