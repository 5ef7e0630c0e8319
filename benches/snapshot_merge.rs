//! Benchmarks for snapshot reconciliation
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use live_inspector::sync::SnapshotStore;
use live_inspector::types::{Axis, Entity, EntityField, FieldKey, Transform, TransformPart, Vec3};

fn scene(size: usize, offset: f64) -> Vec<Entity> {
    (0..size as u64)
        .map(|id| {
            let transform = Transform {
                position: Vec3::new(id as f64 + offset, offset, 0.0),
                ..Transform::default()
            };
            Entity::new(id, format!("Actor_{}", id))
                .with_tag(if id % 3 == 0 { "Light" } else { "Untagged" })
                .with_transform(transform)
        })
        .collect()
}

fn bench_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_replace");

    for size in [100, 1_000, 10_000].iter() {
        let incoming = scene(*size, 1.0);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("replace", size), &incoming, |b, incoming| {
            let mut store = SnapshotStore::new();
            store.replace(scene(*size, 0.0));
            b.iter(|| store.replace(black_box(incoming.clone())));
        });
    }

    group.finish();
}

fn bench_replace_preserving(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_replace_preserving");

    for pending in [1usize, 8, 64].iter() {
        let protected: Vec<FieldKey> = (0..*pending as u64)
            .map(|i| {
                if i % 2 == 0 {
                    FieldKey::TransformAxis {
                        entity: i * 7,
                        part: TransformPart::Position,
                        axis: Axis::Y,
                    }
                } else {
                    FieldKey::EntityProperty {
                        entity: i * 7,
                        field: EntityField::Name,
                    }
                }
            })
            .collect();
        let incoming = scene(1_000, 1.0);

        group.bench_with_input(
            BenchmarkId::new("pending_fields", pending),
            &protected,
            |b, protected| {
                let mut store = SnapshotStore::new();
                store.replace(scene(1_000, 0.0));
                b.iter(|| store.replace_preserving(black_box(incoming.clone()), protected));
            },
        );
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_filter");

    let mut store = SnapshotStore::new();
    store.replace(scene(10_000, 0.0));

    for query in ["", "light", "actor_99", "  ACTOR_1  "].iter() {
        group.bench_with_input(BenchmarkId::new("filtered", query.trim()), query, |b, query| {
            b.iter(|| black_box(store.filtered(query)).len());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_replace, bench_replace_preserving, bench_filter);
criterion_main!(benches);
