//! Placement search benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use packrat::inventory::container::Container;
use packrat::items::definition::{ItemCategory, ItemDefinition};
use packrat::items::instance::{GridPos, ItemInstance};
use std::sync::Arc;

fn crowded_stash() -> Container {
    let mut container = Container::new("stash", 10, 20);
    let filler = Arc::new(
        ItemDefinition::new("filler", "Filler", ItemCategory::Misc).with_size(2, 2),
    );
    // Checkerboard of 2x2 blocks leaving scattered gaps
    let mut id = 1;
    for y in (0..20).step_by(4) {
        for x in (0..10).step_by(4) {
            let item = ItemInstance::new(id, Arc::clone(&filler));
            let _ = container.add_item(item, GridPos::new(x, y));
            id += 1;
        }
    }
    container
}

fn bench_find_available_position(c: &mut Criterion) {
    let container = crowded_stash();
    let probe = ItemInstance::new(
        9999,
        Arc::new(
            ItemDefinition::new("probe", "Probe", ItemCategory::Misc)
                .with_size(4, 2)
                .rotatable(),
        ),
    );

    c.bench_function("find_available_position crowded 10x20", |b| {
        b.iter(|| black_box(&container).find_available_position(black_box(&probe)))
    });
}

fn bench_placement_map(c: &mut Criterion) {
    let container = crowded_stash();
    let probe = ItemInstance::new(
        9999,
        Arc::new(ItemDefinition::new("probe", "Probe", ItemCategory::Misc).with_size(3, 3)),
    );

    c.bench_function("placement_map 3x3", |b| {
        b.iter(|| black_box(&container).placement_map(black_box(&probe), GridPos::new(4, 4)))
    });
}

criterion_group!(benches, bench_find_available_position, bench_placement_map);
criterion_main!(benches);
