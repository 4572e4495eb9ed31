use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use tzif_rules::tz::{rules, tzif};

const TZ_AMS: &[u8] = include_bytes!("../../tests/tzif/Amsterdam.tzif");

pub fn parse_tzif(c: &mut Criterion) {
    c.bench_function("Parse TZif", |b| {
        b.iter(|| tzif::parse(black_box(TZ_AMS)).unwrap())
    });
}

pub fn build_rules(c: &mut Criterion) {
    let tzif = tzif::parse(TZ_AMS).unwrap();
    c.bench_function("Build rules", |b| {
        b.iter(|| rules::build(black_box(tzif.data_block())).unwrap())
    });
}

pub fn offset_for_instant(c: &mut Criterion) {
    let rules = tzif_rules::decode(TZ_AMS).unwrap();
    c.bench_function("offset for instant", |b| {
        b.iter(|| rules.offset_for_instant(black_box(1719946800)))
    });
}

pub fn ambiguity_for_local(c: &mut Criterion) {
    let rules = tzif_rules::decode(TZ_AMS).unwrap();
    c.bench_function("offset for local", |b| {
        b.iter(|| rules.ambiguity_for_local(black_box(1719946800)))
    });
}

criterion_group!(
    benches,
    parse_tzif,
    build_rules,
    offset_for_instant,
    ambiguity_for_local,
);
criterion_main!(benches);
