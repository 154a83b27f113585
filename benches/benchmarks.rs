use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ipgeo::{
    ip4_to_integer, Address, DatabaseCache, GeoConfig, GeoLookup, GeoRecord, GeoTrait,
    MaxMindDatabase,
};
use std::hint::black_box;

#[path = "../tests/common/mod.rs"]
mod common;

// Generate dotted-decimal rows, every tenth one malformed
fn generate_ipv4_rows(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            if i % 10 == 9 {
                format!("host-{}.example.com", i)
            } else {
                format!(
                    "{}.{}.{}.{}",
                    (i % 223) + 1,
                    (i * 7) % 256,
                    (i * 13) % 256,
                    (i * 17) % 256
                )
            }
        })
        .collect()
}

fn generate_ipv6_rows(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                "2001:db8:{:x}:{:x}::{:x}",
                i % 65536,
                (i * 7) % 65536,
                (i * 13) % 65536
            )
        })
        .collect()
}

fn bench_ip4_to_integer(c: &mut Criterion) {
    let rows = generate_ipv4_rows(1000);

    let mut group = c.benchmark_group("ip4_to_integer");
    group.throughput(Throughput::Elements(rows.len() as u64));

    group.bench_function("rows", |b| {
        b.iter(|| {
            rows.iter()
                .map(|row| ip4_to_integer(black_box(Some(row.as_str()))))
                .sum::<i64>()
        });
    });

    group.finish();
}

fn bench_address_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("address_parse");

    for (name, rows) in [
        ("ipv4", generate_ipv4_rows(1000)),
        ("ipv6", generate_ipv6_rows(1000)),
    ] {
        group.throughput(Throughput::Elements(rows.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &rows, |b, rows| {
            b.iter(|| {
                rows.iter()
                    .filter_map(|row| Address::parse(black_box(Some(row.as_str()))))
                    .count()
            });
        });
    }

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let record = GeoRecord {
        country: Some("United Kingdom".to_string()),
        subdivision: Some("West Berkshire".to_string()),
        city: Some("Boxford".to_string()),
        latitude: Some(51.75),
        longitude: Some(-1.25),
    };

    let mut group = c.benchmark_group("extract");
    for geo_trait in GeoTrait::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(geo_trait),
            &geo_trait,
            |b, geo_trait| {
                b.iter(|| geo_trait.extract(black_box(&record)));
            },
        );
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let base = common::write_city_database(dir.path());
    let cache = DatabaseCache::<MaxMindDatabase>::new();
    let geo = GeoLookup::new(&cache, GeoConfig::new(base));
    let rows = [common::FULL_IP, common::SPARSE_IP, common::UNCOVERED_IP];

    let mut group = c.benchmark_group("lookup");
    group.throughput(Throughput::Elements(rows.len() as u64));

    for geo_trait in [GeoTrait::Country, GeoTrait::Location] {
        group.bench_with_input(
            BenchmarkId::from_parameter(geo_trait),
            &geo_trait,
            |b, &geo_trait| {
                b.iter(|| {
                    for row in rows {
                        let value = geo
                            .lookup(geo_trait, black_box(Some(row)), None)
                            .expect("lookup failed");
                        black_box(value);
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_ip4_to_integer,
    bench_address_parse,
    bench_extract,
    bench_lookup
);
criterion_main!(benches);
