//! A minimal MaxMind DB writer for tests.
//!
//! The database is IPv4-only with 24-bit records and two search tree nodes:
//!
//! | network        | record                                          |
//! |----------------|-------------------------------------------------|
//! | 0.0.0.0/2      | none                                            |
//! | 64.0.0.0/2     | United Kingdom / England, West Berkshire / Boxford, 51.75,-1.25 |
//! | 128.0.0.0/1    | Japan, latitude 35.5 only                       |
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use camino::Utf8PathBuf;
use ipgeo::DATABASE_FILENAME;

pub const FULL_IP: &str = "81.2.69.160";
pub const SPARSE_IP: &str = "202.196.224.1";
pub const UNCOVERED_IP: &str = "8.8.8.8";

const NODE_COUNT: u32 = 2;
const METADATA_MARKER: &[u8] = b"\xAB\xCD\xEFMaxMind.com";

enum Field {
    Str(&'static str),
    F64(f64),
    U16(u16),
    U32(u32),
    U64(u64),
    Map(Vec<(&'static str, Field)>),
    Array(Vec<Field>),
}

use Field::*;

fn control(out: &mut Vec<u8>, type_num: u8, size: usize) {
    assert!(size < 29, "field too large for a one-byte size");
    if type_num <= 7 {
        out.push((type_num << 5) | size as u8);
    } else {
        out.push(size as u8);
        out.push(type_num - 7);
    }
}

fn encode(out: &mut Vec<u8>, field: &Field) {
    match field {
        Str(s) => {
            control(out, 2, s.len());
            out.extend_from_slice(s.as_bytes());
        }
        F64(v) => {
            control(out, 3, 8);
            out.extend_from_slice(&v.to_be_bytes());
        }
        U16(v) => {
            control(out, 5, 2);
            out.extend_from_slice(&v.to_be_bytes());
        }
        U32(v) => {
            control(out, 6, 4);
            out.extend_from_slice(&v.to_be_bytes());
        }
        U64(v) => {
            control(out, 9, 8);
            out.extend_from_slice(&v.to_be_bytes());
        }
        Map(entries) => {
            control(out, 7, entries.len());
            for (key, value) in entries {
                encode(out, &Str(*key));
                encode(out, value);
            }
        }
        Array(items) => {
            control(out, 11, items.len());
            for item in items {
                encode(out, item);
            }
        }
    }
}

fn names(entries: &[(&'static str, &'static str)]) -> Field {
    Map(entries.iter().map(|&(k, v)| (k, Str(v))).collect())
}

fn full_record() -> Field {
    Map(vec![
        (
            "city",
            Map(vec![
                ("geoname_id", U32(2655045)),
                ("names", names(&[("de", "Boxford"), ("en", "Boxford")])),
            ]),
        ),
        (
            "country",
            Map(vec![
                ("iso_code", Str("GB")),
                (
                    "names",
                    names(&[("de", "Vereinigtes Königreich"), ("en", "United Kingdom")]),
                ),
            ]),
        ),
        (
            "location",
            Map(vec![
                ("accuracy_radius", U16(100)),
                ("latitude", F64(51.75)),
                ("longitude", F64(-1.25)),
                ("time_zone", Str("Europe/London")),
            ]),
        ),
        (
            "subdivisions",
            Array(vec![
                Map(vec![
                    ("iso_code", Str("ENG")),
                    ("names", names(&[("de", "England"), ("en", "England")])),
                ]),
                Map(vec![("names", names(&[("en", "West Berkshire")]))]),
            ]),
        ),
    ])
}

fn sparse_record() -> Field {
    Map(vec![
        ("country", Map(vec![("names", names(&[("en", "Japan")]))])),
        ("location", Map(vec![("latitude", F64(35.5))])),
    ])
}

fn metadata() -> Field {
    Map(vec![
        ("binary_format_major_version", U16(2)),
        ("binary_format_minor_version", U16(0)),
        ("build_epoch", U64(1_700_000_000)),
        ("database_type", Str("GeoIP2-City")),
        ("description", Map(vec![("en", Str("ipgeo test database"))])),
        ("ip_version", U16(4)),
        ("languages", Array(vec![Str("de"), Str("en")])),
        ("node_count", U32(NODE_COUNT)),
        ("record_size", U16(24)),
    ])
}

fn push_record(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes()[1..]);
}

/// Encode the whole database file.
pub fn city_database() -> Vec<u8> {
    let mut data = Vec::new();
    encode(&mut data, &full_record());
    let sparse_offset = data.len() as u32;
    encode(&mut data, &sparse_record());

    // Record values above the node count point into the data section.
    let data_pointer = |offset: u32| NODE_COUNT + 16 + offset;

    let mut db = Vec::new();
    // node 0: 0/1 -> node 1, 128/1 -> sparse record
    push_record(&mut db, 1);
    push_record(&mut db, data_pointer(sparse_offset));
    // node 1: 0/2 -> no data, 64/2 -> full record
    push_record(&mut db, NODE_COUNT);
    push_record(&mut db, data_pointer(0));

    db.extend_from_slice(&[0u8; 16]);
    db.extend_from_slice(&data);
    db.extend_from_slice(METADATA_MARKER);
    encode(&mut db, &metadata());
    db
}

/// Write the database as `GeoIP2-City.mmdb` inside `dir` and return `dir`.
pub fn write_city_database(dir: &Path) -> Utf8PathBuf {
    fs::write(dir.join(DATABASE_FILENAME), city_database()).expect("write test database");
    Utf8PathBuf::from_path_buf(dir.to_path_buf()).expect("utf-8 temp dir")
}
