/// Evaluate `ip_to_geo` from many threads at once, the way a query engine
/// spreads rows over its workers. The database is opened by whichever
/// thread gets there first and shared by the rest.
///
/// Usage:
///   cargo run --example concurrent_rows -- /usr/share/GeoIP 81.2.69.160 8.8.8.8
use ipgeo::{ip_to_geo, GeoTrait, GEO_DATABASE};
use std::thread;

fn main() {
    let mut args = std::env::args().skip(1);
    let dir = args.next().expect("usage: concurrent_rows DIR ADDRESS...");
    let addresses: Vec<String> = args.collect();

    let rows = thread::scope(|s| {
        let workers: Vec<_> = addresses
            .iter()
            .map(|address| {
                let dir = dir.as_str();
                s.spawn(move || {
                    GeoTrait::ALL.map(|t| {
                        ip_to_geo(Some(t.as_str()), Some(address.as_str()), Some(dir))
                            .unwrap_or_else(|err| format!("error: {err}"))
                    })
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().expect("worker panicked"))
            .collect::<Vec<_>>()
    });

    for (address, values) in addresses.iter().zip(rows) {
        println!("{address}\t{}", values.join("\t"));
    }
    if let Some(handle) = GEO_DATABASE.get() {
        eprintln!("database: {}", handle.path());
    }
}
