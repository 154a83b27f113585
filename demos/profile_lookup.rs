/// Profiling harness: run geo lookups in a tight loop for sampling profilers.
///
/// Usage:
///   GEOIP_MMDB_DIR=/usr/share/GeoIP cargo run --profile dev-optimized --example profile_lookup
///
///   Then in another terminal:
///     sample <PID> 5 -f /tmp/profile_lookup.txt
///
///   Or simply run with `time` for a quick measurement.
use ipgeo::{ip_to_geo, GeoTrait};

fn main() {
    let test_ips = [
        "1.0.0.1",
        "8.8.8.8",
        "81.2.69.160",
        "93.184.216.34",
        "142.250.185.78",
        "208.67.222.222",
        "not-an-ip",
    ];

    let iterations = 500_000;
    eprintln!("Running {} iterations of geo lookups...", iterations);

    let start = std::time::Instant::now();
    for i in 0..iterations {
        let ip = test_ips[i % test_ips.len()];
        let geo_trait = GeoTrait::ALL[i % GeoTrait::ALL.len()];
        let result = ip_to_geo(Some(geo_trait.as_str()), Some(ip), None)
            .expect("Failed to look up address");
        std::hint::black_box(result);
    }
    let elapsed = start.elapsed();
    eprintln!(
        "Done in {:?} ({:.0} lookups/sec)",
        elapsed,
        iterations as f64 / elapsed.as_secs_f64()
    );
}
