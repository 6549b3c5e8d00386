use geofence::errors::GeofenceResult;
use geofence::geometry::offset_latitude;
use geofence_int_test::test_util::create_manual_context;
use std::fmt::Write;

fn main() -> GeofenceResult<()> {
    println!("Starting stress test...");

    let mut csv = String::new();
    for i in 0..200 {
        let lat = 47.0 + (i % 20) as f64 * 0.1;
        let lng = 10.0 + (i / 20) as f64 * 0.1;
        let _ = writeln!(csv, "Region {},{},{},{}", i, lat, lng, 100 + i);
    }
    let ctx = create_manual_context(&[("geofence.csv", &csv)], 0)?;
    let geofence = ctx.geofence();
    println!("Loaded {} regions", geofence.region_count());

    let count = 1_000_000;
    let start = std::time::Instant::now();
    let mut hits = 0usize;
    for i in 0..count {
        let lat = offset_latitude(47.0 + (i % 20) as f64 * 0.1, (i % 300) as f64);
        let lng = 10.0 + ((i / 20) % 10) as f64 * 0.1;
        if geofence.find_quiet(lat, lng).is_some() {
            hits += 1;
        }
    }
    let elapsed = start.elapsed();
    println!("Ran {} queries ({} hits) in {:?}", count, hits, elapsed);

    let start = std::time::Instant::now();
    let reloaded = geofence.coordinator().rebuild();
    println!("Rebuilt {} regions in {:?}", reloaded, start.elapsed());

    geofence.close()?;
    Ok(())
}
