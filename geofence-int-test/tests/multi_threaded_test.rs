use geofence::{Geofence, LoadedRegions, Region, RegionSource, SourceChanged};
use geofence_int_test::test_util::{cleanup, create_manual_context, run_test};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use test_retry::retry;

/// Alternates between two disjoint region sets on every load.
fn alternating_source() -> Arc<dyn RegionSource> {
    let loads = AtomicU64::new(0);
    Arc::new(move || {
        let prefix = if loads.fetch_add(1, Ordering::AcqRel) % 2 == 0 {
            "A"
        } else {
            "B"
        };
        LoadedRegions {
            regions: (0..20)
                .map(|i| Region::new(format!("{}{}", prefix, i), 47.0 + i as f64 * 0.1, 11.0, 100))
                .collect(),
            racing_mode: prefix == "B",
        }
    })
}

#[test]
#[retry]
fn test_queries_see_whole_snapshots_during_rebuilds() {
    let geofence = Geofence::from_source(alternating_source(), Duration::ZERO).unwrap();
    let num_readers = 4;
    let barrier = Arc::new(Barrier::new(num_readers + 1));
    let done = Arc::new(AtomicBool::new(false));

    let mut handles = vec![];
    for _ in 0..num_readers {
        let geofence = geofence.clone();
        let barrier = Arc::clone(&barrier);
        let done = Arc::clone(&done);

        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut checked = 0usize;
            while !done.load(Ordering::Acquire) {
                let snapshot = geofence.store().snapshot();
                assert_eq!(snapshot.len(), 20);

                let prefix = &snapshot.regions()[0].name()[..1];
                assert!(snapshot.regions().iter().all(|r| r.name().starts_with(prefix)));
                assert_eq!(snapshot.racing_mode(), prefix == "B");

                let found = snapshot.find(47.5, 11.0, false).unwrap();
                assert_eq!(found.name(), format!("{}5", prefix));
                checked += 1;
            }
            checked
        }));
    }

    barrier.wait();
    for _ in 0..200 {
        geofence.coordinator().rebuild();
    }
    done.store(true, Ordering::Release);

    for handle in handles {
        assert!(handle.join().unwrap() > 0);
    }
    geofence.close().unwrap();
}

#[test]
fn test_concurrent_signals_start_one_reload() {
    run_test(
        || create_manual_context(&[("geofence.csv", "Home,48.0,11.0,100\n")], 200),
        |ctx| {
            let coordinator = ctx.geofence().coordinator().clone();
            let num_threads = 8;
            let barrier = Arc::new(Barrier::new(num_threads));

            let handles: Vec<_> = (0..num_threads)
                .map(|i| {
                    let coordinator = coordinator.clone();
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        coordinator.signal(SourceChanged::new(format!("t{}.csv", i)))
                    })
                })
                .collect();

            let accepted = handles
                .into_iter()
                .map(|h| h.join().unwrap_or(false))
                .filter(|accepted| *accepted)
                .count();
            assert_eq!(accepted, 1);

            awaitility::at_most(Duration::from_secs(2)).until(|| coordinator.reload_count() == 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_readers_on_file_backed_geofence() {
    run_test(
        || create_manual_context(&[("geofence.csv", "Home,48.0,11.0,100\nWork,48.1,11.5,200\n")], 0),
        |ctx| {
            let geofence = ctx.geofence();
            let handles: Vec<_> = (0..5)
                .map(|_| {
                    let geofence = geofence.clone();
                    thread::spawn(move || {
                        (0..1000)
                            .filter(|_| geofence.find_quiet(48.1, 11.5).is_some())
                            .count()
                    })
                })
                .collect();

            for _ in 0..20 {
                geofence.coordinator().rebuild();
            }
            for handle in handles {
                assert_eq!(handle.join().unwrap_or(0), 1000);
            }
            Ok(())
        },
        cleanup,
    )
}
