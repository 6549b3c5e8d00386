use geofence::{Geofence, GeofenceBuilder, GeofenceResult};
use std::backtrace::Backtrace;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use tempfile::TempDir;

/// Runs a test with retry logic and error handling.
/// Reload tests depend on timers and file modification times, so a failed
/// attempt is retried before the test is reported as failed.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> GeofenceResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> GeofenceResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> GeofenceResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;
    let mut last_backtrace: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx)
                        .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();

        let (error, backtrace) = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => (e, bt),
            Err(panic_err) => {
                let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                (format!("Panic: {}", err_msg), Backtrace::capture().to_string())
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", error);
            eprintln!("Retrying in {}ms...\n", 100 * attempt);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(error);
        last_backtrace = Some(backtrace);
    }

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {} attempts", MAX_RETRIES);
    eprintln!("Last error: {}", last_error.as_deref().unwrap_or("Unknown"));
    if let Some(bt) = &last_backtrace {
        if !bt.is_empty() && !bt.contains("disabled") {
            eprintln!("\nBacktrace:\n{}", bt);
        }
    }
    eprintln!("=====================================================\n");

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// A temporary region directory and the geofence opened on it.
#[derive(Clone)]
pub struct TestContext {
    dir: Arc<TempDir>,
    geofence: Geofence,
}

impl TestContext {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn geofence(&self) -> Geofence {
        self.geofence.clone()
    }

    /// Replaces the contents of a region file and moves its modification time
    /// forward, so the change is visible even on coarse-grained filesystems.
    pub fn write(&self, name: &str, contents: &str) -> GeofenceResult<()> {
        write_region_file(&self.file(name), contents)
    }
}

pub fn write_region_file(path: &Path, contents: &str) -> GeofenceResult<()> {
    fs::write(path, contents)?;
    let file = File::options().write(true).open(path)?;
    file.set_modified(SystemTime::now() + Duration::from_secs(1))?;
    Ok(())
}

/// Creates a temp directory holding `files` and opens a geofence on it.
///
/// `configure` adjusts the builder; file watching stays on unless it turns it
/// off.
pub fn create_test_context<F>(files: &[(&str, &str)], configure: F) -> GeofenceResult<TestContext>
where
    F: Fn(GeofenceBuilder) -> GeofenceBuilder,
{
    let dir = tempfile::tempdir()?;
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents)?;
    }

    let builder = configure(Geofence::builder(dir.path()));
    let geofence = builder.open()?;

    Ok(TestContext {
        dir: Arc::new(dir),
        geofence,
    })
}

/// Opens a geofence that only reloads on injected signals and debounces for
/// `debounce_ms`.
pub fn create_manual_context(files: &[(&str, &str)], debounce_ms: u64) -> GeofenceResult<TestContext> {
    create_test_context(files, |builder| {
        builder
            .watch(false)
            .debounce(Duration::from_millis(debounce_ms))
    })
}

pub fn cleanup(ctx: TestContext) -> GeofenceResult<()> {
    log::debug!("Closing test geofence in {}", ctx.path().display());
    ctx.geofence().close()?;
    assert!(ctx.geofence().is_closed());
    Ok(())
}
