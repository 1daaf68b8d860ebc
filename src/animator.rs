// Animation driver.
//
// Runs an iterative layout on a dedicated background thread. Each tick takes
// the strategy lock, checks convergence, runs exactly one step, and captures
// a snapshot before releasing the lock; listeners therefore only ever see
// completed passes. Between ticks the thread sleeps for the configured
// interval.
//
// Stopping is cooperative: `stop` sets a flag that the loop observes at the
// next iteration boundary, so cessation is bounded by one step plus one
// sleep interval. A strategy that converged (or was stopped) is not resumed;
// re-initialize it and start a new driver to animate again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use crate::layout::{IterativeLayout, PositionSnapshot};

/// Callback invoked once per completed step.
pub type StepListener = Box<dyn Fn(&PositionSnapshot) + Send>;

/// Default tick interval between steps.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30);

/// Background driver for one iterative layout.
pub struct Animator {
    stop: Arc<AtomicBool>,
    latest: Arc<Mutex<PositionSnapshot>>,
    handle: Option<JoinHandle<()>>,
}

impl Animator {
    /// Start driving `layout` at the default interval.
    pub fn start(
        layout: Arc<Mutex<dyn IterativeLayout + Send>>,
        listeners: Vec<StepListener>,
    ) -> Self {
        Self::with_interval(layout, listeners, DEFAULT_INTERVAL)
    }

    /// Start driving `layout`, sleeping `interval` between steps.
    pub fn with_interval(
        layout: Arc<Mutex<dyn IterativeLayout + Send>>,
        listeners: Vec<StepListener>,
        interval: Duration,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let latest: Arc<Mutex<PositionSnapshot>> =
            Arc::new(Mutex::new(Arc::new(Default::default())));

        let thread_stop = Arc::clone(&stop);
        let thread_latest = Arc::clone(&latest);
        let handle = thread::spawn(move || {
            debug!("animator started");
            loop {
                if thread_stop.load(Ordering::Relaxed) {
                    debug!("animator stopped");
                    break;
                }

                // One full step under the strategy lock; the snapshot is
                // taken before release so no torn pass is ever published.
                let snapshot = {
                    let mut layout = lock_or_recover(&layout);
                    if layout.is_converged() {
                        debug!("animator converged");
                        break;
                    }
                    layout.step();
                    layout.snapshot()
                };

                *lock_or_recover(&thread_latest) = Arc::clone(&snapshot);
                for listener in &listeners {
                    listener(&snapshot);
                }

                thread::sleep(interval);
            }
        });

        Self {
            stop,
            latest,
            handle: Some(handle),
        }
    }

    /// Latest published snapshot; cheap to clone and safe from any thread.
    pub fn latest(&self) -> PositionSnapshot {
        Arc::clone(&lock_or_recover(&self.latest))
    }

    /// Request a cooperative stop. Idempotent; callable from any thread.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// True while the driver thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop and wait for the driver thread to exit.
    pub fn join(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A poisoned lock still holds usable positions; recover the guard rather
/// than propagating the panic into the driver or the UI thread.
fn lock_or_recover<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CorrelationGraph, Molecule};
    use crate::layout::{ClusteredLayout, SharedViewport, SpringLayout, VertexLayout, Viewport};
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    fn make_pair_graph() -> Arc<CorrelationGraph<Molecule>> {
        let mut graph = CorrelationGraph::new();
        let a = graph.add_vertex(Molecule::new("a"));
        let b = graph.add_vertex(Molecule::new("b"));
        graph.add_edge(a, b, 0.8).unwrap();
        Arc::new(graph)
    }

    fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn test_driver_runs_until_convergence() {
        // Tiny viewport keeps the clustered iteration budget small.
        let viewport = SharedViewport::new(Viewport::new(40.0, 40.0));
        let mut layout = ClusteredLayout::with_seed(make_pair_graph(), viewport, 1);
        layout.initialize();

        let layout: Arc<Mutex<dyn IterativeLayout + Send>> = Arc::new(Mutex::new(layout));
        let animator =
            Animator::with_interval(Arc::clone(&layout), Vec::new(), Duration::from_millis(1));

        assert!(wait_until(Duration::from_secs(5), || !animator.is_running()));
        assert_eq!(animator.latest().len(), 2);
        assert!(lock_or_recover(&layout).is_converged());
    }

    #[test]
    fn test_stop_terminates_a_non_converging_layout() {
        let viewport = SharedViewport::new(Viewport::new(200.0, 200.0));
        let mut layout = SpringLayout::with_seed(make_pair_graph(), viewport, 1);
        layout.initialize();

        let layout: Arc<Mutex<dyn IterativeLayout + Send>> = Arc::new(Mutex::new(layout));
        let animator = Animator::with_interval(layout, Vec::new(), Duration::from_millis(1));

        assert!(animator.is_running());
        animator.stop();
        animator.stop(); // idempotent
        assert!(wait_until(Duration::from_secs(5), || !animator.is_running()));
    }

    #[test]
    fn test_listeners_see_completed_steps() {
        let viewport = SharedViewport::new(Viewport::new(200.0, 200.0));
        let mut layout = SpringLayout::with_seed(make_pair_graph(), viewport, 1);
        layout.initialize();

        let steps = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&steps);
        let listener: StepListener = Box::new(move |snapshot| {
            assert_eq!(snapshot.len(), 2);
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let layout: Arc<Mutex<dyn IterativeLayout + Send>> = Arc::new(Mutex::new(layout));
        let animator =
            Animator::with_interval(layout, vec![listener], Duration::from_millis(1));

        assert!(wait_until(Duration::from_secs(5), || {
            steps.load(Ordering::Relaxed) >= 3
        }));
        animator.join();
    }
}
