use crate::core::clock::ManualClock;
use std::collections::BTreeMap;
use std::thread::sleep;
use std::time::{Duration, Instant};

pub const DEFAULT_TRACK_WIDTH: f64 = 400.0;

/// FrameHandle identifies one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn new(id: u64) -> FrameHandle {
        FrameHandle(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// AnimationDriver is the boundary to the presentation layer. It schedules frame callbacks and
/// reports the track geometry.
pub trait AnimationDriver {
    /// request_frame schedules one frame callback and returns its handle.
    fn request_frame(&mut self) -> FrameHandle;

    /// cancel_frame prevents a scheduled frame from firing. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// get_track_width returns the width used to project race progress onto the track.
    fn get_track_width(&self) -> f64;

    /// capture_positions returns the currently rendered position per horse id.
    fn capture_positions(&self) -> BTreeMap<u32, f64> {
        BTreeMap::new()
    }
}

/// FrameLoop is implemented by drivers that are pumped by a host loop.
pub trait FrameLoop: AnimationDriver {
    /// next_frame blocks until the pending frame is due and returns it, None if no frame is
    /// scheduled.
    fn next_frame(&mut self) -> Option<FrameHandle>;
}

/// FrameScheduler holds at most one pending frame, a new request replaces the previous one.
#[derive(Debug, Default)]
struct FrameScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl FrameScheduler {
    fn request(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle::new(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn take(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

/// RealtimeDriver fires frames at a fixed rate using the wall clock.
#[derive(Debug)]
pub struct RealtimeDriver {
    scheduler: FrameScheduler,
    frame_interval: Duration,
    last_frame: Instant,
    track_width: f64,
}

impl RealtimeDriver {
    pub fn new(frame_rate: f64, track_width: f64) -> RealtimeDriver {
        RealtimeDriver {
            scheduler: FrameScheduler::default(),
            frame_interval: Duration::from_secs_f64(1.0 / frame_rate),
            last_frame: Instant::now(),
            track_width,
        }
    }
}

impl AnimationDriver for RealtimeDriver {
    fn request_frame(&mut self) -> FrameHandle {
        self.scheduler.request()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.scheduler.cancel(handle)
    }

    fn get_track_width(&self) -> f64 {
        self.track_width
    }
}

impl FrameLoop for RealtimeDriver {
    fn next_frame(&mut self) -> Option<FrameHandle> {
        let handle = self.scheduler.take()?;

        // sleep until the frame is due
        let t_busy = self.last_frame.elapsed();
        if t_busy < self.frame_interval {
            sleep(self.frame_interval - t_busy);
        } else {
            log::debug!("Could not keep up with real-time!");
        }
        self.last_frame = Instant::now();

        Some(handle)
    }
}

/// SteppedDriver fires frames immediately and advances a manual clock by one frame interval per
/// frame, i.e. the race is simulated as fast as possible.
#[derive(Debug)]
pub struct SteppedDriver {
    scheduler: FrameScheduler,
    clock: ManualClock,
    frame_interval: f64,
    track_width: f64,
}

impl SteppedDriver {
    pub fn new(clock: ManualClock, frame_rate: f64, track_width: f64) -> SteppedDriver {
        SteppedDriver {
            scheduler: FrameScheduler::default(),
            clock,
            frame_interval: 1000.0 / frame_rate,
            track_width,
        }
    }
}

impl AnimationDriver for SteppedDriver {
    fn request_frame(&mut self) -> FrameHandle {
        self.scheduler.request()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.scheduler.cancel(handle)
    }

    fn get_track_width(&self) -> f64 {
        self.track_width
    }
}

impl FrameLoop for SteppedDriver {
    fn next_frame(&mut self) -> Option<FrameHandle> {
        let handle = self.scheduler.take()?;
        self.clock.advance(self.frame_interval);
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::Clock;
    use approx::assert_relative_eq;

    #[test]
    fn stepped_driver_fires_pending_frame_once() {
        let clock = ManualClock::new(0.0);
        let mut driver = SteppedDriver::new(clock.clone(), 50.0, 300.0);

        assert!(driver.next_frame().is_none());
        let handle = driver.request_frame();
        assert_eq!(driver.next_frame(), Some(handle));
        assert!(driver.next_frame().is_none());
        assert_relative_eq!(clock.now_ms(), 20.0);
        assert_eq!(driver.get_track_width(), 300.0);
    }

    #[test]
    fn cancelled_frame_does_not_fire() {
        let mut driver = SteppedDriver::new(ManualClock::new(0.0), 60.0, 400.0);
        let handle = driver.request_frame();
        driver.cancel_frame(handle);
        assert!(driver.next_frame().is_none());
    }

    #[test]
    fn cancelling_a_stale_handle_keeps_the_pending_frame() {
        let mut driver = SteppedDriver::new(ManualClock::new(0.0), 60.0, 400.0);
        let old = driver.request_frame();
        let new = driver.request_frame();
        assert_ne!(old, new);
        driver.cancel_frame(old);
        assert_eq!(driver.next_frame(), Some(new));
    }

    #[test]
    fn realtime_driver_paces_frames() {
        let mut driver = RealtimeDriver::new(100.0, DEFAULT_TRACK_WIDTH);
        let t_start = Instant::now();
        for _ in 0..3 {
            let handle = driver.request_frame();
            assert_eq!(driver.next_frame(), Some(handle));
        }
        // the first frame may fire right away, the following two wait ~10ms each
        assert!(t_start.elapsed() >= Duration::from_millis(18));
        assert!(driver.capture_positions().is_empty());
    }
}
