//! Background delivery of device-attitude samples.
//!
//! A worker thread polls a [`MotionSource`] at a fixed interval and writes
//! each sample into a single latest-value slot, replacing whatever the
//! consumer has not taken yet. The engine-owning thread only ever takes
//! from the slot, so nothing on the render thread blocks and a consumer
//! that stops draining (paused, minimised window) holds one sample at most.

use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glam::DQuat;

use crate::error::{PanoramaError, Result};
use crate::events::AttitudeSample;
use crate::orientation::ScreenOrientation;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(15);

/// Something that produces attitude samples.
///
/// `Ok(None)` ends the stream; an error is reported and also ends it.
pub trait MotionSource: Send + 'static {
    fn read(&mut self) -> Result<Option<AttitudeSample>>;
}

#[derive(Default)]
struct Slot {
    sample: Option<AttitudeSample>,
    failure: Option<PanoramaError>,
    finished: bool,
    overwritten: u64,
}

pub struct MotionFeed {
    slot: Arc<Mutex<Slot>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    running: bool,
    failure: Option<PanoramaError>,
}

impl MotionFeed {
    pub fn start<S: MotionSource>(source: S, interval: Duration) -> Result<Self> {
        let slot = Arc::new(Mutex::new(Slot::default()));
        let stop = Arc::new(AtomicBool::new(false));
        let worker_slot = Arc::clone(&slot);
        let worker_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("motion-feed".into())
            .spawn(move || run_feed(source, interval, worker_slot, worker_stop))
            .map_err(PanoramaError::ThreadSpawn)?;

        log::debug!("motion feed started ({interval:?})");
        Ok(Self {
            slot,
            stop,
            handle: Some(handle),
            running: true,
            failure: None,
        })
    }

    /// Take the newest sample, if one arrived since the last call.
    pub fn take_latest(&mut self) -> Option<AttitudeSample> {
        let Ok(mut slot) = self.slot.lock() else {
            self.running = false;
            return None;
        };
        if let Some(e) = slot.failure.take() {
            log::warn!("motion updates stopped: {e}");
            self.failure = Some(e);
            self.running = false;
        }
        if slot.finished {
            self.running = false;
        }
        if slot.overwritten > 0 {
            log::trace!("{} stale motion samples replaced", slot.overwritten);
            slot.overwritten = 0;
        }
        slot.sample.take()
    }

    /// True if a sample is waiting in the slot.
    pub fn has_pending(&self) -> bool {
        self.slot.lock().map(|slot| slot.sample.is_some()).unwrap_or(false)
    }

    /// False once the source ended or failed; a last sample may remain.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn failure(&self) -> Option<&PanoramaError> {
        self.failure.as_ref()
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("motion feed thread panicked");
            }
        }
        self.running = false;
    }
}

impl Drop for MotionFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_feed<S: MotionSource>(mut source: S, interval: Duration, slot: Arc<Mutex<Slot>>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Acquire) {
        let read = source.read();
        let Ok(mut guard) = slot.lock() else {
            return;
        };
        match read {
            Ok(Some(sample)) => {
                if guard.sample.replace(sample).is_some() {
                    guard.overwritten += 1;
                }
            }
            Ok(None) => break,
            Err(e) => {
                guard.failure = Some(e);
                break;
            }
        }
        drop(guard);
        thread::sleep(interval);
    }
    if let Ok(mut guard) = slot.lock() {
        guard.finished = true;
    }
}

/// Replays a fixed list of samples, then ends.
pub struct ScriptedSource {
    samples: VecDeque<Result<AttitudeSample>>,
}

impl ScriptedSource {
    pub fn new(samples: impl IntoIterator<Item = AttitudeSample>) -> Self {
        Self {
            samples: samples.into_iter().map(Ok).collect(),
        }
    }

    /// Appends a sensor failure after the scripted samples.
    pub fn then_fail(mut self, msg: impl Into<String>) -> Self {
        self.samples.push_back(Err(PanoramaError::Sensor(msg.into())));
        self
    }
}

impl MotionSource for ScriptedSource {
    fn read(&mut self) -> Result<Option<AttitudeSample>> {
        self.samples.pop_front().transpose()
    }
}

/// Simulated handheld device, upright, slowly panning left and right
/// with a little tilt.
pub struct SwayingSource {
    started: Instant,
    screen: ScreenOrientation,
    heading_amplitude: f64,
    tilt_amplitude: f64,
    period: Duration,
}

impl SwayingSource {
    pub fn new(screen: ScreenOrientation) -> Self {
        Self {
            started: Instant::now(),
            screen,
            heading_amplitude: 60f64.to_radians(),
            tilt_amplitude: 10f64.to_radians(),
            period: Duration::from_secs(12),
        }
    }

    /// Attitude of an upright device at `heading` (about vertical) and `tilt`.
    pub fn attitude_at(heading: f64, tilt: f64) -> DQuat {
        DQuat::from_rotation_z(heading) * DQuat::from_rotation_x(FRAC_PI_2 + tilt)
    }
}

impl MotionSource for SwayingSource {
    fn read(&mut self) -> Result<Option<AttitudeSample>> {
        let phase = self.started.elapsed().as_secs_f64() / self.period.as_secs_f64() * TAU;
        let heading = self.heading_amplitude * phase.sin();
        let tilt = self.tilt_amplitude * (2.0 * phase).sin();
        Ok(Some(AttitudeSample::new(Self::attitude_at(heading, tilt), self.screen)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_until_finished(feed: &mut MotionFeed) -> Vec<AttitudeSample> {
        let mut seen = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while feed.is_running() && Instant::now() < deadline {
            if let Some(s) = feed.take_latest() {
                seen.push(s);
            }
            thread::sleep(Duration::from_millis(1));
        }
        if let Some(s) = feed.take_latest() {
            seen.push(s);
        }
        seen
    }

    fn sample(heading: f64) -> AttitudeSample {
        AttitudeSample::new(SwayingSource::attitude_at(heading, 0.0), ScreenOrientation::Portrait)
    }

    #[test]
    fn scripted_feed_ends_with_last_sample() {
        let source = ScriptedSource::new([sample(0.1), sample(0.2), sample(0.3)]);
        let mut feed = MotionFeed::start(source, Duration::from_millis(1)).unwrap();
        let seen = wait_until_finished(&mut feed);
        assert!(!feed.is_running());
        assert!(feed.failure().is_none());
        assert_eq!(seen.last(), Some(&sample(0.3)));
    }

    #[test]
    fn take_latest_skips_to_newest() {
        let source = ScriptedSource::new([sample(0.1), sample(0.2), sample(0.3)]);
        let mut feed = MotionFeed::start(source, Duration::ZERO).unwrap();
        // Let the worker run dry before draining once.
        if let Some(handle) = feed.handle.take() {
            handle.join().unwrap();
        }
        assert_eq!(feed.take_latest(), Some(sample(0.3)));
        assert_eq!(feed.take_latest(), None);
        assert!(!feed.is_running());
    }

    #[test]
    fn undrained_feed_keeps_only_the_newest_sample() {
        let heading = |i: u32| f64::from(i) * 0.001;
        let samples: Vec<_> = (0..500).map(|i| sample(heading(i))).collect();
        let mut feed = MotionFeed::start(ScriptedSource::new(samples), Duration::ZERO).unwrap();
        if let Some(handle) = feed.handle.take() {
            handle.join().unwrap();
        }
        assert!(feed.has_pending());
        assert_eq!(feed.slot.lock().unwrap().overwritten, 499);
        assert_eq!(feed.take_latest(), Some(sample(heading(499))));
        assert!(!feed.has_pending());
        assert_eq!(feed.take_latest(), None);
    }

    #[test]
    fn sensor_failure_stops_the_feed() {
        let source = ScriptedSource::new([sample(0.5)]).then_fail("device motion unavailable");
        let mut feed = MotionFeed::start(source, Duration::from_millis(1)).unwrap();
        wait_until_finished(&mut feed);
        assert!(!feed.is_running());
        assert!(matches!(feed.failure(), Some(PanoramaError::Sensor(_))));
    }

    #[test]
    fn stop_joins_an_endless_source() {
        let mut feed = MotionFeed::start(SwayingSource::new(ScreenOrientation::Portrait), Duration::from_millis(1)).unwrap();
        thread::sleep(Duration::from_millis(10));
        feed.stop();
        assert!(!feed.is_running());
        assert!(feed.handle.is_none());
    }

    #[test]
    fn swaying_source_stays_upright_at_rest() {
        let q = SwayingSource::attitude_at(0.0, 0.0);
        assert!(ScreenOrientation::Portrait.remap(q).abs_diff_eq(DQuat::IDENTITY, 1e-9));
    }
}
