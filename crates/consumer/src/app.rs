use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use handlink::{FrameUpdate, GestureEdge, ReceiverHandle, TransformSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    /// Every frame above threshold.
    Level,
    /// Once per threshold crossing.
    Edge,
}

/// Application/render side: once per frame, apply the newest transform.
pub struct App<S: TransformSink> {
    sink: S,
    frame_duration: Duration,
    gesture_mode: GestureMode,
    gesture_edge: GestureEdge,
    frames_applied: u64,
    gestures_reported: u64,
}

impl<S: TransformSink> App<S> {
    pub fn new(sink: S, frame_rate: u32, gesture_mode: GestureMode) -> Self {
        Self {
            sink,
            frame_duration: Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64),
            gesture_mode,
            gesture_edge: GestureEdge::new(),
            frames_applied: 0,
            gestures_reported: 0,
        }
    }

    pub fn frames_applied(&self) -> u64 {
        self.frames_applied
    }

    pub fn gestures_reported(&self) -> u64 {
        self.gestures_reported
    }

    pub fn apply(&mut self, update: &FrameUpdate) {
        self.sink.apply(&update.transform);
        self.frames_applied += 1;

        let report = match self.gesture_mode {
            GestureMode::Level => update.gesture,
            GestureMode::Edge => self.gesture_edge.update(update.gesture),
        };
        if report {
            self.gestures_reported += 1;
            log::info!("Back-and-forth motion detected!");
        }
    }

    pub fn run(&mut self, receiver: &ReceiverHandle, running: &AtomicBool) {
        let mut next_frame = Instant::now();

        while running.load(Ordering::SeqCst) {
            if receiver.is_finished() {
                log::warn!("Receive loop exited, stopping");
                break;
            }

            if let Some(update) = receiver.take_latest() {
                self.apply(&update);
            }

            next_frame += self.frame_duration;
            let now = Instant::now();
            if next_frame > now {
                std::thread::sleep(next_frame - now);
            } else {
                next_frame = now;
            }
        }
    }
}
