//! Throughput counters for the camera, inference and actuation loops.
//!
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use tokio::{task::JoinHandle, time::interval};

pub static METER: Meter = Meter::new();

#[derive(Default)]
pub struct Meter {
    camera_frames: AtomicU64,
    depth_passes: AtomicU64,
    actuation_passes: AtomicU64,
}

impl Meter {
    pub const fn new() -> Meter {
        Meter {
            camera_frames: AtomicU64::new(0),
            depth_passes: AtomicU64::new(0),
            actuation_passes: AtomicU64::new(0),
        }
    }

    pub fn tick_camera(&self) {
        self.camera_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tick_depth(&self) {
        self.depth_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tick_actuation(&self) {
        self.actuation_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_reset_camera(&self) -> u64 {
        self.camera_frames.swap(0, Ordering::Relaxed)
    }

    pub fn get_reset_depth(&self) -> u64 {
        self.depth_passes.swap(0, Ordering::Relaxed)
    }

    pub fn get_reset_actuation(&self) -> u64 {
        self.actuation_passes.swap(0, Ordering::Relaxed)
    }
}

pub fn spawn_meter_logger() -> JoinHandle<()> {
    tokio::spawn(async {
        let mut log_interval = interval(Duration::from_secs(2));
        log_interval.tick().await;

        loop {
            let start = Instant::now();
            log_interval.tick().await;

            let camera_frames = METER.get_reset_camera();
            let depth_passes = METER.get_reset_depth();
            let actuation_passes = METER.get_reset_actuation();
            let elapsed = start.elapsed().as_secs_f32();

            if camera_frames > 0 {
                log::info!(
                    "Camera frames per second: {:.2}",
                    camera_frames as f32 / elapsed
                );
            }
            if depth_passes > 0 {
                log::info!(
                    "Depth passes per second: {:.2}",
                    depth_passes as f32 / elapsed
                );
            }
            if actuation_passes > 0 {
                log::info!(
                    "Actuation passes per second: {:.2}",
                    actuation_passes as f32 / elapsed
                );
            }
        }
    })
}
