//! Display-cadence actuation loop.
//!
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use tokio::{task::JoinHandle, time::interval};

use crate::{
    heightfield::HeightFieldMapper,
    latest::DepthProvider,
    meter::METER,
    pins::{self, ActuatorSink},
};

/// One mapping pass: pull the latest depth, recompute the grid, push it out.
///
/// Returns `false` when no depth buffer has been published yet, leaving the
/// sink untouched. A grid/sink length mismatch is a configuration bug and
/// propagates as an error.
pub fn actuation_pass<P, S>(provider: &P, mapper: &HeightFieldMapper, sink: &mut S) -> Result<bool>
where
    P: DepthProvider,
    S: ActuatorSink,
{
    let buffer = match provider.latest_depth() {
        Some(buffer) => buffer,
        None => return Ok(false),
    };

    let heights = mapper.compute_heights(&buffer);
    pins::apply(&heights, sink)?;

    Ok(true)
}

/// Run actuation passes at a fixed tick rate, independent of how fast depth
/// passes complete. A tick may re-apply a buffer it has already seen.
pub fn spawn_actuation_loop<P, S>(
    provider: P,
    mapper: HeightFieldMapper,
    pins: Arc<Mutex<S>>,
    tick: Duration,
) -> JoinHandle<Result<()>>
where
    P: DepthProvider + Send + 'static,
    S: ActuatorSink + Send + 'static,
{
    tokio::spawn(async move {
        let mut tick_interval = interval(tick);

        loop {
            tick_interval.tick().await;

            let mut sink = pins.lock().unwrap();
            if actuation_pass(&provider, &mapper, &mut *sink)? {
                METER.tick_actuation();
            }
        }
    })
}
