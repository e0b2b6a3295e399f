//! Pin actuators and the grid-to-actuator bridge.
//!
use anyhow::{bail, Result};
use serde::Serialize;

/// Default vertical travel of a fully raised pin.
pub const DEFAULT_TRAVEL_SCALE: f32 = 5.0;

/// Anything that receives one normalized height per grid cell.
///
/// The server drives a virtual pin bed, but the bridge below is agnostic to
/// whether the sink renders, moves motors, or records for a test.
pub trait ActuatorSink {
    fn cell_count(&self) -> usize;

    /// Apply the normalized height in `[0, 1]` of one cell.
    fn set_cell_height(&mut self, index: usize, norm: f32);
}

/// Push a computed height grid into an actuator, one cell per actuator.
///
/// Pure mapping, order-independent and idempotent. A length mismatch is a
/// configuration bug in the caller and fails fast.
pub fn apply<S: ActuatorSink>(heights: &[f32], sink: &mut S) -> Result<()> {
    if heights.len() != sink.cell_count() {
        bail!(
            "height grid has {} cells but the actuator bed has {}",
            heights.len(),
            sink.cell_count()
        );
    }

    for (index, &norm) in heights.iter().enumerate() {
        sink.set_cell_height(index, norm);
    }

    Ok(())
}

/// Virtual pin bed: one vertical travel value per pin, row-major.
#[derive(Debug, Clone, Serialize)]
pub struct PinGrid {
    grid_size: usize,
    travel_scale: f32,
    travel: Vec<f32>,
}

impl PinGrid {
    pub fn new(grid_size: usize, travel_scale: f32) -> Self {
        Self {
            grid_size,
            travel_scale,
            travel: vec![0.0; grid_size * grid_size],
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Current vertical travel per pin.
    pub fn travel(&self) -> &[f32] {
        &self.travel
    }
}

impl ActuatorSink for PinGrid {
    fn cell_count(&self) -> usize {
        self.travel.len()
    }

    fn set_cell_height(&mut self, index: usize, norm: f32) {
        self.travel[index] = norm * self.travel_scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_become_scaled_travel() {
        let mut pins = PinGrid::new(2, DEFAULT_TRAVEL_SCALE);
        let heights = [0.0, 0.25, 0.5, 1.0];

        apply(&heights, &mut pins).unwrap();

        assert_eq!(pins.travel(), &[0.0, 1.25, 2.5, 5.0]);
    }

    #[test]
    fn reapplying_the_same_grid_is_idempotent() {
        let mut pins = PinGrid::new(3, 2.0);
        let heights: Vec<f32> = (0..9).map(|i| i as f32 / 8.0).collect();

        apply(&heights, &mut pins).unwrap();
        let first = pins.travel().to_vec();

        apply(&heights, &mut pins).unwrap();
        assert_eq!(pins.travel(), &first[..]);
    }

    #[test]
    fn length_mismatch_fails_fast() {
        let mut pins = PinGrid::new(4, DEFAULT_TRAVEL_SCALE);
        let heights = [0.5; 9];

        let err = apply(&heights, &mut pins).unwrap_err();
        assert!(err.to_string().contains("9 cells"));
        // The bed stays untouched.
        assert!(pins.travel().iter().all(|t| *t == 0.0));
    }
}
