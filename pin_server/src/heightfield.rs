//! Depth buffers and the grid height-field mapping.
//!
use anyhow::{ensure, Result};

use crate::sampler;

/// Dense per-frame depth map, row-major.
///
/// Produced once per completed inference pass and replaced wholesale by the
/// next one; readers never mutate it.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl DepthBuffer {
    /// Minimum width/height so a full 3x3 sampling neighborhood exists.
    pub const MIN_DIM: usize = 3;

    pub fn new(data: Vec<f32>, width: usize, height: usize) -> Result<Self> {
        ensure!(
            width >= Self::MIN_DIM && height >= Self::MIN_DIM,
            "depth buffer {}x{} is below the minimum of {}x{}",
            width,
            height,
            Self::MIN_DIM,
            Self::MIN_DIM
        );
        ensure!(
            data.len() == width * height,
            "depth buffer length {} does not match {}x{}",
            data.len(),
            width,
            height
        );

        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Global extrema over the full buffer.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min_val = f32::INFINITY;
        let mut max_val = f32::NEG_INFINITY;
        for &value in &self.data {
            if value < min_val {
                min_val = value;
            }
            if value > max_val {
                max_val = value;
            }
        }

        (min_val, max_val)
    }

    /// Quadratic sample at the fractional coordinate `(u, v)`.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        sampler::sample(&self.data, self.width, self.height, u, v)
    }
}

/// Maps depth buffers onto a fixed-resolution grid of normalized heights.
///
/// The grid resolution is set once at startup; the grid-to-buffer mapping is
/// recomputed per pass from the current buffer dimensions, so the depth
/// resolution may change between frames without restarting the grid.
#[derive(Debug, Clone, Copy)]
pub struct HeightFieldMapper {
    grid_size: usize,
}

impl HeightFieldMapper {
    pub fn new(grid_size: usize) -> Result<Self> {
        ensure!(
            grid_size >= 2,
            "grid size {} is below the minimum of 2",
            grid_size
        );

        Ok(Self { grid_size })
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Fractional source coordinate of grid cell `(gx, gy)` in depth-pixel
    /// space.
    ///
    /// The grid spans the buffer edge to edge: adjacent cells are
    /// `dim / (grid_size - 1)` source pixels apart. The sampler clamps the
    /// outermost cells into the valid interior.
    pub fn sample_coordinate(&self, buffer: &DepthBuffer, gx: usize, gy: usize) -> (f32, f32) {
        let skip_x = buffer.width() as f32 / (self.grid_size - 1) as f32;
        let skip_y = buffer.height() as f32 / (self.grid_size - 1) as f32;

        ((gx as f32 + 0.5) * skip_x, (gy as f32 + 0.5) * skip_y)
    }

    /// Recompute the full grid of normalized heights for one frame.
    ///
    /// One linear scan for the global extrema, then one quadratic sample per
    /// cell. Normalization uses the whole frame's depth distribution, so the
    /// relative ordering across the frame is preserved in the heights. A
    /// uniform frame has no ordering to encode and maps every cell to 0.
    pub fn compute_heights(&self, buffer: &DepthBuffer) -> Vec<f32> {
        let (min_val, max_val) = buffer.min_max();
        let range = max_val - min_val;

        let mut heights = Vec::with_capacity(self.grid_size * self.grid_size);
        for gy in 0..self.grid_size {
            for gx in 0..self.grid_size {
                let (u, v) = self.sample_coordinate(buffer, gx, gy);
                let raw = buffer.sample(u, v);
                let norm = match range > 0.0 {
                    // The quadratic sampler may overshoot the extrema a
                    // little; heights are promised to stay in [0, 1].
                    true => ((raw - min_val) / range).clamp(0.0, 1.0),
                    false => 0.0,
                };
                heights.push(norm);
            }
        }

        heights
    }
}
