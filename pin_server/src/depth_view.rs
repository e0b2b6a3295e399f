//! Grayscale rendering of depth buffers for the HTTP stream.
//!
use anyhow::Result;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_circle_mut;

use crate::heightfield::{DepthBuffer, HeightFieldMapper};
use crate::sampler::clamp_to_interior;

/// Render a depth buffer as an 8-bit grayscale image, near = bright.
pub fn render(buffer: &DepthBuffer) -> RgbImage {
    let (min_val, max_val) = buffer.min_max();
    let range = max_val - min_val;

    RgbImage::from_fn(buffer.width() as u32, buffer.height() as u32, |x, y| {
        let value = buffer.data()[y as usize * buffer.width() + x as usize];
        let norm = match range > 0.0 {
            true => (value - min_val) / range,
            false => 0.0,
        };
        let gray = (norm * 255.0).round() as u8;

        Rgb([gray, gray, gray])
    })
}

/// Mark the grid sampling locations on a rendered view.
pub fn draw_sample_points(image: &mut RgbImage, buffer: &DepthBuffer, mapper: &HeightFieldMapper) {
    let color = Rgb([255, 0, 0]);

    for gy in 0..mapper.grid_size() {
        for gx in 0..mapper.grid_size() {
            let (u, v) = mapper.sample_coordinate(buffer, gx, gy);
            // Same interior clamp the sampler applies.
            let x = clamp_to_interior(u, buffer.width()).round() as i32;
            let y = clamp_to_interior(v, buffer.height()).round() as i32;
            draw_hollow_circle_mut(image, (x, y), 1, color);
        }
    }
}

/// JPEG-compress a view, optionally with the sampling overlay for a grid of
/// `overlay_grid` cells per side.
pub fn to_jpeg(buffer: &DepthBuffer, overlay_grid: Option<usize>) -> Result<Vec<u8>> {
    let mut image = render(buffer);
    if let Some(grid_size) = overlay_grid {
        let mapper = HeightFieldMapper::new(grid_size)?;
        draw_sample_points(&mut image, buffer, &mapper);
    }

    let jpeg = turbojpeg::compress_image(&image, 90, turbojpeg::Subsamp::Sub2x2)?;
    Ok(jpeg.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_map_to_black_and_white() {
        let mut data = vec![2.0; 16];
        data[0] = 1.0;
        data[15] = 3.0;
        let buffer = DepthBuffer::new(data, 4, 4).unwrap();

        let image = render(&buffer);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(image.get_pixel(3, 3).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(1, 2).0, [128, 128, 128]);
    }

    #[test]
    fn uniform_buffer_renders_black() {
        let buffer = DepthBuffer::new(vec![4.2; 9], 3, 3).unwrap();

        let image = render(&buffer);
        assert!(image.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn overlay_marks_stay_inside_the_image() {
        let data: Vec<f32> = (0..64).map(|i| i as f32).collect();
        let buffer = DepthBuffer::new(data, 8, 8).unwrap();
        let mapper = HeightFieldMapper::new(5).unwrap();

        let mut image = render(&buffer);
        draw_sample_points(&mut image, &buffer, &mapper);
        // Drawing must not have panicked and the image keeps its size.
        assert_eq!(image.dimensions(), (8, 8));
    }
}
