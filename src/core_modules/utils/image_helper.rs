// Rasterises a `FrameReport` into an RGBA8 buffer and writes PNGs, for visual
// checks of the partition outside a browser.

use crate::core_modules::geometry::{Coordinate, Point};
use crate::core_modules::palette::Color;
use crate::scene::FrameReport;
use image::ImageEncoder;
use std::path::Path;

const CHANNELS: usize = 4;
const DIVIDER_WIDTH: u32 = 2;
const HIGHLIGHT_WIDTH: u32 = 2;
const MARKER_RADIUS: u32 = 3;

/// An RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub buffer: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let mut buffer = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for _ in 0..(width as usize * height as usize) {
            buffer.extend_from_slice(&[background.red, background.green, background.blue, background.alpha]);
        }
        Self { width, height, buffer }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some(Color::new(self.buffer[i], self.buffer[i + 1], self.buffer[i + 2], self.buffer[i + 3]))
    }

    /// Blends `color` over every pixel of the rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Color) {
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = (x + width as i64).clamp(0, self.width as i64) as u32;
        let y1 = (y + height as i64).clamp(0, self.height as i64) as u32;

        for py in y0..y1 {
            for px in x0..x1 {
                let i = (py as usize * self.width as usize + px as usize) * CHANNELS;
                let base = Color::new(self.buffer[i], self.buffer[i + 1], self.buffer[i + 2], 255);
                let out = color.over(base);
                self.buffer[i..i + CHANNELS].copy_from_slice(&[out.red, out.green, out.blue, out.alpha]);
            }
        }
    }
}

fn to_pixel(value: Coordinate) -> i64 {
    value.round() as i64
}

/// Paints one frame: region fills, dividers, the hovered outline and label anchors.
pub fn rasterize(report: &FrameReport<'_>) -> Canvas {
    let width = report.viewport.width.max(0.0).ceil() as u32;
    let height = report.viewport.height.max(0.0).ceil() as u32;
    let cell = report.resolution.ceil().max(1.0) as u32;
    let mut canvas = Canvas::new(width, height, Color::BACKGROUND);

    for (region, samples) in report.buckets.iter() {
        let color = report.colors.get(region).copied().unwrap_or(Color::BACKGROUND);
        for sample in samples {
            canvas.fill_rect(to_pixel(sample.x), to_pixel(sample.y), cell, cell, color);
        }
    }

    for segment in &report.boundaries {
        let (x, y) = (to_pixel(segment.sample.x), to_pixel(segment.sample.y));
        if segment.right {
            canvas.fill_rect(x + cell as i64 - 1, y, DIVIDER_WIDTH, cell, Color::BLACK);
        }
        if segment.bottom {
            canvas.fill_rect(x, y + cell as i64 - 1, cell, DIVIDER_WIDTH, Color::BLACK);
        }
    }

    for sample in &report.hovered_edges {
        outline_cell(&mut canvas, to_pixel(sample.x), to_pixel(sample.y), cell, Color::HIGHLIGHT);
    }

    for anchor in report.centroids {
        mark(&mut canvas, *anchor, Color::BLACK);
    }

    canvas
}

fn outline_cell(canvas: &mut Canvas, x: i64, y: i64, cell: u32, color: Color) {
    let w = HIGHLIGHT_WIDTH.min(cell);
    canvas.fill_rect(x, y, cell, w, color);
    canvas.fill_rect(x, y + (cell - w) as i64, cell, w, color);
    canvas.fill_rect(x, y, w, cell, color);
    canvas.fill_rect(x + (cell - w) as i64, y, w, cell, color);
}

fn mark(canvas: &mut Canvas, at: Point, color: Color) {
    let side = MARKER_RADIUS * 2 + 1;
    canvas.fill_rect(
        to_pixel(at.x) - MARKER_RADIUS as i64,
        to_pixel(at.y) - MARKER_RADIUS as i64,
        side,
        side,
        color,
    );
}

/// Writes an RGBA8 buffer as a PNG file.
pub fn save(path: impl AsRef<Path>, width: u32, height: u32, buffer: &[u8]) -> Result<(), image::ImageError> {
    let output = std::fs::File::create(path)?;
    let encoder = image::codecs::png::PngEncoder::new(output);

    encoder.write_image(buffer, width, height, image::ExtendedColorType::Rgba8)?;

    Ok(())
}

pub fn save_canvas(path: impl AsRef<Path>, canvas: &Canvas) -> Result<(), image::ImageError> {
    save(path, canvas.width, canvas.height, &canvas.buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::core_modules::geometry::Viewport;
    use crate::core_modules::navigation::{LabelPlacement, TracingNavigator};
    use crate::scene::Scene;

    fn two_region_scene() -> Scene {
        let config = SceneConfig {
            sites: Some(vec![Point::new(25.0, 50.0), Point::new(75.0, 50.0)]),
            seed: Some(4),
            ..SceneConfig::default()
        };
        Scene::new(
            config,
            Viewport::new(100.0, 100.0),
            Box::new(TracingNavigator),
            Box::new(Vec::<LabelPlacement>::new()),
        )
        .expect("valid scene")
    }

    #[test]
    fn canvas_starts_with_the_background() {
        let canvas = Canvas::new(3, 2, Color::BACKGROUND);
        assert_eq!(canvas.buffer.len(), 3 * 2 * 4);
        assert_eq!(canvas.pixel(2, 1), Some(Color::BACKGROUND));
        assert_eq!(canvas.pixel(3, 0), None);
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut canvas = Canvas::new(4, 4, Color::BACKGROUND);
        canvas.fill_rect(-2, -2, 3, 3, Color::BLACK);
        assert_eq!(canvas.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(canvas.pixel(1, 0), Some(Color::BACKGROUND));
        canvas.fill_rect(3, 3, 10, 10, Color::BLACK);
        assert_eq!(canvas.pixel(3, 3), Some(Color::BLACK));
    }

    #[test]
    fn rasterized_regions_use_their_colors() {
        let mut scene = two_region_scene();
        let report = scene.frame();
        let canvas = rasterize(&report);
        assert_eq!((canvas.width, canvas.height), (100, 100));

        // Away from dividers and anchors, each half shows its own fill over the background.
        let left = report.colors[0].over(Color::BACKGROUND);
        let right = report.colors[1].over(Color::BACKGROUND);
        assert_eq!(canvas.pixel(5, 95), Some(left));
        assert_eq!(canvas.pixel(95, 95), Some(right));
        // Divider along the right side of column 5 (x = 59..61).
        assert_eq!(canvas.pixel(60, 95), Some(Color::BLACK));
    }

    #[test]
    fn hovered_region_is_outlined() {
        let mut scene = two_region_scene();
        scene.set_pointer(Some(Point::new(90.0, 90.0)));
        let report = scene.frame();
        let canvas = rasterize(&report);
        // Bottom-right cell of the viewport is an edge of the hovered region.
        assert_eq!(canvas.pixel(99, 99), Some(Color::HIGHLIGHT));
    }

    #[test]
    fn save_rendered_frame() {
        let mut scene = two_region_scene();
        let report = scene.frame();
        let canvas = rasterize(&report);
        let path = std::env::temp_dir().join("voronoi_nav_frame.png");

        save_canvas(&path, &canvas).expect("Error Saving File.");
        assert!(std::fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false));
        let _ = std::fs::remove_file(path);
    }
}
