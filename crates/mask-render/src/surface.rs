//! CPU pixel surface the strokes are rasterized onto.

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use mask_core::{Color, Size};

/// An RGBA8 surface, non-premultiplied, starting fully transparent.
#[derive(Debug, Clone)]
pub struct MaskSurface {
    pixels: RgbaImage,
}

impl MaskSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// A transparent surface with the dimensions of `image`.
    pub fn for_image(image: &DynamicImage) -> Self {
        Self::new(image.width(), image.height())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }

    /// Reallocate to `width` × `height` if the dimensions differ.
    /// Resizing always leaves the surface cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width() != width || self.height() != height {
            self.pixels = RgbaImage::new(width, height);
        }
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    /// Replace the surface contents with `image`, stretched to the surface size.
    pub fn draw_image(&mut self, image: &DynamicImage) {
        let rgba = image.to_rgba8();
        self.pixels = if rgba.dimensions() == self.pixels.dimensions() {
            rgba
        } else {
            imageops::resize(
                &rgba,
                self.width(),
                self.height(),
                imageops::FilterType::Nearest,
            )
        };
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    /// Source-over composite `color` onto the pixel at (`x`, `y`).
    pub fn blend(&mut self, x: u32, y: u32, color: Color) {
        let sa = color.a.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x, y);
        if sa >= 1.0 {
            *dst = Rgba(color.to_rgba8());
            return;
        }

        let [dr, dg, db, da] = dst.0.map(|c| f32::from(c) / 255.0);
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: f32, d: f32| (s * sa + d * da * (1.0 - sa)) / out_a;
        *dst = Rgba(
            Color::rgba(mix(color.r, dr), mix(color.g, dg), mix(color.b, db), out_a).to_rgba8(),
        );
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }
}
