//! Submission payload: re-encoded image plus rendered mask.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, ImageResult, RgbImage, RgbaImage};
use mask_core::Stroke;
use mask_core::color::MASK_PAINT;

use crate::raster::rasterize;
use crate::surface::MaskSurface;

pub const JPEG_QUALITY: u8 = 100;

/// Encoded image and mask, both at the original image dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionImages {
    pub image_jpeg: Vec<u8>,
    pub mask_png: Vec<u8>,
}

impl SubmissionImages {
    pub fn image_base64(&self) -> String {
        to_base64(&self.image_jpeg)
    }

    pub fn mask_base64(&self) -> String {
        to_base64(&self.mask_png)
    }
}

/// Encode `image` from a surface of its size, then clear the surface and
/// render the mask for `strokes` on it at full opacity.
pub fn compile_submission(image: &DynamicImage, strokes: &[Stroke]) -> ImageResult<SubmissionImages> {
    let mut surface = MaskSurface::for_image(image);
    surface.draw_image(image);
    let rgb: RgbImage = surface.as_image().convert();
    let image_jpeg = encode_jpeg(&rgb)?;

    surface.clear();
    rasterize(strokes, MASK_PAINT, &mut surface);

    log::debug!(
        "compiled submission {}x{} with {} strokes",
        image.width(),
        image.height(),
        strokes.len()
    );

    Ok(SubmissionImages {
        image_jpeg,
        mask_png: encode_png(surface.as_image())?,
    })
}

pub fn encode_jpeg(image: &RgbImage) -> ImageResult<Vec<u8>> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(image)?;
    Ok(out)
}

pub fn encode_png(image: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(out.into_inner())
}

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
