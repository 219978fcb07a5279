use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::{
        error::{PixbeatError, PixbeatResult, Stage},
        math::mul_div255_u16,
    },
    render::raster::flatten_premul_over_bg_to_opaque_rgba8,
};

/// A rendered frame as RGBA8 pixels.
///
/// Frames leave the renderer **premultiplied**; the flag makes that explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA8 at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Opaque straight-alpha copy composited over `bg`.
    pub fn to_opaque_rgba8(&self, bg: [u8; 3]) -> PixbeatResult<Vec<u8>> {
        let mut out = vec![0u8; self.data.len()];
        if self.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut out, &self.data, bg)?;
        } else {
            for (d, s) in out.chunks_exact_mut(4).zip(self.data.chunks_exact(4)) {
                let a = u16::from(s[3]);
                let inv = 255 - a;
                for c in 0..3 {
                    let v = mul_div255_u16(u16::from(s[c]), a)
                        + mul_div255_u16(u16::from(bg[c]), inv);
                    d[c] = v.min(255) as u8;
                }
                d[3] = 255;
            }
        }
        Ok(out)
    }

    /// Write the frame as an opaque PNG (flattened over black).
    pub fn write_png(&self, path: &Path) -> PixbeatResult<()> {
        let expected = (self.width as usize) * (self.height as usize) * 4;
        if self.data.len() != expected {
            return Err(PixbeatError::validation(format!(
                "frame buffer is {} bytes, expected {expected} for {}x{}",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        let rgba = self.to_opaque_rgba8([0, 0, 0])?;
        image::save_buffer_with_format(
            path,
            &rgba,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("failed to write PNG '{}'", path.display()))
        .map_err(|e| PixbeatError::io(Stage::Rendering, e))?;
        Ok(())
    }
}
