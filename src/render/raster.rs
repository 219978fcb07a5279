//! Glue between scene geometry and `vello_cpu`.

use std::sync::Arc;

use vello_cpu::kurbo::Shape as _;

use crate::foundation::{
    core::Rgba8,
    error::{PixbeatError, PixbeatResult},
    math::mul_div255_u16,
};

pub(crate) fn color(c: Rgba8) -> vello_cpu::peniko::Color {
    c.to_vello()
}

pub(crate) fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(x0, y0, x1, y1)
}

/// Rounded rectangle centered on the origin.
pub(crate) fn rounded_square(half_w: f64, half_h: f64, radius: f64) -> vello_cpu::kurbo::BezPath {
    vello_cpu::kurbo::RoundedRect::new(-half_w, -half_h, half_w, half_h, radius).to_path(0.1)
}

pub(crate) fn rounded_rect(
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    radius: f64,
) -> vello_cpu::kurbo::BezPath {
    vello_cpu::kurbo::RoundedRect::new(x0, y0, x1, y1, radius).to_path(0.1)
}

pub(crate) fn circle(cx: f64, cy: f64, r: f64) -> vello_cpu::kurbo::BezPath {
    vello_cpu::kurbo::Circle::new(vello_cpu::kurbo::Point::new(cx, cy), r).to_path(0.1)
}

/// Closed polygon through `points`.
pub(crate) fn polygon(points: &[(f64, f64)]) -> vello_cpu::kurbo::BezPath {
    let mut p = vello_cpu::kurbo::BezPath::new();
    if let Some(&(x, y)) = points.first() {
        p.move_to((x, y));
        for &(x, y) in &points[1..] {
            p.line_to((x, y));
        }
        p.close_path();
    }
    p
}

/// Thin quad from `a` to `b`, `width` pixels across.
pub(crate) fn line(a: (f64, f64), b: (f64, f64), width: f64) -> vello_cpu::kurbo::BezPath {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f64::EPSILON {
        return vello_cpu::kurbo::BezPath::new();
    }
    let (nx, ny) = (-dy / len * width * 0.5, dx / len * width * 0.5);
    polygon(&[
        (a.0 + nx, a.1 + ny),
        (b.0 + nx, b.1 + ny),
        (b.0 - nx, b.1 - ny),
        (a.0 - nx, a.1 - ny),
    ])
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PixbeatResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(PixbeatError::validation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

/// Image paint from premultiplied RGBA8 bytes.
pub(crate) fn premul_image(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PixbeatResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

pub(crate) fn dims_u16(width: u32, height: u32) -> PixbeatResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PixbeatError::validation("frame width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PixbeatError::validation("frame height exceeds u16"))?;
    Ok((w, h))
}

pub(crate) fn premultiply(c: Rgba8) -> [u8; 4] {
    let a = u16::from(c.a);
    [
        mul_div255_u16(u16::from(c.r), a) as u8,
        mul_div255_u16(u16::from(c.g), a) as u8,
        mul_div255_u16(u16::from(c.b), a) as u8,
        c.a,
    ]
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg: [u8; 3],
) -> PixbeatResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(PixbeatError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(u16::from(bg[c]), inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}
