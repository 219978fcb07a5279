//! Frame layers, back to front. Each routine draws one layer into the shared `RenderContext`.

use std::f64::consts::TAU;

use vello_cpu::kurbo::Affine;

use crate::{
    foundation::{
        core::Rgba8,
        error::PixbeatResult,
        math::{derive_seed, hash_u32},
    },
    render::{
        font,
        raster::{
            circle, color, line, premul_image, premultiply, rect, rounded_rect, rounded_square,
        },
    },
    scene::{context::RenderJobContext, state::SceneState, style::Motif},
};

const BACKGROUND_BANDS: usize = 48;
const GRID_FILL: f64 = 0.78;
const CELL_GAP: f64 = 0.12;
const STAR_COUNT: u32 = 70;
const MESH_ROWS: u32 = 12;
const MESH_SPOKES: i32 = 9;

const SPECKLE_DOMAIN: u64 = 0x5370_6563;
const SKYLINE_DOMAIN: u64 = 0x536b_796c;
const STAR_DOMAIN: u64 = 0x5374_6172;

/// Everything a layer routine reads.
pub(crate) struct LayerInput<'a> {
    pub job: &'a RenderJobContext,
    pub scene: &'a SceneState,
    pub width: f64,
    pub height: f64,
}

impl LayerInput<'_> {
    fn t(&self) -> f64 {
        self.scene.time
    }

    fn seed(&self) -> u64 {
        self.job.settings().seed
    }

    // Size of one "art pixel", scaled with frame height.
    fn art_px(&self, per: f64) -> f64 {
        (self.height / per).round().max(1.0)
    }
}

fn reset(rc: &mut vello_cpu::RenderContext) {
    rc.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    rc.set_paint_transform(Affine::IDENTITY);
    rc.set_transform(Affine::IDENTITY);
}

fn full_frame(input: &LayerInput<'_>) -> vello_cpu::kurbo::Rect {
    rect(0.0, 0.0, input.width, input.height)
}

/// Slowly breathing gradient between the two palette background colors. Linear bands for flat
/// styles, concentric discs for radial ones.
pub(crate) fn background(rc: &mut vello_cpu::RenderContext, input: &LayerInput<'_>) {
    reset(rc);
    let [a, b] = input.job.palette().background();
    let s = 0.25 * (0.5 + 0.5 * (input.t() * 0.4).sin());
    let near = a.lerp(b, s);
    let far = b.lerp(a, s);
    let steps = BACKGROUND_BANDS as f64;

    if input.job.style().radial_background() {
        rc.set_paint(color(far));
        rc.fill_rect(&full_frame(input));
        let (cx, cy) = (input.width * 0.5, input.height * 0.45);
        let r_max = 0.55 * (input.width.hypot(input.height));
        for i in 0..BACKGROUND_BANDS {
            let k = i as f64;
            rc.set_paint(color(far.lerp(near, k / (steps - 1.0))));
            rc.fill_path(&circle(cx, cy, r_max * (1.0 - k / steps)));
        }
    } else {
        let band = input.height / steps;
        for i in 0..BACKGROUND_BANDS {
            let k = i as f64;
            rc.set_paint(color(near.lerp(far, k / (steps - 1.0))));
            // One pixel of overlap hides antialiasing seams between bands.
            rc.fill_rect(&rect(0.0, k * band, input.width, (k + 1.0) * band + 1.0));
        }
    }
}

/// Sparse static speckle, flickering in overall opacity.
pub(crate) fn noise_speckle(
    rc: &mut vello_cpu::RenderContext,
    input: &LayerInput<'_>,
    speckle: &vello_cpu::Image,
) {
    reset(rc);
    let flicker = 0.6 + 0.4 * (input.t() * 7.0).sin();
    rc.set_paint(speckle.clone());
    rc.push_opacity_layer(flicker as f32);
    rc.fill_rect(&full_frame(input));
    rc.pop_layer();
}

pub(crate) fn bake_speckle(width: u32, height: u32, seed: u64) -> PixbeatResult<vello_cpu::Image> {
    let seed = derive_seed(seed, &[SPECKLE_DOMAIN]);
    let mut bytes = vec![0u8; (width as usize) * (height as usize) * 4];
    for y in 0..height {
        for x in 0..width {
            let v = hash_u32(seed, x, y);
            if v % 61 != 0 {
                continue;
            }
            let a = 40 + ((v >> 8) % 60) as u8;
            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&[a, a, a, a]);
        }
    }
    premul_image(&bytes, width, height)
}

pub(crate) fn motif(rc: &mut vello_cpu::RenderContext, input: &LayerInput<'_>, motif: Motif) {
    reset(rc);
    match motif {
        Motif::Skyline => skyline(rc, input),
        Motif::Stars => stars(rc, input),
        Motif::Mesh => mesh(rc, input),
    }
}

// Two parallax rows of buildings scrolling left; windows light up on beat frames.
fn skyline(rc: &mut vello_cpu::RenderContext, input: &LayerInput<'_>) {
    let (w, h) = (input.width, input.height);
    let [_, back] = input.job.palette().background();
    let px = input.art_px(120.0);
    let slot = (w / 14.0).max(4.0 * px);

    for (layer, speed, max_frac, shade) in [(0u32, 0.03, 0.34, 0.18), (1, 0.08, 0.22, 0.08)] {
        let seed = derive_seed(input.seed(), &[SKYLINE_DOMAIN, u64::from(layer)]);
        let offset = input.t() * speed * w;
        let first = (offset / slot).floor() as i64;
        let count = (w / slot).ceil() as i64 + 2;
        let body = back.lighten(shade);
        let window = input.job.palette().accent().with_alpha(if input.scene.beat_frame {
            0.9
        } else {
            0.35
        });

        for k in first..first + count {
            let hsh = hash_u32(seed, k as u32, layer);
            let bw = (slot * (0.55 + 0.4 * unit_f(hsh))).round();
            let bh = (h * max_frac * (0.35 + 0.65 * unit_f(hsh.rotate_left(11)))).round();
            let x0 = ((k as f64) * slot - offset).round();
            let y0 = h - bh;
            rc.set_paint(color(body));
            rc.fill_rect(&rect(x0, y0, x0 + bw, h));

            rc.set_paint(color(window));
            let mut wy = y0 + 2.0 * px;
            let mut row = 0u32;
            while wy + px < h - px {
                let mut wx = x0 + px;
                let mut col = 0u32;
                while wx + px < x0 + bw - px {
                    if hash_u32(seed ^ (k as u64), col, row) % 3 == 0 {
                        rc.fill_rect(&rect(wx, wy, wx + px, wy + px));
                    }
                    wx += 2.0 * px;
                    col += 1;
                }
                wy += 3.0 * px;
                row += 1;
            }
        }
    }
}

fn stars(rc: &mut vello_cpu::RenderContext, input: &LayerInput<'_>) {
    let seed = derive_seed(input.seed(), &[STAR_DOMAIN]);
    let px = input.art_px(360.0);
    let text = input.job.palette().text();
    let w = input.width.max(1.0) as u32;
    let h = (input.height * 0.7).max(1.0) as u32;
    for i in 0..STAR_COUNT {
        let x = f64::from(hash_u32(seed, i, 1) % w);
        let y = f64::from(hash_u32(seed, i, 2) % h);
        let phase = unit_f(hash_u32(seed, i, 3)) * TAU;
        let twinkle = 0.25 + 0.75 * (0.5 + 0.5 * (input.t() * 2.2 + phase).sin());
        let size = if i % 5 == 0 { 2.0 * px } else { px };
        rc.set_paint(color(text.with_alpha(twinkle)));
        rc.fill_rect(&rect(x, y, x + size, y + size));
    }
}

// Perspective floor: spokes converging on a vanishing point and rows sliding toward the viewer.
fn mesh(rc: &mut vello_cpu::RenderContext, input: &LayerInput<'_>) {
    let (w, h) = (input.width, input.height);
    let horizon = h * 0.62;
    let lw = input.art_px(360.0);
    let accent = input.job.palette().accent();

    rc.set_paint(color(accent.with_alpha(0.18)));
    let vp = (w * 0.5, horizon);
    for i in -MESH_SPOKES..=MESH_SPOKES {
        let xb = w * 0.5 + f64::from(i) * (w / f64::from(MESH_SPOKES)) * 0.9;
        rc.fill_path(&line(vp, (xb, h), lw));
    }

    let rows = f64::from(MESH_ROWS);
    for j in 0..MESH_ROWS {
        let p = ((f64::from(j) + input.t() * 0.8) % rows) / rows;
        let y = horizon + (h - horizon) * p * p;
        rc.set_paint(color(accent.with_alpha(0.05 + 0.25 * p)));
        rc.fill_rect(&rect(0.0, y - lw * 0.5, w, y + lw * 0.5));
    }
}

/// Soft glowing dots; opacity follows remaining life.
pub(crate) fn particles(rc: &mut vello_cpu::RenderContext, input: &LayerInput<'_>) {
    reset(rc);
    for p in &input.scene.particles {
        rc.set_paint(color(p.color.with_alpha(0.25 * p.life)));
        rc.fill_path(&circle(p.x, p.y, p.size * 2.2));
        rc.set_paint(color(p.color.with_alpha(0.9 * p.life)));
        rc.fill_path(&circle(p.x, p.y, p.size));
    }
}

/// Square grid geometry in device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct GridGeometry {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pitch: f64,
    pub cell: f64,
}

impl GridGeometry {
    pub(crate) fn new(width: f64, height: f64, rows: u32, cols: u32) -> Self {
        let area = width.min(height) * GRID_FILL;
        let pitch = (area / f64::from(cols.max(1))).min(area / f64::from(rows.max(1)));
        Self {
            origin_x: (width - pitch * f64::from(cols)) * 0.5,
            origin_y: (height - pitch * f64::from(rows)) * 0.5,
            pitch,
            cell: pitch * (1.0 - CELL_GAP),
        }
    }

    pub(crate) fn center(&self, row: u32, col: u32) -> (f64, f64) {
        (
            self.origin_x + (f64::from(col) + 0.5) * self.pitch,
            self.origin_y + (f64::from(row) + 0.5) * self.pitch,
        )
    }
}

/// Beveled rounded cells, scaled about their centers, with flash overlay and separator lines.
pub(crate) fn grid(rc: &mut vello_cpu::RenderContext, input: &LayerInput<'_>) {
    reset(rc);
    let g = &input.scene.grid;
    let geo = GridGeometry::new(input.width, input.height, g.rows(), g.cols());
    let palette = input.job.palette();
    let half = geo.cell * 0.5;
    let inset = geo.cell * 0.07;

    for cell in g.cells() {
        let alpha = cell.current_alpha;
        if alpha <= 0.0 || cell.current_scale <= 0.0 {
            continue;
        }
        let (cx, cy) = geo.center(cell.row, cell.col);
        rc.set_transform(Affine::translate((cx, cy)) * Affine::scale(cell.current_scale));

        let pop = if cell.is_animating { 0.08 } else { 0.0 };
        let radius = geo.cell * (0.14 + pop);
        let base = palette.cell_color(cell.row, cell.col, input.t());

        rc.set_paint(color(base.darken(0.4).with_alpha(alpha)));
        rc.fill_path(&rounded_square(half, half, radius));
        rc.set_paint(color(base.with_alpha(alpha)));
        rc.fill_path(&rounded_rect(-half, -half, half - inset, half - inset, radius));
        rc.set_paint(color(base.lighten(0.35).with_alpha(0.6 * alpha)));
        rc.fill_path(&rounded_rect(
            -half + inset,
            -half + inset,
            half - 2.0 * inset,
            -half + geo.cell * 0.35,
            radius * 0.6,
        ));

        if cell.is_flashing && cell.brightness > 0.0 {
            rc.set_paint(color(Rgba8::WHITE.with_alpha(0.85 * cell.brightness * alpha)));
            rc.fill_path(&rounded_square(half, half, radius));
            // Shimmer stripe travels across the cell as the flash decays.
            let sx = -half + geo.cell * (1.0 - cell.flash_intensity);
            rc.set_paint(color(Rgba8::WHITE.with_alpha(0.5 * cell.brightness)));
            rc.fill_rect(&rect(sx, -half, (sx + geo.cell * 0.12).min(half), half));
        }
    }

    rc.set_transform(Affine::IDENTITY);
    let lw = input.art_px(720.0);
    let (gw, gh) = (geo.pitch * f64::from(g.cols()), geo.pitch * f64::from(g.rows()));
    rc.set_paint(color(palette.text().with_alpha(0.06)));
    for i in 1..g.cols() {
        let x = geo.origin_x + f64::from(i) * geo.pitch;
        rc.fill_rect(&rect(x - lw * 0.5, geo.origin_y, x + lw * 0.5, geo.origin_y + gh));
    }
    for i in 1..g.rows() {
        let y = geo.origin_y + f64::from(i) * geo.pitch;
        rc.fill_rect(&rect(geo.origin_x, y - lw * 0.5, geo.origin_x + gw, y + lw * 0.5));
    }
}

pub(crate) fn vignette(
    rc: &mut vello_cpu::RenderContext,
    input: &LayerInput<'_>,
    vignette: &vello_cpu::Image,
) {
    reset(rc);
    rc.set_paint(vignette.clone());
    rc.fill_rect(&full_frame(input));
}

pub(crate) fn bake_vignette(width: u32, height: u32) -> PixbeatResult<vello_cpu::Image> {
    let (hw, hh) = (f64::from(width) * 0.5, f64::from(height) * 0.5);
    let mut bytes = vec![0u8; (width as usize) * (height as usize) * 4];
    for y in 0..height {
        let dy = (f64::from(y) + 0.5 - hh) / hh;
        for x in 0..width {
            let dx = (f64::from(x) + 0.5 - hw) / hw;
            let d = (dx * dx + dy * dy).sqrt() / std::f64::consts::SQRT_2;
            let a = smoothstep(0.55, 1.0, d) * 0.55;
            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&premultiply(Rgba8::BLACK.with_alpha(a)));
        }
    }
    premul_image(&bytes, width, height)
}

/// Current section label in a pill, top-left.
pub(crate) fn section_pill(rc: &mut vello_cpu::RenderContext, input: &LayerInput<'_>) {
    let Some(section) = input.job.timeline().section_at(input.t()) else {
        return;
    };
    reset(rc);
    let label = section.label.to_uppercase();
    let px = input.art_px(180.0);
    let pad = 3.0 * px;
    let margin = 6.0 * px;
    let pill_w = font::text_width(&label, px) + 2.0 * pad;
    let pill_h = font::text_height(px) + 2.0 * pad;
    let palette = input.job.palette();

    rc.set_paint(color(palette.accent().with_alpha(0.85)));
    rc.fill_path(&rounded_rect(
        margin,
        margin,
        margin + pill_w,
        margin + pill_h,
        pill_h * 0.5,
    ));
    rc.set_paint(color(palette.background()[0]));
    for r in font::layout(&label, margin + pad, margin + pad, px) {
        rc.fill_rect(&r);
    }
}

/// Full-frame accent tint on frames that land on a beat.
pub(crate) fn beat_tint(rc: &mut vello_cpu::RenderContext, input: &LayerInput<'_>) {
    if !input.scene.beat_frame {
        return;
    }
    reset(rc);
    rc.set_paint(color(input.job.palette().accent().with_alpha(0.10)));
    rc.fill_rect(&full_frame(input));
}

/// Semi-transparent text, bottom-right, with a one pixel drop shadow.
pub(crate) fn watermark(rc: &mut vello_cpu::RenderContext, input: &LayerInput<'_>) {
    let text = input.job.settings().watermark_text.trim();
    if text.is_empty() {
        return;
    }
    reset(rc);
    let px = input.art_px(240.0);
    let margin = 6.0 * px;
    let x = input.width - margin - font::text_width(text, px);
    let y = input.height - margin - font::text_height(px);

    rc.set_paint(color(Rgba8::BLACK.with_alpha(0.6)));
    for r in font::layout(text, x + 1.0, y + 1.0, px) {
        rc.fill_rect(&r);
    }
    rc.set_paint(color(input.job.palette().text().with_alpha(0.55)));
    for r in font::layout(text, x, y, px) {
        rc.fill_rect(&r);
    }
}

fn unit_f(v: u32) -> f64 {
    f64::from(v) / f64::from(u32::MAX)
}

fn smoothstep(e0: f64, e1: f64, x: f64) -> f64 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
