use crate::{
    foundation::error::PixbeatResult,
    render::{
        frame::FrameRGBA,
        layers::{self, LayerInput},
        raster::dims_u16,
    },
    scene::{context::RenderJobContext, state::SceneState},
};

/// Draws frames for one worker.
///
/// Holds the rasterizer context and the baked full-frame images between frames so a worker pays
/// for them once. Output depends only on the job context and the scene passed in.
#[derive(Default)]
pub struct FrameRenderer {
    ctx: Option<vello_cpu::RenderContext>,
    baked: Option<Baked>,
}

struct Baked {
    width: u32,
    height: u32,
    seed: u64,
    vignette: vello_cpu::Image,
    speckle: vello_cpu::Image,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `scene` to a premultiplied RGBA frame at the job's canvas size.
    pub fn render(
        &mut self,
        job: &RenderJobContext,
        scene: &SceneState,
    ) -> PixbeatResult<FrameRGBA> {
        let canvas = job.canvas();
        let (w, h) = dims_u16(canvas.width, canvas.height)?;
        let (vignette, speckle) = self.baked_for(job)?;

        let mut rc = self.take_ctx(w, h);
        let input = LayerInput {
            job,
            scene,
            width: f64::from(canvas.width),
            height: f64::from(canvas.height),
        };

        layers::background(&mut rc, &input);
        if job.style().noise_speckle() {
            layers::noise_speckle(&mut rc, &input, &speckle);
        }
        for &motif in job.style().motifs() {
            layers::motif(&mut rc, &input, motif);
        }
        layers::particles(&mut rc, &input);
        layers::grid(&mut rc, &input);
        layers::vignette(&mut rc, &input, &vignette);
        layers::section_pill(&mut rc, &input);
        layers::beat_tint(&mut rc, &input);
        layers::watermark(&mut rc, &input);

        rc.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        rc.render_to_pixmap(&mut pixmap);
        self.ctx = Some(rc);

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn take_ctx(&mut self, w: u16, h: u16) -> vello_cpu::RenderContext {
        let mut rc = match self.ctx.take() {
            Some(rc) if rc.width() == w && rc.height() == h => rc,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        rc.reset();
        rc
    }

    fn baked_for(
        &mut self,
        job: &RenderJobContext,
    ) -> PixbeatResult<(vello_cpu::Image, vello_cpu::Image)> {
        let canvas = job.canvas();
        let seed = job.settings().seed;
        let baked = match self.baked.take() {
            Some(b) if b.width == canvas.width && b.height == canvas.height && b.seed == seed => b,
            _ => {
                tracing::trace!(width = canvas.width, height = canvas.height, "baking overlays");
                Baked {
                    width: canvas.width,
                    height: canvas.height,
                    seed,
                    vignette: layers::bake_vignette(canvas.width, canvas.height)?,
                    speckle: layers::bake_speckle(canvas.width, canvas.height, seed)?,
                }
            }
        };
        let out = (baked.vignette.clone(), baked.speckle.clone());
        self.baked = Some(baked);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
