use crate::{
    analysis::timeline::Timeline,
    foundation::{
        core::{Canvas, Fps, FrameIndex},
        error::PixbeatResult,
    },
    mapping::{event::EventList, mapper::map_events},
    pipeline::settings::ProjectSettings,
    scene::{
        palette::Palette,
        particles::ParticleSchedule,
        style::{TemplateConfig, VisualStyle},
    },
};

/// Everything a render job derives once at job start. Immutable afterwards and shared by
/// reference with every worker.
#[derive(Clone, Debug)]
pub struct RenderJobContext {
    timeline: Timeline,
    template: TemplateConfig,
    settings: ProjectSettings,
    fps: Fps,
    palette: Palette,
    events: EventList,
    particles: ParticleSchedule,
    total_frames: u64,
}

impl RenderJobContext {
    /// Validate inputs, select the palette, map events and precompute particle spawns.
    #[tracing::instrument(skip(timeline, settings), fields(style = style.template_id()))]
    pub fn new(
        timeline: Timeline,
        style: VisualStyle,
        settings: ProjectSettings,
    ) -> PixbeatResult<Self> {
        settings.validate()?;
        let fps = settings.fps()?;
        let template = settings.template(style);
        template.validate()?;

        let info = timeline.info();
        let palette = Palette::select(&info.mood, &info.genre).with_cell_colors(&settings.palette)?;
        let events = EventList::new(map_events(&timeline, &template, settings.seed));
        let particles = ParticleSchedule::build(
            timeline.beats(),
            &palette,
            settings.canvas(),
            style.particle_gravity(),
            settings.particle_cap,
            settings.seed,
        );
        let total_frames = fps.total_frames(settings.render_duration(timeline.duration_seconds()));
        tracing::debug!(
            palette = ?palette.kind(),
            events = events.len(),
            particles = particles.spawns().len(),
            total_frames,
            "job context ready"
        );

        Ok(Self {
            timeline,
            template,
            settings,
            fps,
            palette,
            events,
            particles,
            total_frames,
        })
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn template(&self) -> &TemplateConfig {
        &self.template
    }

    pub fn style(&self) -> VisualStyle {
        self.template.style
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn canvas(&self) -> Canvas {
        self.settings.canvas()
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn events(&self) -> &EventList {
        &self.events
    }

    pub fn particles(&self) -> &ParticleSchedule {
        &self.particles
    }

    /// `round(render_duration * fps)`.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn frame_time(&self, frame: FrameIndex) -> f64 {
        self.fps.frame_time(frame)
    }

    /// `true` when a beat lies within half a frame of `t`.
    pub fn is_beat_frame(&self, t: f64) -> bool {
        let half = 0.5 * self.fps.frame_duration_secs();
        self.timeline.has_beat_in(t - half, t + half)
    }
}
