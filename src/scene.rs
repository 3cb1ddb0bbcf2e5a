use std::collections::BTreeMap;

use crate::{
    core::Viewport,
    dispatch::Selection,
    draw::{DrawParams, SceneDraw},
    driver::AnimationDriver,
    error::SceneResult,
    script::LineState,
    surface::Surface,
};

/// One mounted scene: a draw function bound to its own animation driver and
/// its own surface.
///
/// Lifecycle: `mount` paints the first frame; `update` re-derives parameters
/// when the narration line changes; `tick` advances the animation; `teardown`
/// stops the driver for good. Draw calls are strictly sequential — each
/// repaint completes before the next can be requested.
pub struct SceneInstance {
    label: String,
    draw: Box<dyn SceneDraw>,
    driver: AnimationDriver,
    surface: Surface,
    defaults: BTreeMap<String, serde_json::Value>,
    params: DrawParams,
    seed: u64,
    is_interactive: bool,
}

impl SceneInstance {
    #[tracing::instrument(skip_all, fields(scene = %selection.label))]
    pub fn mount(
        selection: Selection,
        viewport: Viewport,
        defaults: BTreeMap<String, serde_json::Value>,
        seed: u64,
        is_interactive: bool,
        line_state: Option<&LineState>,
    ) -> SceneResult<Self> {
        let mut driver =
            AnimationDriver::new(selection.initial, selection.advance, selection.interval);
        driver.set_animating(selection.animate);
        let params = DrawParams::merge(&defaults, line_state)
            .with_anim(driver.value())
            .with_seed(seed)
            .with_interactive(is_interactive);
        let mut instance = Self {
            label: selection.label,
            draw: selection.draw,
            driver,
            surface: Surface::new(viewport),
            defaults,
            params,
            seed,
            is_interactive,
        };
        instance.repaint()?;
        Ok(instance)
    }

    /// Decoded variant name this instance was mounted for.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn is_animating(&self) -> bool {
        self.driver.is_running()
    }

    /// Current animation-state value (what the next repaint will see).
    pub fn anim_value(&self) -> f64 {
        self.driver.value()
    }

    /// Flip the animate flag; redundant flips are no-ops and off→on resets
    /// the animation state.
    pub fn set_animating(&mut self, animate: bool) {
        self.driver.set_animating(animate);
    }

    /// Re-derive effective parameters from a (possibly new) line's seed and
    /// state and repaint immediately with the current animation state.
    ///
    /// The seed is taken fresh on every update: a kept-alive instance serving
    /// a new narration line must paint that line's data, not the previous
    /// line's.
    #[tracing::instrument(skip_all, fields(scene = %self.label))]
    pub fn update(&mut self, seed: u64, line_state: Option<&LineState>) -> SceneResult<()> {
        self.seed = seed;
        self.params = DrawParams::merge(&self.defaults, line_state)
            .with_anim(self.driver.value())
            .with_seed(self.seed)
            .with_interactive(self.is_interactive);
        self.repaint()
    }

    /// One cadence step: advance the driver (if running) and repaint.
    /// Returns whether a repaint happened.
    pub fn tick(&mut self) -> SceneResult<bool> {
        let Some(value) = self.driver.tick() else {
            return Ok(false);
        };
        self.params.anim = value;
        self.repaint()?;
        Ok(true)
    }

    /// Stop the driver. Later `tick`s never reach the draw function.
    pub fn teardown(&mut self) {
        self.driver.stop();
    }

    fn repaint(&mut self) -> SceneResult<()> {
        self.draw.draw(&mut self.surface, &self.params)
    }
}
