use rayon::prelude::*;

use crate::{
    core::Viewport,
    dispatch::{PlaceholderScene, Selection},
    error::{SceneError, SceneResult},
    registry::RendererFactory,
    scene::SceneInstance,
    script::{NarrationLineScene, NarrationScript, stable_hash64},
    surface::Surface,
};

// Placeholder messages for the recoverable dispatch states.
const MSG_LOADING: &str = "加载场景中...";
const MSG_NO_TOPIC: &str = "该实验暂无专属场景";
const MSG_LOAD_FAILED: &str = "场景加载失败";

/// The lifecycle shell: resolves a topic, dispatches each narration line and
/// keeps exactly one scene instance mounted.
///
/// Switching lines always tears the previous instance down (stopping its
/// driver) before the next one mounts; a line that re-selects the same scene
/// variant keeps the instance and only updates its parameters.
pub struct Presenter {
    factory: RendererFactory,
    viewport: Viewport,
    is_interactive: bool,
    active: Option<Active>,
}

struct Active {
    topic: String,
    instance: SceneInstance,
}

impl Presenter {
    pub fn new(viewport: Viewport, is_interactive: bool) -> Self {
        Self::with_factory(RendererFactory::new(), viewport, is_interactive)
    }

    fn with_factory(factory: RendererFactory, viewport: Viewport, is_interactive: bool) -> Self {
        Self {
            factory,
            viewport,
            is_interactive,
            active: None,
        }
    }

    /// Currently mounted scene variant, if any.
    pub fn active_label(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.instance.label())
    }

    pub fn is_animating(&self) -> bool {
        self.active
            .as_ref()
            .map(|a| a.instance.is_animating())
            .unwrap_or(false)
    }

    /// Animation-state value of the mounted scene (diagnostic/testing).
    pub fn anim_value(&self) -> Option<f64> {
        self.active.as_ref().map(|a| a.instance.anim_value())
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.active.as_ref().map(|a| a.instance.surface())
    }

    /// Show one line of a script (out-of-range indexes show the loading
    /// placeholder, like a scene that has not arrived yet).
    pub fn show_script_line(
        &mut self,
        script: &NarrationScript,
        index: usize,
    ) -> SceneResult<&Surface> {
        self.show(&script.topic, script.seed, script.lines.get(index))
    }

    /// Full dispatch flow for one narration line.
    ///
    /// Unknown topic, failed topic load and missing line all mount
    /// placeholder scenes and return `Ok`.
    #[tracing::instrument(skip_all, fields(topic = topic))]
    pub fn show(
        &mut self,
        topic: &str,
        seed: u64,
        line: Option<&NarrationLineScene>,
    ) -> SceneResult<&Surface> {
        let renderer = match self.factory.resolve(topic) {
            Ok(Some(renderer)) => renderer,
            Ok(None) => return self.mount_placeholder("no-topic", MSG_NO_TOPIC),
            Err(e) => {
                tracing::warn!(error = %e, "degrading to load-failure placeholder");
                return self.mount_placeholder("load-failed", MSG_LOAD_FAILED);
            }
        };

        let Some(line) = line else {
            return self.mount_placeholder("loading", MSG_LOADING);
        };

        let selection = renderer.select(line);
        let line_seed = stable_hash64(seed, &line.line_id);
        let line_state = line.line_state.as_ref();

        let same_scene = self
            .active
            .as_ref()
            .is_some_and(|a| a.topic == topic && a.instance.label() == selection.label);

        if same_scene {
            if let Some(active) = self.active.as_mut() {
                active.instance.set_animating(selection.animate);
                active.instance.update(line_seed, line_state)?;
            }
        } else {
            // Stop the outgoing animation before the new scene mounts.
            if let Some(active) = self.active.as_mut() {
                active.instance.teardown();
            }
            let instance = SceneInstance::mount(
                selection,
                self.viewport,
                renderer.defaults(),
                line_seed,
                self.is_interactive,
                line_state,
            )?;
            self.active = Some(Active {
                topic: topic.to_string(),
                instance,
            });
        }

        self.active_surface()
    }

    /// Advance the mounted animation by one cadence step. Returns whether a
    /// repaint happened.
    pub fn tick(&mut self) -> SceneResult<bool> {
        match self.active.as_mut() {
            Some(active) => active.instance.tick(),
            None => Ok(false),
        }
    }

    fn mount_placeholder(&mut self, tag: &str, message: &str) -> SceneResult<&Surface> {
        let label = format!("placeholder-{tag}");
        if self.active.as_ref().map(|a| a.instance.label()) != Some(label.as_str()) {
            if let Some(active) = self.active.as_mut() {
                active.instance.teardown();
            }
            let selection = Selection::still(
                label,
                PlaceholderScene {
                    message: message.to_string(),
                },
            );
            let instance = SceneInstance::mount(
                selection,
                self.viewport,
                Default::default(),
                0,
                self.is_interactive,
                None,
            )?;
            self.active = Some(Active {
                topic: String::new(),
                instance,
            });
        }
        self.active_surface()
    }

    fn active_surface(&self) -> SceneResult<&Surface> {
        self.surface()
            .ok_or_else(|| SceneError::draw("no scene mounted"))
    }
}

/// One rendered narration line.
pub struct ScriptFrame {
    pub line_id: String,
    pub surface: Surface,
}

/// Batch-render every line of a script, advancing each line's animation by
/// `ticks` cadence steps. Lines are independent, so they render in parallel;
/// within a line, draw calls stay strictly sequential.
#[tracing::instrument(skip(script), fields(topic = %script.topic, lines = script.lines.len()))]
pub fn render_script(
    script: &NarrationScript,
    viewport: Viewport,
    ticks: u32,
) -> SceneResult<Vec<ScriptFrame>> {
    script.validate()?;
    script
        .lines
        .par_iter()
        .enumerate()
        .map(|(index, line)| {
            let mut presenter = Presenter::new(viewport, false);
            presenter.show_script_line(script, index)?;
            for _ in 0..ticks {
                presenter.tick()?;
            }
            let surface = presenter
                .surface()
                .ok_or_else(|| SceneError::draw("no scene mounted"))?
                .clone();
            Ok(ScriptFrame {
                line_id: line.line_id.clone(),
                surface,
            })
        })
        .collect()
}
