use std::collections::BTreeMap;
use std::time::Duration;

use kurbo::{Point, Rect};

use crate::{
    core::Rgba8,
    draw::{DrawParams, SceneDraw},
    driver::{Advance, DEFAULT_TICK_INTERVAL},
    error::SceneResult,
    script::{AnnotationPosition, NarrationLineScene},
    surface::{Label, Surface, label},
};

/// A topic's scene dispatcher.
///
/// `select` is pure: it decodes the line's `(sectionId, scene.id, type)`
/// strings into one of the topic's scene variants exactly once, at this
/// boundary. Unknown ids resolve to the topic's default scene, never an
/// error.
pub trait TopicRenderer: Send + Sync {
    /// Registry key, e.g. `"bezier"`.
    fn topic(&self) -> &'static str;

    /// Default draw parameters; `lineState.params` overrides these per line.
    fn defaults(&self) -> BTreeMap<String, serde_json::Value>;

    fn select(&self, line: &NarrationLineScene) -> Selection;
}

/// Outcome of dispatch: which draw function to mount and how to animate it.
///
/// `label` names the decoded variant; the presenter remounts (and therefore
/// stops the old driver) whenever it changes between lines.
pub struct Selection {
    pub label: String,
    pub draw: Box<dyn SceneDraw>,
    pub animate: bool,
    pub initial: f64,
    pub advance: Advance,
    pub interval: Duration,
}

impl Selection {
    /// A static (non-animated) scene.
    pub fn still(variant: impl Into<String>, draw: impl SceneDraw + 'static) -> Self {
        Self {
            label: variant.into(),
            draw: Box::new(draw),
            animate: false,
            initial: 0.0,
            advance: Advance::Saturate { delta: 0.0, max: 0.0 },
            interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// An animated scene driven by `advance` from `initial`.
    pub fn animated(
        variant: impl Into<String>,
        draw: impl SceneDraw + 'static,
        advance: Advance,
    ) -> Self {
        Self {
            label: variant.into(),
            draw: Box::new(draw),
            animate: true,
            initial: 0.0,
            advance,
            interval: DEFAULT_TICK_INTERVAL,
        }
    }

    pub fn initial(mut self, value: f64) -> Self {
        self.initial = value;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn title(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self::still(
            "title",
            TitleScene {
                title: title.into(),
                subtitle: subtitle.into(),
            },
        )
    }

    pub fn formula(text: fn(&DrawParams) -> String) -> Self {
        Self::still("formula", FormulaScene { text })
    }

    pub fn application(caption: impl Into<String>) -> Self {
        Self::still(
            "application",
            ApplicationScene {
                caption: caption.into(),
            },
        )
    }

    pub fn placeholder(message: impl Into<String>) -> Self {
        Self::still(
            "placeholder",
            PlaceholderScene {
                message: message.into(),
            },
        )
    }
}

/// Generic title card: big heading plus subtitle.
pub struct TitleScene {
    pub title: String,
    pub subtitle: String,
}

impl SceneDraw for TitleScene {
    fn draw(&self, surface: &mut Surface, _params: &DrawParams) -> SceneResult<()> {
        surface.clear(Rgba8::BACKGROUND);
        let c = surface.viewport().center();
        surface.push_label(Label {
            text: self.title.clone(),
            pos: Point::new(c.x, c.y - 24.0),
            size_px: 48.0,
            color: Rgba8::WHITE,
            id: Some("title".to_string()),
        });
        if !self.subtitle.is_empty() {
            surface.push_label(Label {
                text: self.subtitle.clone(),
                pos: Point::new(c.x, c.y + 28.0),
                size_px: 24.0,
                color: Rgba8::new(255, 255, 255, 180),
                id: Some("subtitle".to_string()),
            });
        }
        Ok(())
    }
}

/// Generic formula card: the text is computed from the merged params at draw
/// time, so line overrides flow into it.
pub struct FormulaScene {
    pub text: fn(&DrawParams) -> String,
}

impl SceneDraw for FormulaScene {
    fn draw(&self, surface: &mut Surface, params: &DrawParams) -> SceneResult<()> {
        surface.clear(Rgba8::BACKGROUND);
        let c = surface.viewport().center();
        let w = f64::from(surface.width());
        surface.fill_rect(
            Rect::new(w * 0.15, c.y - 48.0, w * 0.85, c.y + 48.0),
            Rgba8::new(15, 23, 42, 220),
        );
        surface.push_label(Label {
            text: (self.text)(params),
            pos: c,
            size_px: 40.0,
            color: Rgba8::WHITE,
            id: Some("formula".to_string()),
        });
        draw_annotation(surface, params);
        Ok(())
    }
}

/// Generic application card: framed illustration slot with a caption.
pub struct ApplicationScene {
    pub caption: String,
}

impl SceneDraw for ApplicationScene {
    fn draw(&self, surface: &mut Surface, params: &DrawParams) -> SceneResult<()> {
        surface.clear(Rgba8::BACKGROUND);
        let w = f64::from(surface.width());
        let h = f64::from(surface.height());
        let frame = Rect::new(w * 0.2, h * 0.15, w * 0.8, h * 0.7);
        surface.fill_rect(frame, Rgba8::new(51, 65, 85, 255));
        surface.stroke_line(
            Point::new(frame.x0, frame.y0),
            Point::new(frame.x1, frame.y1),
            1.0,
            Rgba8::GRID,
        );
        surface.push_label(Label {
            text: self.caption.clone(),
            pos: Point::new(w / 2.0, h * 0.82),
            size_px: 22.0,
            color: Rgba8::WHITE,
            id: Some("caption".to_string()),
        });
        draw_annotation(surface, params);
        Ok(())
    }
}

/// Placeholder used for "loading", "no scene available" and load failures.
pub struct PlaceholderScene {
    pub message: String,
}

impl SceneDraw for PlaceholderScene {
    fn draw(&self, surface: &mut Surface, _params: &DrawParams) -> SceneResult<()> {
        surface.clear(Rgba8::opaque(15, 23, 42));
        surface.push_label(Label {
            text: self.message.clone(),
            pos: surface.viewport().center(),
            size_px: 20.0,
            color: Rgba8::new(255, 255, 255, 128),
            id: Some("placeholder".to_string()),
        });
        Ok(())
    }
}

/// Paint the line's annotation, if any, at its requested edge.
pub fn draw_annotation(surface: &mut Surface, params: &DrawParams) {
    let Some(ann) = params.annotation() else {
        return;
    };
    let w = f64::from(surface.width());
    let h = f64::from(surface.height());
    let pos = match ann.position {
        AnnotationPosition::Top => Point::new(w / 2.0, h * 0.08),
        AnnotationPosition::Bottom => Point::new(w / 2.0, h * 0.92),
        AnnotationPosition::Left => Point::new(w * 0.12, h / 2.0),
        AnnotationPosition::Right => Point::new(w * 0.88, h / 2.0),
    };
    let mut l = label(ann.text.clone(), pos);
    l.size_px = 20.0;
    l.color = Rgba8::AMBER;
    l.id = Some("annotation".to_string());
    surface.push_label(l);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Viewport;
    use crate::script::{Annotation, LineState};

    fn params_with_annotation(position: AnnotationPosition) -> DrawParams {
        let state = LineState {
            annotation: Some(Annotation {
                text: "加 减 乘 除".to_string(),
                position,
                target: None,
            }),
            ..LineState::default()
        };
        DrawParams::merge(&BTreeMap::new(), Some(&state))
    }

    #[test]
    fn title_scene_emits_heading_labels() {
        let mut s = Surface::new(Viewport::default());
        let scene = TitleScene {
            title: "贝塞尔曲线".to_string(),
            subtitle: "计算机图形学的基石".to_string(),
        };
        scene
            .draw(&mut s, &DrawParams::merge(&BTreeMap::new(), None))
            .unwrap();
        assert!(s.find_label("贝塞尔曲线").is_some());
        assert!(s.find_label("基石").is_some());
    }

    #[test]
    fn formula_scene_uses_merged_params() {
        let mut s = Surface::new(Viewport::default());
        let scene = FormulaScene {
            text: |p| format!("{} + {}", p.i64("num1", 0), p.i64("num2", 0)),
        };
        let defaults = BTreeMap::from([
            ("num1".to_string(), serde_json::json!(3)),
            ("num2".to_string(), serde_json::json!(4)),
        ]);
        scene
            .draw(&mut s, &DrawParams::merge(&defaults, None))
            .unwrap();
        assert_eq!(s.find_label("3 + 4").unwrap().id.as_deref(), Some("formula"));
    }

    #[test]
    fn annotation_is_painted_at_requested_edge() {
        let mut s = Surface::new(Viewport::new(600, 400));
        let p = params_with_annotation(AnnotationPosition::Bottom);
        s.clear(Rgba8::BACKGROUND);
        draw_annotation(&mut s, &p);
        let l = s.find_label("加 减 乘 除").unwrap();
        assert!(l.pos.y > 300.0);
    }

    #[test]
    fn placeholder_scene_has_stable_id() {
        let mut s = Surface::new(Viewport::default());
        let scene = PlaceholderScene {
            message: "加载中...".to_string(),
        };
        scene
            .draw(&mut s, &DrawParams::merge(&BTreeMap::new(), None))
            .unwrap();
        assert_eq!(
            s.find_label("加载中").unwrap().id.as_deref(),
            Some("placeholder")
        );
    }
}
