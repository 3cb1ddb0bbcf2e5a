use std::collections::BTreeMap;

use crate::{
    error::SceneResult,
    script::{Annotation, LineState, ShowFlag},
    surface::Surface,
};

/// A pure paint routine for one frame of a diagram.
///
/// Contract: repaint the whole surface from `params` alone (clear first), no
/// other side effects, no external mutable state. Trail effects must derive
/// the trail from `params`/animation state, never from leftover pixels.
pub trait SceneDraw: Send + Sync {
    fn draw(&self, surface: &mut Surface, params: &DrawParams) -> SceneResult<()>;
}

impl<F> SceneDraw for F
where
    F: Fn(&mut Surface, &DrawParams) -> SceneResult<()> + Send + Sync,
{
    fn draw(&self, surface: &mut Surface, params: &DrawParams) -> SceneResult<()> {
        self(surface, params)
    }
}

/// Effective draw parameters for one repaint: topic defaults merged with the
/// line's overrides, plus visibility/highlight state and the animation value.
///
/// Invariant: `lineState.params` always wins over topic defaults.
#[derive(Clone, Debug)]
pub struct DrawParams {
    values: BTreeMap<String, serde_json::Value>,
    show: BTreeMap<String, ShowFlag>,
    highlight: Vec<String>,
    annotation: Option<Annotation>,
    /// Animation-state snapshot for this repaint (angle, t, step count, ...).
    pub anim: f64,
    /// Deterministic seed for simulated data, stable across repaints.
    pub seed: u64,
    pub is_interactive: bool,
}

impl DrawParams {
    /// Merge topic `defaults` with a line's state, overrides taking
    /// precedence key by key.
    pub fn merge(
        defaults: &BTreeMap<String, serde_json::Value>,
        line_state: Option<&LineState>,
    ) -> Self {
        let mut values = defaults.clone();
        let mut show = BTreeMap::new();
        let mut highlight = Vec::new();
        let mut annotation = None;
        if let Some(state) = line_state {
            for (k, v) in &state.params {
                values.insert(k.clone(), v.clone());
            }
            show = state.show.clone();
            highlight = state.highlight.clone();
            annotation = state.annotation.clone();
        }
        Self {
            values,
            show,
            highlight,
            annotation,
            anim: 0.0,
            seed: 0,
            is_interactive: false,
        }
    }

    pub fn with_anim(mut self, anim: f64) -> Self {
        self.anim = anim;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_interactive(mut self, is_interactive: bool) -> Self {
        self.is_interactive = is_interactive;
        self
    }

    pub fn f64(&self, key: &str, default: f64) -> f64 {
        match self.values.get(key).and_then(serde_json::Value::as_f64) {
            Some(v) if v.is_finite() => v,
            _ => default,
        }
    }

    pub fn i64(&self, key: &str, default: i64) -> i64 {
        self.values
            .get(key)
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(default)
    }

    pub fn bool(&self, key: &str, default: bool) -> bool {
        self.values
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(default)
    }

    pub fn str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.values
            .get(key)
            .and_then(serde_json::Value::as_str)
            .unwrap_or(default)
    }

    /// Visibility of `element`. Elements not named by the script are shown;
    /// scripts hide explicitly.
    pub fn show(&self, element: &str) -> bool {
        self.show.get(element).map(|f| f.visible()).unwrap_or(true)
    }

    /// How many of `total` items of `element` to show.
    pub fn show_count(&self, element: &str, total: u32) -> u32 {
        self.show
            .get(element)
            .map(|f| f.count(total))
            .unwrap_or(total)
    }

    pub fn is_highlighted(&self, element: &str) -> bool {
        self.highlight.iter().any(|h| h == element)
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::AnnotationPosition;

    fn defaults() -> BTreeMap<String, serde_json::Value> {
        BTreeMap::from([
            ("num1".to_string(), serde_json::json!(5)),
            ("num2".to_string(), serde_json::json!(4)),
            ("operation".to_string(), serde_json::json!("addition")),
        ])
    }

    #[test]
    fn line_params_override_defaults() {
        let state = LineState {
            params: BTreeMap::from([("num1".to_string(), serde_json::json!(7))]),
            ..LineState::default()
        };
        let p = DrawParams::merge(&defaults(), Some(&state));
        assert_eq!(p.f64("num1", 0.0), 7.0);
        // Keys the line does not touch keep their defaults.
        assert_eq!(p.f64("num2", 0.0), 4.0);
        assert_eq!(p.str("operation", ""), "addition");
    }

    #[test]
    fn absent_line_state_keeps_defaults() {
        let p = DrawParams::merge(&defaults(), None);
        assert_eq!(p.f64("num1", 0.0), 5.0);
        assert!(p.show("anything"));
        assert_eq!(p.show_count("group1", 6), 6);
    }

    #[test]
    fn show_and_highlight_come_from_line_state() {
        let state = LineState {
            show: BTreeMap::from([
                ("group1".to_string(), ShowFlag::Count(2)),
                ("formula".to_string(), ShowFlag::Bool(false)),
            ]),
            highlight: vec!["group1".to_string()],
            annotation: Some(Annotation {
                text: "加法 = 合并".to_string(),
                position: AnnotationPosition::Top,
                target: None,
            }),
            ..LineState::default()
        };
        let p = DrawParams::merge(&defaults(), Some(&state));
        assert_eq!(p.show_count("group1", 6), 2);
        assert!(!p.show("formula"));
        assert!(p.is_highlighted("group1"));
        assert!(!p.is_highlighted("group2"));
        assert_eq!(p.annotation().unwrap().text, "加法 = 合并");
    }

    #[test]
    fn typed_accessors_fall_back_on_bad_values() {
        let state = LineState {
            params: BTreeMap::from([("num1".to_string(), serde_json::json!("oops"))]),
            ..LineState::default()
        };
        let p = DrawParams::merge(&BTreeMap::new(), Some(&state));
        assert_eq!(p.f64("num1", 1.5), 1.5);
        assert_eq!(p.i64("missing", 9), 9);
        assert!(p.bool("missing", true));
    }
}
