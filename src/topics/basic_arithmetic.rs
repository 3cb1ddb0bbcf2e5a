use std::collections::BTreeMap;

use kurbo::{Point, Rect};

use crate::{
    core::Rgba8,
    dispatch::{Selection, TopicRenderer, draw_annotation},
    draw::{DrawParams, SceneDraw},
    driver::Advance,
    error::SceneResult,
    script::{NarrationLineScene, SceneType},
    surface::{Label, Surface},
};

pub(crate) fn renderer() -> SceneResult<Box<dyn TopicRenderer>> {
    Ok(Box::new(BasicArithmetic))
}

/// 加减乘除 — counting blocks, formulas and word problems.
struct BasicArithmetic;

#[derive(Clone, Debug, PartialEq)]
enum Variant {
    Title { title: String, subtitle: String },
    Application,
    Formula,
    /// Block diagram; `count_up` animates blocks appearing one by one.
    Blocks { count_up: bool },
}

/// String-id decoding happens here, once. Everything after this is typed.
fn decode(line: &NarrationLineScene) -> Variant {
    match line.scene.kind {
        SceneType::Title | SceneType::Summary => {
            let (title, subtitle) = match line.scene.id.as_str() {
                "intro-title" => ("加减乘除", "数学运算的起点"),
                "summary-end" => ("感谢观看", "继续探索数学"),
                _ => ("加减乘除", ""),
            };
            return Variant::Title {
                title: title.to_string(),
                subtitle: subtitle.to_string(),
            };
        }
        SceneType::Application | SceneType::Illustration => return Variant::Application,
        SceneType::Formula => return Variant::Formula,
        _ => {}
    }

    match line.section_id.as_str() {
        "intro" | "addition" | "subtraction" | "multiplication" | "division" => {
            if line.scene.id.contains("formula") {
                return Variant::Formula;
            }
            let count_up = line.scene.id.contains("count")
                || line
                    .line_state
                    .as_ref()
                    .and_then(|s| s.params.get("animate"))
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
            Variant::Blocks { count_up }
        }
        // Unknown section: default scene for the topic.
        _ => Variant::Blocks { count_up: false },
    }
}

impl TopicRenderer for BasicArithmetic {
    fn topic(&self) -> &'static str {
        "basic-arithmetic"
    }

    fn defaults(&self) -> BTreeMap<String, serde_json::Value> {
        BTreeMap::from([
            ("operation".to_string(), serde_json::json!("addition")),
            ("num1".to_string(), serde_json::json!(3)),
            ("num2".to_string(), serde_json::json!(2)),
        ])
    }

    fn select(&self, line: &NarrationLineScene) -> Selection {
        match decode(line) {
            Variant::Title { title, subtitle } => Selection::title(title, subtitle),
            Variant::Application => Selection::application("生活中的加减乘除"),
            Variant::Formula => Selection::formula(formula_text),
            Variant::Blocks { count_up } => {
                let scene = BlocksScene { count_up };
                if count_up {
                    Selection::animated(
                        "blocks-count",
                        scene,
                        Advance::Saturate {
                            delta: 1.0,
                            max: 40.0,
                        },
                    )
                } else {
                    Selection::still("blocks", scene)
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Op {
    fn from_params(p: &DrawParams) -> Self {
        match p.str("operation", "addition") {
            "subtraction" => Self::Subtraction,
            "multiplication" => Self::Multiplication,
            "division" => Self::Division,
            _ => Self::Addition,
        }
    }
}

/// Formula text exactly as the narration displays it. Division by zero shows
/// the fixed error message instead of a malformed equation. Operands share
/// the block diagram's 0..=20 range, which also keeps the sums and products
/// far from overflow.
fn formula_text(p: &DrawParams) -> String {
    let a = p.i64("num1", 0).clamp(0, 20);
    let b = p.i64("num2", 0).clamp(0, 20);
    match Op::from_params(p) {
        Op::Addition => format!("{a} + {b} = {}", a + b),
        Op::Subtraction => format!("{a} - {b} = {}", (a - b).max(0)),
        Op::Multiplication => format!("{a} × {b} = {}", a * b),
        Op::Division => {
            if b == 0 {
                return "除数不能为 0".to_string();
            }
            let q = a.div_euclid(b);
            let r = a.rem_euclid(b);
            if r > 0 {
                format!("{a} ÷ {b} = {q} ⋯ {r}")
            } else {
                format!("{a} ÷ {b} = {q}")
            }
        }
    }
}

struct BlocksScene {
    count_up: bool,
}

const BLOCK: f64 = 36.0;
const GAP: f64 = 10.0;
const PER_ROW: u32 = 5;

impl BlocksScene {
    fn draw_group(
        &self,
        surface: &mut Surface,
        origin: Point,
        count: u32,
        color: Rgba8,
        highlighted: bool,
    ) {
        for i in 0..count {
            let col = f64::from(i % PER_ROW);
            let row = f64::from(i / PER_ROW);
            let x = origin.x + col * (BLOCK + GAP);
            let y = origin.y + row * (BLOCK + GAP);
            let rect = Rect::new(x, y, x + BLOCK, y + BLOCK);
            surface.fill_rect(rect, color);
            if highlighted {
                surface.stroke_line(
                    Point::new(rect.x0, rect.y0),
                    Point::new(rect.x1, rect.y0),
                    2.0,
                    Rgba8::AMBER,
                );
                surface.stroke_line(
                    Point::new(rect.x0, rect.y1),
                    Point::new(rect.x1, rect.y1),
                    2.0,
                    Rgba8::AMBER,
                );
            }
        }
    }
}

impl SceneDraw for BlocksScene {
    fn draw(&self, surface: &mut Surface, params: &DrawParams) -> SceneResult<()> {
        surface.clear(Rgba8::BACKGROUND);

        let op = Op::from_params(params);
        let num1 = params.i64("num1", 3).clamp(0, 20) as u32;
        let num2 = params.i64("num2", 2).clamp(0, 20) as u32;

        if op == Op::Division && num2 == 0 {
            // Same guard as the formula card: message, not a broken diagram.
            surface.push_label(Label {
                text: "除数不能为 0".to_string(),
                pos: surface.viewport().center(),
                size_px: 32.0,
                color: Rgba8::RED,
                id: Some("formula".to_string()),
            });
            draw_annotation(surface, params);
            return Ok(());
        }

        let mut count1 = params.show_count("group1", num1);
        let mut count2 = params.show_count("group2", num2);
        if self.count_up {
            // Blocks appear one per tick, first group then second.
            let budget = params.anim.max(0.0) as u32;
            count1 = count1.min(budget);
            count2 = count2.min(budget.saturating_sub(count1));
        }

        let w = f64::from(surface.width());
        let h = f64::from(surface.height());
        self.draw_group(
            surface,
            Point::new(w * 0.12, h * 0.25),
            count1,
            Rgba8::BLUE,
            params.is_highlighted("group1"),
        );
        self.draw_group(
            surface,
            Point::new(w * 0.58, h * 0.25),
            count2,
            Rgba8::GREEN,
            params.is_highlighted("group2"),
        );

        if params.show("formula") {
            surface.push_label(Label {
                text: formula_text(params),
                pos: Point::new(w / 2.0, h * 0.78),
                size_px: 32.0,
                color: Rgba8::WHITE,
                id: Some("formula".to_string()),
            });
        }

        draw_annotation(surface, params);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Viewport;
    use crate::script::{LineState, SceneConfig, ShowFlag};

    fn line(section: &str, id: &str, kind: SceneType) -> NarrationLineScene {
        NarrationLineScene {
            line_id: format!("{section}-x"),
            section_id: section.to_string(),
            scene: SceneConfig {
                id: id.to_string(),
                kind,
            },
            line_state: None,
        }
    }

    fn params(pairs: &[(&str, serde_json::Value)]) -> DrawParams {
        let defaults = BasicArithmetic.defaults();
        let state = LineState {
            params: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            ..LineState::default()
        };
        DrawParams::merge(&defaults, Some(&state))
    }

    #[test]
    fn generic_types_win_over_section() {
        let sel = BasicArithmetic.select(&line("division", "div-title", SceneType::Title));
        assert_eq!(sel.label, "title");
        let sel = BasicArithmetic.select(&line("addition", "add-app", SceneType::Application));
        assert_eq!(sel.label, "application");
    }

    #[test]
    fn formula_id_substring_selects_formula_scene() {
        let sel = BasicArithmetic.select(&line("addition", "add-formula", SceneType::Animation));
        assert_eq!(sel.label, "formula");
    }

    #[test]
    fn unknown_section_falls_back_to_blocks() {
        let sel = BasicArithmetic.select(&line("mystery", "whatever", SceneType::Animation));
        assert_eq!(sel.label, "blocks");
        assert!(!sel.animate);
    }

    #[test]
    fn formula_text_matches_narration() {
        assert_eq!(
            formula_text(&params(&[
                ("num1", serde_json::json!(3)),
                ("num2", serde_json::json!(4)),
            ])),
            "3 + 4 = 7"
        );
        assert_eq!(
            formula_text(&params(&[
                ("operation", serde_json::json!("division")),
                ("num1", serde_json::json!(7)),
                ("num2", serde_json::json!(2)),
            ])),
            "7 ÷ 2 = 3 ⋯ 1"
        );
        assert_eq!(
            formula_text(&params(&[
                ("operation", serde_json::json!("division")),
                ("num1", serde_json::json!(7)),
                ("num2", serde_json::json!(0)),
            ])),
            "除数不能为 0"
        );
    }

    #[test]
    fn formula_clamps_oversized_operands() {
        // Script params are untrusted; huge values must render, not overflow.
        assert_eq!(
            formula_text(&params(&[
                ("num1", serde_json::json!(4_000_000_000_000i64)),
                ("num2", serde_json::json!(4_000_000_000_000i64)),
            ])),
            "20 + 20 = 40"
        );
        assert_eq!(
            formula_text(&params(&[
                ("operation", serde_json::json!("multiplication")),
                ("num1", serde_json::json!(i64::MAX)),
                ("num2", serde_json::json!(i64::MAX)),
            ])),
            "20 × 20 = 400"
        );
    }

    #[test]
    fn blocks_division_by_zero_paints_error_not_nan() {
        let mut s = Surface::new(Viewport::default());
        let scene = BlocksScene { count_up: false };
        let p = params(&[
            ("operation", serde_json::json!("division")),
            ("num2", serde_json::json!(0)),
        ]);
        scene.draw(&mut s, &p).unwrap();
        assert!(s.find_label("除数不能为 0").is_some());
    }

    #[test]
    fn show_counts_limit_visible_blocks() {
        let mut s = Surface::new(Viewport::new(600, 400));
        let scene = BlocksScene { count_up: false };
        let defaults = BasicArithmetic.defaults();
        let state = LineState {
            show: BTreeMap::from([
                ("group1".to_string(), ShowFlag::Count(0)),
                ("group2".to_string(), ShowFlag::Bool(false)),
                ("formula".to_string(), ShowFlag::Bool(true)),
            ]),
            ..LineState::default()
        };
        let p = DrawParams::merge(&defaults, Some(&state));
        scene.draw(&mut s, &p).unwrap();
        // No blocks: the group area stays background-colored.
        assert_eq!(s.pixel(90, 110), Some(Rgba8::BACKGROUND));
        // Formula still shown.
        assert!(s.find_label("3 + 2 = 5").is_some());
    }
}
