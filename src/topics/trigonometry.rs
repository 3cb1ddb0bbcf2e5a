use std::collections::BTreeMap;
use std::f64::consts::TAU;

use kurbo::Point;

use crate::{
    core::{Rgba8, map_range},
    dispatch::{Selection, TopicRenderer, draw_annotation},
    draw::{DrawParams, SceneDraw},
    driver::Advance,
    error::SceneResult,
    script::{NarrationLineScene, SceneType},
    surface::{Label, Surface},
};

pub(crate) fn renderer() -> SceneResult<Box<dyn TopicRenderer>> {
    Ok(Box::new(Trigonometry))
}

/// 三角函数 — unit circle and the sine wave traced from it.
struct Trigonometry;

#[derive(Clone, Debug, PartialEq)]
enum Variant {
    Title { title: String, subtitle: String },
    Application,
    Formula(FormulaKind),
    UnitCircle { animate: bool, show_tan: bool },
    SineTrace { animate: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FormulaKind {
    Pythagorean,
    DoubleAngle,
    Sum,
}

fn decode(line: &NarrationLineScene) -> Variant {
    let id = line.scene.id.as_str();

    match line.scene.kind {
        SceneType::Title | SceneType::Summary => {
            let (title, subtitle) = match id {
                "intro-title" => ("三角函数", "圆与波的语言"),
                "summary-end" => ("感谢观看", "三角函数无处不在"),
                _ => ("三角函数", ""),
            };
            return Variant::Title {
                title: title.to_string(),
                subtitle: subtitle.to_string(),
            };
        }
        SceneType::Application | SceneType::Illustration => return Variant::Application,
        SceneType::Formula => {
            let kind = if id.contains("pythagorean") {
                FormulaKind::Pythagorean
            } else if id.contains("double-angle") {
                FormulaKind::DoubleAngle
            } else {
                FormulaKind::Sum
            };
            return Variant::Formula(kind);
        }
        _ => {}
    }

    match line.section_id.as_str() {
        "intro" | "unit-circle" => Variant::UnitCircle {
            animate: !id.contains("definition"),
            show_tan: id.contains("tan"),
        },
        "sine-wave" | "waves" => Variant::SineTrace {
            animate: !id.contains("static"),
        },
        "identities" => Variant::UnitCircle {
            animate: false,
            show_tan: false,
        },
        _ => Variant::UnitCircle {
            animate: true,
            show_tan: false,
        },
    }
}

impl TopicRenderer for Trigonometry {
    fn topic(&self) -> &'static str {
        "trigonometry"
    }

    fn defaults(&self) -> BTreeMap<String, serde_json::Value> {
        BTreeMap::from([
            ("angle".to_string(), serde_json::json!(std::f64::consts::FRAC_PI_4)),
            ("amplitude".to_string(), serde_json::json!(1.0)),
            ("frequency".to_string(), serde_json::json!(1.0)),
        ])
    }

    fn select(&self, line: &NarrationLineScene) -> Selection {
        // Angle sweeps the circle, wrapping at 2π.
        let angle_advance = Advance::Wrap {
            delta: 0.02,
            period: TAU,
        };
        match decode(line) {
            Variant::Title { title, subtitle } => Selection::title(title, subtitle),
            Variant::Application => Selection::application("声波、潮汐与交流电中的正弦"),
            Variant::Formula(kind) => match kind {
                FormulaKind::Pythagorean => Selection::formula(|_| "sin²θ + cos²θ = 1".to_string()),
                FormulaKind::DoubleAngle => {
                    Selection::formula(|_| "sin 2θ = 2 sinθ cosθ".to_string())
                }
                FormulaKind::Sum => {
                    Selection::formula(|_| "sin(α+β) = sinα cosβ + cosα sinβ".to_string())
                }
            },
            Variant::UnitCircle { animate, show_tan } => {
                let scene = UnitCircleScene {
                    show_tan,
                    animated: animate,
                };
                if animate {
                    Selection::animated("unit-circle", scene, angle_advance)
                } else {
                    Selection::still("unit-circle", scene)
                }
            }
            Variant::SineTrace { animate } => {
                let scene = SineTraceScene;
                if animate {
                    Selection::animated("sine-trace", scene, angle_advance)
                } else {
                    Selection::still("sine-trace", scene)
                }
            }
        }
    }
}

struct UnitCircleScene {
    show_tan: bool,
    /// Whether the angle comes from the animation driver or the script param.
    animated: bool,
}

impl SceneDraw for UnitCircleScene {
    fn draw(&self, surface: &mut Surface, params: &DrawParams) -> SceneResult<()> {
        surface.clear(Rgba8::BACKGROUND);
        let c = surface.viewport().center();
        let radius = f64::from(surface.height().min(surface.width())) * 0.35;

        // Animated sweeps read the driver value verbatim, zero included;
        // static scenes pin the angle from the script.
        let angle = if self.animated {
            params.anim
        } else {
            params.f64("angle", std::f64::consts::FRAC_PI_4)
        };
        let (sin, cos) = angle.sin_cos();
        let tip = Point::new(c.x + radius * cos, c.y - radius * sin);

        // Axes and circle.
        surface.stroke_line(
            Point::new(c.x - radius * 1.2, c.y),
            Point::new(c.x + radius * 1.2, c.y),
            1.0,
            Rgba8::GRID,
        );
        surface.stroke_line(
            Point::new(c.x, c.y - radius * 1.2),
            Point::new(c.x, c.y + radius * 1.2),
            1.0,
            Rgba8::GRID,
        );
        surface.stroke_circle(c, radius, 2.0, Rgba8::WHITE);

        // Radius, sine (vertical) and cosine (horizontal) legs.
        surface.stroke_line(c, tip, 2.0, Rgba8::AMBER);
        surface.stroke_line(tip, Point::new(tip.x, c.y), 2.0, Rgba8::GREEN);
        surface.stroke_line(Point::new(tip.x, c.y), c, 2.0, Rgba8::BLUE);
        surface.fill_circle(tip, 5.0, Rgba8::WHITE);

        // tan is undefined near cos θ = 0; skip rather than draw off to
        // infinity; |cos| must clear 0.01 before the tangent leg draws.
        if self.show_tan && cos.abs() > 0.01 {
            let tan = sin / cos;
            let top = Point::new(
                c.x + radius * 1.2,
                c.y - radius * tan.clamp(-3.0, 3.0),
            );
            surface.stroke_line(Point::new(c.x + radius * 1.2, c.y), top, 2.0, Rgba8::RED);
        }

        surface.push_label(Label {
            text: format!("sin θ = {sin:.2}   cos θ = {cos:.2}"),
            pos: Point::new(c.x, f64::from(surface.height()) * 0.92),
            size_px: 20.0,
            color: Rgba8::WHITE,
            id: Some("readout".to_string()),
        });

        draw_annotation(surface, params);
        Ok(())
    }
}

struct SineTraceScene;

impl SceneDraw for SineTraceScene {
    fn draw(&self, surface: &mut Surface, params: &DrawParams) -> SceneResult<()> {
        surface.clear(Rgba8::BACKGROUND);
        let w = f64::from(surface.width());
        let h = f64::from(surface.height());
        let mid = h / 2.0;
        let phase = params.anim;
        let amplitude = params.f64("amplitude", 1.0).clamp(0.0, 2.0);
        let frequency = params.f64("frequency", 1.0).clamp(0.25, 8.0);

        surface.stroke_line(Point::new(0.0, mid), Point::new(w, mid), 1.0, Rgba8::GRID);

        let points: Vec<Point> = (0..surface.width())
            .filter_map(|x| {
                let fx = f64::from(x);
                let theta = fx / w * frequency * TAU + phase;
                let y = mid - amplitude * theta.sin() * h * 0.35;
                map_range(y, 0.0, h, 0.0, h).map(|cy| Point::new(fx, cy))
            })
            .collect();
        surface.stroke_polyline(&points, 2.0, Rgba8::BLUE);

        draw_annotation(surface, params);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Viewport;
    use crate::script::SceneConfig;

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

    #[test]
    fn formula_ids_pick_the_right_identity() {
        let sel = Trigonometry.select(&line("identities", "id-pythagorean", SceneType::Formula));
        assert_eq!(sel.label, "formula");
        let sel = Trigonometry.select(&line("identities", "id-double-angle", SceneType::Formula));
        assert_eq!(sel.label, "formula");
    }

    #[test]
    fn definition_scene_is_static() {
        let sel = Trigonometry.select(&line("unit-circle", "uc-definition", SceneType::Animation));
        assert_eq!(sel.label, "unit-circle");
        assert!(!sel.animate);
    }

    #[test]
    fn unknown_section_defaults_to_animated_circle() {
        let sel = Trigonometry.select(&line("nope", "nope", SceneType::Animation));
        assert_eq!(sel.label, "unit-circle");
        assert!(sel.animate);
    }

    #[test]
    fn unit_circle_readout_tracks_angle() {
        let mut s = Surface::new(Viewport::default());
        let scene = UnitCircleScene {
            show_tan: false,
            animated: true,
        };
        let p = DrawParams::merge(&Trigonometry.defaults(), None)
            .with_anim(std::f64::consts::FRAC_PI_2);
        scene.draw(&mut s, &p).unwrap();
        assert!(s.find_label("sin θ = 1.00").is_some());
    }

    #[test]
    fn animated_sweep_starts_at_zero_not_the_angle_param() {
        let mut s = Surface::new(Viewport::default());
        let scene = UnitCircleScene {
            show_tan: false,
            animated: true,
        };
        // First frame: driver value 0 must win over the π/4 default.
        let p = DrawParams::merge(&Trigonometry.defaults(), None);
        scene.draw(&mut s, &p).unwrap();
        assert!(s.find_label("sin θ = 0.00   cos θ = 1.00").is_some());
    }

    #[test]
    fn static_circle_pins_the_scripted_angle() {
        let mut s = Surface::new(Viewport::default());
        let scene = UnitCircleScene {
            show_tan: false,
            animated: false,
        };
        let p = DrawParams::merge(&Trigonometry.defaults(), None);
        scene.draw(&mut s, &p).unwrap();
        assert!(s.find_label("sin θ = 0.71").is_some());
    }

    #[test]
    fn tan_is_skipped_near_vertical() {
        let mut s = Surface::new(Viewport::default());
        let scene = UnitCircleScene {
            show_tan: true,
            animated: true,
        };
        // cos ≈ 0 here; the draw must not paint a runaway line or NaN.
        let p = DrawParams::merge(&Trigonometry.defaults(), None)
            .with_anim(std::f64::consts::FRAC_PI_2);
        scene.draw(&mut s, &p).unwrap();
        assert!(s.find_label("cos θ = 0.00").is_some());
    }
}
