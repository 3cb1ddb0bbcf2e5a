use std::collections::BTreeMap;

use kurbo::{CubicBez, ParamCurve, Point, QuadBez};

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
    Ok(Box::new(Bezier))
}

/// 贝塞尔曲线 — control points, De Casteljau construction, degrees.
struct Bezier;

#[derive(Clone, Debug, PartialEq)]
enum Variant {
    Title { title: String, subtitle: String },
    Application,
    Formula(FormulaKind),
    ControlPoints { degree: u8, animate: bool, interactive: bool },
    DeCasteljau { degree: u8, animate: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FormulaKind {
    Lerp,
    Bernstein,
    General,
}

fn animate_from_params(line: &NarrationLineScene) -> bool {
    line.line_state
        .as_ref()
        .and_then(|s| s.params.get("animate"))
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}

fn degree_from_id(id: &str, default: u8) -> u8 {
    if id.contains("linear") || id.ends_with("-1") {
        1
    } else if id.contains("quadratic") || id.ends_with("-2") {
        2
    } else if id.contains("cubic") || id.ends_with("-3") {
        3
    } else {
        default
    }
}

fn decode(line: &NarrationLineScene) -> Variant {
    let id = line.scene.id.as_str();

    match line.scene.kind {
        SceneType::Title | SceneType::Summary => {
            let (title, subtitle) = match id {
                "intro-welcome" => ("贝塞尔曲线", "计算机图形学的基石"),
                "summary-intro" => ("总结回顾", "贝塞尔曲线的核心思想"),
                "summary-end" => ("感谢观看", "探索曲线之美"),
                _ => ("贝塞尔曲线", ""),
            };
            return Variant::Title {
                title: title.to_string(),
                subtitle: subtitle.to_string(),
            };
        }
        SceneType::Application | SceneType::Illustration => return Variant::Application,
        SceneType::Formula => {
            let kind = if id.contains("lerp") {
                FormulaKind::Lerp
            } else if id.contains("bernstein") {
                FormulaKind::Bernstein
            } else {
                FormulaKind::General
            };
            return Variant::Formula(kind);
        }
        _ => {}
    }

    let animate = animate_from_params(line);
    match line.section_id.as_str() {
        "intro" => Variant::ControlPoints {
            degree: 3,
            animate: true,
            interactive: false,
        },
        "control-points" => Variant::ControlPoints {
            degree: 3,
            animate,
            interactive: id.contains("drag"),
        },
        "construction" => {
            if id.contains("algo") || id.contains("layer") || id.contains("decasteljau") {
                Variant::DeCasteljau { degree: 3, animate: true }
            } else {
                Variant::ControlPoints {
                    degree: 3,
                    animate: animate || id.contains("final") || id.contains("show"),
                    interactive: false,
                }
            }
        }
        "parameter-t" => Variant::ControlPoints {
            degree: 3,
            animate: animate || id.contains("range"),
            interactive: id.contains("slider"),
        },
        "linear" | "quadratic" | "cubic" | "degree" => Variant::ControlPoints {
            degree: degree_from_id(id, degree_from_section(line.section_id.as_str())),
            animate,
            interactive: false,
        },
        "decasteljau" => Variant::DeCasteljau {
            degree: degree_from_id(id, 3),
            animate: true,
        },
        // Default scene for the topic: the animated cubic.
        _ => Variant::ControlPoints {
            degree: 3,
            animate: true,
            interactive: false,
        },
    }
}

fn degree_from_section(section: &str) -> u8 {
    match section {
        "linear" => 1,
        "quadratic" => 2,
        _ => 3,
    }
}

impl TopicRenderer for Bezier {
    fn topic(&self) -> &'static str {
        "bezier"
    }

    fn defaults(&self) -> BTreeMap<String, serde_json::Value> {
        BTreeMap::from([("t".to_string(), serde_json::json!(0.35))])
    }

    fn select(&self, line: &NarrationLineScene) -> Selection {
        // t advances +0.01 per 50 ms tick, wrapping in [0,1).
        let t_advance = Advance::Wrap {
            delta: 0.01,
            period: 1.0,
        };
        match decode(line) {
            Variant::Title { title, subtitle } => Selection::title(title, subtitle),
            Variant::Application => Selection::application("字体轮廓与矢量图形中的贝塞尔曲线"),
            Variant::Formula(kind) => match kind {
                FormulaKind::Lerp => Selection::formula(lerp_formula),
                FormulaKind::Bernstein => Selection::formula(bernstein_formula),
                FormulaKind::General => Selection::formula(general_formula),
            },
            Variant::ControlPoints {
                degree,
                animate,
                interactive,
            } => {
                let scene = ControlPointsScene {
                    degree,
                    construction: false,
                    interactive,
                };
                let lbl = format!("control-points-{degree}");
                if animate {
                    Selection::animated(lbl, scene, t_advance)
                } else {
                    Selection::still(lbl, scene)
                }
            }
            Variant::DeCasteljau { degree, animate } => {
                let scene = ControlPointsScene {
                    degree,
                    construction: true,
                    interactive: false,
                };
                let lbl = format!("decasteljau-{degree}");
                if animate {
                    Selection::animated(lbl, scene, t_advance)
                } else {
                    Selection::still(lbl, scene)
                }
            }
        }
    }
}

fn lerp_formula(_p: &DrawParams) -> String {
    "B(t) = (1 - t) P₀ + t P₁".to_string()
}

fn bernstein_formula(_p: &DrawParams) -> String {
    "B(t) = Σ C(n,i) (1-t)ⁿ⁻ⁱ tⁱ Pᵢ".to_string()
}

fn general_formula(p: &DrawParams) -> String {
    format!("t = {:.2}", p.f64("t", 0.0))
}

/// Default control-point layout: evenly spaced in x, alternating above and
/// below the midline.
fn control_points(degree: u8, width: f64, height: f64) -> Vec<Point> {
    let padding = 80.0;
    let n = f64::from(degree);
    (0..=degree)
        .map(|i| {
            let fi = f64::from(i);
            let x = padding + (width - 2.0 * padding) * (fi / n);
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let y = height / 2.0 + (fi * std::f64::consts::PI / n).sin() * 80.0 * sign;
            Point::new(x, y)
        })
        .collect()
}

/// One De Casteljau reduction step.
fn reduce(points: &[Point], t: f64) -> Vec<Point> {
    points.windows(2).map(|w| w[0].lerp(w[1], t)).collect()
}

/// Point on the curve at `t`, via kurbo for the common degrees and plain
/// De Casteljau otherwise.
fn curve_point(points: &[Point], t: f64) -> Point {
    match points {
        [p0, p1] => p0.lerp(*p1, t),
        [p0, p1, p2] => QuadBez::new(*p0, *p1, *p2).eval(t),
        [p0, p1, p2, p3] => CubicBez::new(*p0, *p1, *p2, *p3).eval(t),
        _ => {
            let mut pts = points.to_vec();
            while pts.len() > 1 {
                pts = reduce(&pts, t);
            }
            pts.first().copied().unwrap_or(Point::ZERO)
        }
    }
}

struct ControlPointsScene {
    degree: u8,
    /// Draw the intermediate De Casteljau construction lines.
    construction: bool,
    interactive: bool,
}

impl SceneDraw for ControlPointsScene {
    fn draw(&self, surface: &mut Surface, params: &DrawParams) -> SceneResult<()> {
        surface.clear(Rgba8::BACKGROUND);
        let w = f64::from(surface.width());
        let h = f64::from(surface.height());
        let pts = control_points(self.degree, w, h);

        // Control polygon.
        if params.show("controlLines") {
            surface.stroke_polyline(&pts, 1.5, Rgba8::GRID);
        }

        // The curve itself.
        let samples: Vec<Point> = (0..=100)
            .map(|i| curve_point(&pts, f64::from(i) / 100.0))
            .collect();
        surface.stroke_polyline(&samples, 2.5, Rgba8::BLUE);

        // Control points on top.
        for (i, p) in pts.iter().enumerate() {
            let hl = params.is_highlighted(&format!("p{i}"));
            let color = if hl { Rgba8::AMBER } else { Rgba8::WHITE };
            surface.fill_circle(*p, if self.interactive { 7.0 } else { 5.0 }, color);
        }

        // Animated construction at the current t.
        let t = params.anim.clamp(0.0, 1.0);
        if t > 0.0 {
            if self.construction {
                let mut level = pts.clone();
                let palette = [Rgba8::GREEN, Rgba8::AMBER, Rgba8::RED];
                let mut depth = 0usize;
                while level.len() > 2 {
                    level = reduce(&level, t);
                    let color = palette[depth.min(palette.len() - 1)];
                    surface.stroke_polyline(&level, 1.5, color);
                    for p in &level {
                        surface.fill_circle(*p, 3.0, color);
                    }
                    depth += 1;
                }
            }
            surface.fill_circle(curve_point(&pts, t), 6.0, Rgba8::RED);
            surface.push_label(Label {
                text: format!("t = {t:.2}"),
                pos: Point::new(w * 0.88, h * 0.08),
                size_px: 18.0,
                color: Rgba8::WHITE,
                id: Some("t-readout".to_string()),
            });
        }

        draw_annotation(surface, params);
        Ok(())
    }
}
