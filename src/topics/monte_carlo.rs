use std::collections::BTreeMap;

use kurbo::{Point, Rect};
use rand::{Rng, SeedableRng, rngs::SmallRng};

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
    Ok(Box::new(MonteCarlo))
}

/// 蒙特卡罗方法 — estimating π by throwing seeded darts at a square.
struct MonteCarlo;

#[derive(Clone, Debug, PartialEq)]
enum Variant {
    Title { title: String, subtitle: String },
    Formula,
    Darts { animate: bool },
}

fn decode(line: &NarrationLineScene) -> Variant {
    match line.scene.kind {
        SceneType::Title | SceneType::Summary => {
            let (title, subtitle) = match line.scene.id.as_str() {
                "intro-title" => ("蒙特卡罗方法", "用随机回答确定的问题"),
                "summary-end" => ("感谢观看", "随机模拟的力量"),
                _ => ("蒙特卡罗方法", ""),
            };
            return Variant::Title {
                title: title.to_string(),
                subtitle: subtitle.to_string(),
            };
        }
        SceneType::Formula => return Variant::Formula,
        _ => {}
    }

    match line.section_id.as_str() {
        "intro" | "pi" | "darts" => Variant::Darts {
            animate: !line.scene.id.contains("static"),
        },
        _ => Variant::Darts { animate: true },
    }
}

impl TopicRenderer for MonteCarlo {
    fn topic(&self) -> &'static str {
        "monte-carlo"
    }

    fn defaults(&self) -> BTreeMap<String, serde_json::Value> {
        BTreeMap::from([("samples".to_string(), serde_json::json!(2000))])
    }

    fn select(&self, line: &NarrationLineScene) -> Selection {
        match decode(line) {
            Variant::Title { title, subtitle } => Selection::title(title, subtitle),
            Variant::Formula => Selection::formula(|_| "π ≈ 4 · 圆内点数 / 总点数".to_string()),
            Variant::Darts { animate } => {
                let scene = DartsScene;
                if animate {
                    // 25 new darts per tick until the sample cap.
                    Selection::animated(
                        "darts",
                        scene,
                        Advance::Saturate {
                            delta: 25.0,
                            max: 10_000.0,
                        },
                    )
                } else {
                    Selection::still("darts", scene).initial(2000.0)
                }
            }
        }
    }
}

struct DartsScene;

impl SceneDraw for DartsScene {
    fn draw(&self, surface: &mut Surface, params: &DrawParams) -> SceneResult<()> {
        surface.clear(Rgba8::BACKGROUND);
        let w = f64::from(surface.width());
        let h = f64::from(surface.height());
        let side = w.min(h) * 0.7;
        let origin = Point::new((w - side) / 2.0, (h - side) / 2.0);
        let center = Point::new(origin.x + side / 2.0, origin.y + side / 2.0);

        surface.fill_rect(
            Rect::new(origin.x, origin.y, origin.x + side, origin.y + side),
            Rgba8::opaque(51, 65, 85),
        );
        surface.stroke_circle(center, side / 2.0, 1.5, Rgba8::WHITE);

        let cap = params.i64("samples", 2000).clamp(0, 50_000) as usize;
        let n = (params.anim.max(0.0) as usize).min(cap.max(1) * 5);

        // Darts are a pure function of the seed; repaints never reshuffle.
        let mut rng = SmallRng::seed_from_u64(params.seed);
        let mut inside = 0usize;
        for _ in 0..n {
            let x: f64 = rng.gen_range(-1.0..1.0);
            let y: f64 = rng.gen_range(-1.0..1.0);
            let hit = x * x + y * y <= 1.0;
            if hit {
                inside += 1;
            }
            let p = Point::new(
                center.x + x * side / 2.0,
                center.y + y * side / 2.0,
            );
            surface.fill_circle(p, 1.2, if hit { Rgba8::GREEN } else { Rgba8::RED });
        }

        let estimate = if n == 0 {
            0.0
        } else {
            4.0 * inside as f64 / n as f64
        };
        surface.push_label(Label {
            text: format!("n = {n}   π ≈ {estimate:.4}"),
            pos: Point::new(w / 2.0, h * 0.94),
            size_px: 20.0,
            color: Rgba8::WHITE,
            id: Some("estimate".to_string()),
        });

        draw_annotation(surface, params);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Viewport;
    use crate::script::SceneConfig;

    fn darts_params(seed: u64, n: f64) -> DrawParams {
        DrawParams::merge(&MonteCarlo.defaults(), None)
            .with_seed(seed)
            .with_anim(n)
    }

    #[test]
    fn estimate_is_stable_for_a_fixed_seed() {
        let mut a = Surface::new(Viewport::default());
        let mut b = Surface::new(Viewport::default());
        DartsScene.draw(&mut a, &darts_params(9, 1500.0)).unwrap();
        DartsScene.draw(&mut b, &darts_params(9, 1500.0)).unwrap();
        assert_eq!(
            a.find_label("π ≈").unwrap().text,
            b.find_label("π ≈").unwrap().text
        );
    }

    #[test]
    fn estimate_lands_near_pi() {
        let mut s = Surface::new(Viewport::default());
        DartsScene.draw(&mut s, &darts_params(3, 2000.0)).unwrap();
        let text = &s.find_label("π ≈").unwrap().text;
        let value: f64 = text
            .rsplit(' ')
            .next()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0);
        assert!((value - std::f64::consts::PI).abs() < 0.25, "estimate {value}");
    }

    #[test]
    fn zero_samples_does_not_divide_by_zero() {
        let mut s = Surface::new(Viewport::default());
        DartsScene.draw(&mut s, &darts_params(1, 0.0)).unwrap();
        assert!(s.find_label("n = 0").is_some());
    }

    #[test]
    fn darts_section_animates() {
        let sel = MonteCarlo.select(&NarrationLineScene {
            line_id: "pi-1".to_string(),
            section_id: "pi".to_string(),
            scene: SceneConfig {
                id: "pi-throw".to_string(),
                kind: SceneType::Animation,
            },
            line_state: None,
        });
        assert_eq!(sel.label, "darts");
        assert!(sel.animate);
    }
}
