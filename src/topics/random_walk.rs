use std::collections::BTreeMap;

use kurbo::Point;
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
    Ok(Box::new(RandomWalk))
}

/// 随机游走 — a seeded 2-D walk rebuilt from scratch every frame.
///
/// The path is a pure function of `(seed, step count)`, so repainting the
/// same line never reshuffles the data.
struct RandomWalk;

#[derive(Clone, Debug, PartialEq)]
enum Variant {
    Title { title: String, subtitle: String },
    Formula,
    Walk { animate: bool },
}

fn decode(line: &NarrationLineScene) -> Variant {
    match line.scene.kind {
        SceneType::Title | SceneType::Summary => {
            let (title, subtitle) = match line.scene.id.as_str() {
                "intro-title" => ("随机游走", "醉汉的路径，确定的规律"),
                "summary-end" => ("感谢观看", "随机中的秩序"),
                _ => ("随机游走", ""),
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
        "intro" | "walk" | "distance" => Variant::Walk {
            animate: !line.scene.id.contains("frozen"),
        },
        _ => Variant::Walk { animate: true },
    }
}

impl TopicRenderer for RandomWalk {
    fn topic(&self) -> &'static str {
        "random-walk"
    }

    fn defaults(&self) -> BTreeMap<String, serde_json::Value> {
        BTreeMap::from([
            ("steps".to_string(), serde_json::json!(200)),
            ("stepLen".to_string(), serde_json::json!(6.0)),
        ])
    }

    fn select(&self, line: &NarrationLineScene) -> Selection {
        match decode(line) {
            Variant::Title { title, subtitle } => Selection::title(title, subtitle),
            Variant::Formula => Selection::formula(|p| {
                let n = p.i64("steps", 200);
                format!("E[d] ≈ √n = {:.1}", (n as f64).sqrt())
            }),
            Variant::Walk { animate } => {
                let scene = WalkScene;
                if animate {
                    // One step per tick; restart from zero after the cap.
                    Selection::animated(
                        "walk",
                        scene,
                        Advance::Cycle {
                            delta: 1.0,
                            max: 400.0,
                            restart: 0.0,
                        },
                    )
                } else {
                    Selection::still("walk", scene).initial(200.0)
                }
            }
        }
    }
}

struct WalkScene;

impl SceneDraw for WalkScene {
    fn draw(&self, surface: &mut Surface, params: &DrawParams) -> SceneResult<()> {
        surface.clear(Rgba8::BACKGROUND);
        let c = surface.viewport().center();
        let max_steps = params.i64("steps", 200).clamp(0, 10_000) as usize;
        let step_len = params.f64("stepLen", 6.0).clamp(1.0, 40.0);

        let walked = (params.anim.max(0.0) as usize).min(max_steps.max(1) * 2);

        // Regenerate the whole path from the seed: deterministic per line.
        let mut rng = SmallRng::seed_from_u64(params.seed);
        let mut pos = c;
        let mut path = Vec::with_capacity(walked + 1);
        path.push(pos);
        for _ in 0..walked {
            let theta: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            pos = Point::new(
                (pos.x + step_len * theta.cos()).clamp(0.0, f64::from(surface.width())),
                (pos.y + step_len * theta.sin()).clamp(0.0, f64::from(surface.height())),
            );
            path.push(pos);
        }

        surface.fill_circle(c, 4.0, Rgba8::GRID);
        surface.stroke_polyline(&path, 1.5, Rgba8::BLUE);
        if let Some(last) = path.last() {
            surface.fill_circle(*last, 5.0, Rgba8::AMBER);
            let dist = last.distance(c);
            surface.push_label(Label {
                text: format!("步数 {walked}   离原点 {dist:.0}"),
                pos: Point::new(c.x, f64::from(surface.height()) * 0.92),
                size_px: 20.0,
                color: Rgba8::WHITE,
                id: Some("readout".to_string()),
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
    use crate::script::SceneConfig;

    fn walk_params(seed: u64, steps: f64) -> DrawParams {
        DrawParams::merge(&RandomWalk.defaults(), None)
            .with_seed(seed)
            .with_anim(steps)
    }

    #[test]
    fn same_seed_paints_identical_frames() {
        let mut a = Surface::new(Viewport::default());
        let mut b = Surface::new(Viewport::default());
        WalkScene.draw(&mut a, &walk_params(42, 120.0)).unwrap();
        WalkScene.draw(&mut b, &walk_params(42, 120.0)).unwrap();
        for (x, y) in [(100, 100), (300, 200), (450, 350)] {
            assert_eq!(a.pixel(x, y), b.pixel(x, y));
        }
        assert_eq!(
            a.find_label("步数").map(|l| l.text.clone()),
            b.find_label("步数").map(|l| l.text.clone())
        );
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Surface::new(Viewport::default());
        let mut b = Surface::new(Viewport::default());
        WalkScene.draw(&mut a, &walk_params(1, 200.0)).unwrap();
        WalkScene.draw(&mut b, &walk_params(2, 200.0)).unwrap();
        assert_ne!(
            a.to_rgba_image().into_raw(),
            b.to_rgba_image().into_raw()
        );
    }

    #[test]
    fn zero_steps_stays_at_origin() {
        let mut s = Surface::new(Viewport::default());
        WalkScene.draw(&mut s, &walk_params(7, 0.0)).unwrap();
        assert!(s.find_label("步数 0").is_some());
    }

    #[test]
    fn walk_section_animates_by_default() {
        let sel = RandomWalk.select(&NarrationLineScene {
            line_id: "w-1".to_string(),
            section_id: "walk".to_string(),
            scene: SceneConfig {
                id: "walk-go".to_string(),
                kind: SceneType::Animation,
            },
            line_state: None,
        });
        assert_eq!(sel.label, "walk");
        assert!(sel.animate);
    }
}
