use narrascene::{NarrationScript, Viewport, render_script};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let s = include_str!("../tests/data/arithmetic_script.json");
    let script: NarrationScript = serde_json::from_str(s)?;

    let frames = render_script(&script, Viewport::default(), 40)?;
    for frame in &frames {
        println!("{}:", frame.line_id);
        for label in frame.surface.labels() {
            println!("  {}", label.text);
        }
    }

    Ok(())
}
