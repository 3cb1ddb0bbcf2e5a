use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "narrascene", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a narration script without rendering.
    Validate(ValidateArgs),
    /// Render one narration line as a PNG.
    Frame(FrameArgs),
    /// Render every line of a script to a directory of PNGs.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input narration script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input narration script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Line index (0-based).
    #[arg(long)]
    line: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Animation ticks to advance before capturing (50 ms each).
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Print the structured text overlay of the rendered frame.
    #[arg(long)]
    dump_labels: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input narration script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory (one PNG per line, named by line id).
    #[arg(long)]
    out_dir: PathBuf,

    /// Animation ticks to advance before capturing each line (50 ms each).
    #[arg(long, default_value_t = 40)]
    ticks: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_script_json(path: &Path) -> anyhow::Result<narrascene::NarrationScript> {
    let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
    let r = BufReader::new(f);
    let script: narrascene::NarrationScript =
        serde_json::from_reader(r).with_context(|| "parse narration script JSON")?;
    Ok(script)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let script = read_script_json(&args.in_path)?;
    script.validate()?;
    let registered = narrascene::RendererFactory::is_registered(&script.topic);
    eprintln!(
        "ok: topic '{}' ({}), {} line(s)",
        script.topic,
        if registered { "registered" } else { "placeholder only" },
        script.lines.len(),
    );
    Ok(())
}

fn write_png(surface: &narrascene::Surface, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let image = surface.to_rgba_image();
    image::save_buffer_with_format(
        out,
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let script = read_script_json(&args.in_path)?;
    script.validate()?;

    let mut presenter = narrascene::Presenter::new(narrascene::Viewport::default(), false);
    presenter.show_script_line(&script, args.line)?;
    for _ in 0..args.ticks {
        presenter.tick()?;
    }
    let surface = presenter
        .surface()
        .context("no scene mounted after dispatch")?;

    if args.dump_labels {
        eprintln!("labels:");
        for label in surface.labels() {
            let id = label.id.as_deref().unwrap_or("-");
            eprintln!(
                "  [{id}] ({:.0}, {:.0}) {}",
                label.pos.x, label.pos.y, label.text
            );
        }
    }

    write_png(surface, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let script = read_script_json(&args.in_path)?;

    let frames =
        narrascene::render_script(&script, narrascene::Viewport::default(), args.ticks)?;
    for frame in &frames {
        let out = args.out_dir.join(format!("{}.png", frame.line_id));
        write_png(&frame.surface, &out)?;
    }

    eprintln!("wrote {} frame(s) to {}", frames.len(), args.out_dir.display());
    Ok(())
}
