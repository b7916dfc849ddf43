use subscroll::driver::{Frame, FrameTicker, ScrollDriver, ScrollSample};
use subscroll::lint;
use subscroll::processor::{self, ProcessOpts};
use subscroll::serialiser;
use subscroll::stage::{attach_subtitles, attach_timeline, SubtitleView};
use subscroll::sync::ManualClock;
use subscroll::timeline::ScrollTimeline;
use subscroll::{parser, StageConfig, SubtitleTrack, TransformResolver, Viewport};

use std::cell::RefCell;
use std::io::{self, Read};
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser as ClapParser, Subcommand, ValueEnum};
use tracing::Level;

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Synchronise bilingual subtitles and resolve scroll transforms")]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "TOML file with lead time, scale bounds, breakpoints and animation lengths."
    )]
    config: Option<String>,
    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Log more detail to standard error. Repeat for per-sample tracing."
    )]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a simulated video clock and print every active-subtitle change.
    Simulate {
        #[arg(
            short,
            long,
            value_name = "FILE",
            help = "SRT or JSON subtitles, '-' for standard input. Defaults to the built-in scene."
        )]
        input: Option<String>,
        #[arg(long, default_value_t = 60.0, help = "Frames sampled per second.")]
        fps: f64,
        #[arg(
            long,
            value_name = "SECONDS",
            help = "How long to play. Defaults to the end of the last subtitle plus one second."
        )]
        duration: Option<f64>,
        #[arg(
            long,
            value_name = "SECONDS",
            help = "Restart the video at this time, like a looping hero clip."
        )]
        loop_at: Option<f64>,
    },
    /// Print the end transform of the pinned phone for each viewport width.
    Transform {
        #[arg(short, long = "width", required = true, help = "Viewport width in pixels.")]
        widths: Vec<u32>,
        #[arg(long, default_value_t = 800, help = "Viewport height in pixels.")]
        height: u32,
        #[arg(long, help = "Measured width of the reference element in pixels.")]
        base_width: f64,
        #[arg(long, help = "Print JSON instead of text.")]
        json: bool,
    },
    /// Scrub the pinned hero timeline from top to bottom and print each step.
    Scrub {
        #[arg(short, long, help = "Viewport width in pixels.")]
        width: u32,
        #[arg(long, default_value_t = 800, help = "Viewport height in pixels.")]
        height: u32,
        #[arg(long, help = "Measured width of the reference element in pixels.")]
        base_width: f64,
        #[arg(long, default_value_t = 12, help = "Number of scroll steps to print.")]
        steps: u32,
    },
    /// Write a subtitle track back out as SRT or JSON.
    Export {
        #[arg(short, long, value_name = "FILE")]
        input: Option<String>,
        #[arg(
            short,
            long,
            value_name = "FILE",
            default_value = "-",
            help = "The file to write to. If not supplied, the subtitles will be written to standard output."
        )]
        output: String,
        #[arg(long, value_enum, default_value_t = Format::Srt)]
        format: Format,
        #[arg(long, help = "Renumber subtitle ids from 1.")]
        renumber: bool,
    },
    /// Check a subtitle track and the configuration for authoring mistakes.
    Lint {
        #[arg(short, long, value_name = "FILE")]
        input: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Srt,
    Json,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => StageConfig::load(path)
            .with_context(|| format!("Failed to load config file: '{}'", path))?,
        None => StageConfig::default(),
    };

    match cli.command {
        Command::Simulate {
            input,
            fps,
            duration,
            loop_at,
        } => {
            let track = load_track(input.as_deref(), &ProcessOpts::default())?;
            simulate(track, &config, fps, duration, loop_at)
        }
        Command::Transform {
            widths,
            height,
            base_width,
            json,
        } => transform(&config, &widths, height, base_width, json),
        Command::Scrub {
            width,
            height,
            base_width,
            steps,
        } => scrub(&config, Viewport::new(width, height), base_width, steps),
        Command::Export {
            input,
            output,
            format,
            renumber,
        } => {
            let opts = ProcessOpts {
                renumber,
                ..ProcessOpts::default()
            };
            let track = load_track(input.as_deref(), &opts)?;
            export(&track, &output, format)
        }
        Command::Lint { input } => {
            let track = load_track(input.as_deref(), &ProcessOpts::default())?;
            let mut findings = lint::lint_track(&track, config.lead_time);
            findings.extend(lint::lint_config(&config));
            for finding in &findings {
                println!("{}", finding);
            }
            if findings.is_empty() {
                Ok(())
            } else {
                Err(anyhow!("{} authoring problem(s) found", findings.len()))
            }
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn load_track(input: Option<&str>, opts: &ProcessOpts) -> Result<SubtitleTrack> {
    let path = match input {
        Some(path) => path,
        None => return Ok(SubtitleTrack::sample()),
    };

    let data = if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open input file: '{}'", path))?
    };

    let track = if path.ends_with(".json") || SubtitleTrack::looks_like_json(&data) {
        SubtitleTrack::from_json(&data)
            .with_context(|| format!("Failed to parse JSON subtitles: '{}'", path))?
    } else {
        let cues = parser::parse(&data)
            .with_context(|| format!("Failed to parse SRT file: '{}'", path))?;
        processor::process(cues, opts)?
    };

    if track.is_empty() {
        return Err(anyhow!("You appear to have supplied an empty file."));
    }
    Ok(track)
}

fn simulate(
    track: SubtitleTrack,
    config: &StageConfig,
    fps: f64,
    duration: Option<f64>,
    loop_at: Option<f64>,
) -> Result<()> {
    let duration = duration.unwrap_or_else(|| track.duration() + 1.0);
    let frames = frame_count(duration, fps)?;
    let delta = 1.0 / fps;

    let ticker = FrameTicker::new();
    let clock = Rc::new(ManualClock::detached());
    let view = Rc::new(RefCell::new(SubtitleView::new(track, config.lead_time)));

    let _subscription = attach_subtitles(&ticker, view, Rc::clone(&clock), |change| {
        match &change.current {
            Some(sub) => println!(
                "{:>9.3}  #{}  {} / {}",
                change.time, sub.id, sub.original_text, sub.translated_text
            ),
            None => println!("{:>9.3}  -", change.time),
        }
    });

    for frame in 0..=frames {
        let time = frame as f64 * delta;
        let video_time = match loop_at {
            Some(length) if length > 0.0 => time % length,
            _ => time,
        };
        clock.set(video_time);
        ticker.emit(&Frame { time, delta });
    }
    Ok(())
}

/// Frames needed to cover `duration` seconds at `fps`, the last one partial.
fn frame_count(duration: f64, fps: f64) -> Result<u64> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(anyhow!("--fps must be a positive number"));
    }
    if !(duration.is_finite() && duration >= 0.0) {
        return Err(anyhow!("--duration must be a non-negative number of seconds"));
    }
    Ok((duration * fps).ceil() as u64)
}

fn transform(
    config: &StageConfig,
    widths: &[u32],
    height: u32,
    base_width: f64,
    json: bool,
) -> Result<()> {
    let resolver = TransformResolver::new(config.clone());

    if json {
        let rows: Vec<serde_json::Value> = widths
            .iter()
            .map(|&width| {
                let viewport = Viewport::new(width, height);
                match resolver.resolve_traced(viewport, base_width) {
                    Some(trace) => serde_json::json!({ "viewport": viewport, "trace": trace }),
                    None => serde_json::json!({
                        "viewport": viewport,
                        "result": resolver.fallback(),
                    }),
                }
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for &width in widths {
        let viewport = Viewport::new(width, height);
        match resolver.resolve_traced(viewport, base_width) {
            Some(trace) => println!(
                "{:>5}x{:<5} {:<2} {:<7} scale {:.4}  offset {:.2}",
                width,
                height,
                trace.breakpoint.name(),
                if trace.is_mobile { "mobile" } else { "desktop" },
                trace.result.scale,
                trace.result.vertical_offset
            ),
            None => {
                let result = resolver.fallback();
                println!(
                    "{:>5}x{:<5} unmeasured scale {:.4}  offset {:.2}",
                    width, height, result.scale, result.vertical_offset
                )
            }
        }
    }
    Ok(())
}

fn scrub(config: &StageConfig, viewport: Viewport, base_width: f64, steps: u32) -> Result<()> {
    if steps == 0 {
        return Err(anyhow!("--steps must be at least 1"));
    }
    let mut timeline = ScrollTimeline::new(TransformResolver::new(config.clone()));
    timeline.measure(base_width);

    let driver = ScrollDriver::new();
    let _subscription = attach_timeline(&driver, Rc::new(RefCell::new(timeline)), |frame| {
        println!(
            "text {:.3}  phone scale {:.4} y {:>8.2} brightness {:.3}  subtitles {:.3}",
            frame.hero_text_opacity,
            frame.phone.scale,
            frame.phone.y,
            frame.phone.brightness,
            frame.subtitle_opacity
        )
    });

    for step in 0..=steps {
        driver.emit(&ScrollSample {
            progress: f64::from(step) / f64::from(steps),
            viewport,
        });
    }
    Ok(())
}

fn export(track: &SubtitleTrack, output: &str, format: Format) -> Result<()> {
    let write = |dst: Box<dyn io::Write>| match format {
        Format::Srt => serialiser::serialise(track, dst),
        Format::Json => serialiser::serialise_json(track, dst),
    };

    if output == "-" {
        write(Box::new(io::stdout().lock()))?;
    } else {
        let file = std::fs::File::create(output)
            .with_context(|| format!("Failed to create output file: '{}'", output))?;
        write(Box::new(io::BufWriter::new(file)))
            .with_context(|| format!("Failed to write to output file: '{}'", output))?;
    }
    Ok(())
}
