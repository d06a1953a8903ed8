use anyhow::Context;
use clap::{ArgAction, Args, ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand};
use framescan::config::ScanConfig;
use framescan::render::{RenderStyle, render_report};
use framescan::schema::{Frame, ScanReport};
use framescan::source::JsonLinesSource;
use framescan::terminal::TerminalCaps;
use framescan::{AbandonPolicy, ScanEngine, SessionMode};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "framescan",
    about = "Aggregate barcode detections across camera frames",
    arg_required_else_help = true
)]
struct Cli {
    /// Disable color
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    /// Log more to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded detection frames through a scan session
    Replay(ReplayArgs),
    /// Print the JSON schema of the report (or of an input frame)
    Schema(SchemaArgs),
}

#[derive(Args, Clone)]
struct ReplayArgs {
    /// JSON-lines file of frames; stdin when omitted or `-`
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output the report as JSON
    #[arg(long)]
    json: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Consecutive frames without a new code that end the session
    #[arg(long, value_name = "FRAMES", value_parser = clap::value_parser!(u32).range(1..))]
    quiet_threshold: Option<u32>,

    /// Stop at the first frame that contains a code
    #[arg(long)]
    single: bool,

    /// Report partial results when the input ends before the session completes
    #[arg(long)]
    surface_partial: bool,

    /// Project overlays onto a display of this size, e.g. 1080x1920
    #[arg(long, value_name = "WxH", value_parser = parse_display)]
    display: Option<(u32, u32)>,
}

#[derive(Args, Clone)]
struct SchemaArgs {
    /// Print the schema of one input frame record instead
    #[arg(long)]
    input: bool,
}

fn parse_display(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let parse = |v: &str| -> Result<u32, String> {
        match v.trim().parse::<u32>() {
            Ok(0) | Err(_) => Err(format!("invalid display dimension `{v}`")),
            Ok(n) => Ok(n),
        }
    };
    Ok((parse(w)?, parse(h)?))
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    match path {
        None => Ok(Box::new(io::stdin().lock())),
        Some(p) if p == Path::new("-") => Ok(Box::new(io::stdin().lock())),
        Some(p) => {
            let file =
                File::open(p).with_context(|| format!("could not open input `{}`", p.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

fn resolve_config(args: &ReplayArgs) -> Result<ScanConfig, i32> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::load_from(path).map_err(|e| {
            eprintln!("Error: {e}");
            2
        })?,
        None => ScanConfig::load(),
    };

    if let Some(threshold) = args.quiet_threshold {
        config.session.quiet_threshold = threshold;
    }
    if args.single {
        config.session.mode = SessionMode::Single;
    }
    if args.surface_partial {
        config.session.on_abandon = AbandonPolicy::Surface;
    }
    if let Some((width, height)) = args.display {
        config.overlay.display_width = Some(width);
        config.overlay.display_height = Some(height);
    }
    Ok(config)
}

fn run_replay(args: ReplayArgs, color: ColorChoice) -> Result<(), i32> {
    let config = resolve_config(&args)?;

    let reader = match open_input(args.input.as_deref()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return Err(2);
        }
    };
    let mut source = JsonLinesSource::new(reader);

    let mut engine = ScanEngine::new(config.aggregator()).abandon_policy(config.session.on_abandon);
    if let Some((width, height)) = config.overlay.display() {
        engine = engine.project_onto(width, height);
    }

    let report = match engine.run(&mut source) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return Err(2);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(_) => return Err(3),
        }
    } else {
        let caps = if matches!(color, ColorChoice::Never) {
            TerminalCaps::plain()
        } else {
            TerminalCaps::detect()
        };
        let style = RenderStyle {
            color: caps.color() && config.output.color,
            hyperlinks: caps.hyperlinks() && config.output.hyperlinks,
        };
        println!("{}", render_report(&report, style));
    }

    if report.is_completed() { Ok(()) } else { Err(1) }
}

fn run_schema(args: SchemaArgs) -> Result<(), i32> {
    let schema = if args.input {
        schemars::schema_for!(Frame)
    } else {
        schemars::schema_for!(ScanReport)
    };
    match serde_json::to_string_pretty(&schema) {
        Ok(s) => println!("{}", s),
        Err(_) => return Err(3),
    }
    Ok(())
}

fn detect_color_choice() -> ColorChoice {
    // Scan args before clap so help/errors honor `--no-color`.
    let mut args = std::env::args_os();
    args.next();
    let mut flag = false;
    for arg in args {
        if arg == "--" {
            break;
        }
        if arg == "--no-color" {
            flag = true;
            break;
        }
    }
    if flag || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let color = detect_color_choice();
    let matches = Cli::command().color(color).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Replay(args)) => run_replay(args, color),
        Some(Commands::Schema(args)) => run_schema(args),
        None => Ok(()),
    };
    if let Err(code) = result {
        std::process::exit(code);
    }
}
