mod budget;
mod reports;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Duration;

use budget::{BatchSchedule, run_schedule};
use pullsim_engine::{
    BannerConfig, Estimator, Goal, GoalKind, SeedSequence, available_goal_kinds, preset_catalog,
};
use reports::EstimateReport;
use util::parse_percentiles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "pullsim", version)]
#[command(about = "Estimate how many pulls a gacha goal takes on a pity-ramp banner")]
struct Args {
    /// Banner as `r/b/g/c (focus%, offbanner%)`, e.g. "1/1/1/1 (5, 3)"
    #[arg(long, conflicts_with = "preset")]
    banner: Option<String>,

    /// Bundled banner preset (see --list-presets)
    #[arg(long)]
    preset: Option<String>,

    /// List bundled presets and the goals each supports, then exit
    #[arg(long)]
    list_presets: bool,

    /// Goal: "Any 5*", "Any Focus", or a color focus such as "Red Focus"
    #[arg(long, default_value = "any-fivestar")]
    goal: String,

    /// Matching pulls the goal needs
    #[arg(long, default_value_t = 1)]
    count: i64,

    /// Wall-clock budget for the doubling batches, in milliseconds
    #[arg(long, default_value_t = 500)]
    budget_ms: u64,

    /// Size of the first batch
    #[arg(long, default_value_t = 1024)]
    initial_batch: i64,

    /// Upper bound on the number of batches
    #[arg(long, default_value_t = 6)]
    max_rounds: u32,

    /// Root seed for reproducible runs (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Percentiles to report (comma-separated fractions or percents)
    #[arg(long, default_value = "0.25,0.5,0.75,0.9,0.99")]
    percentiles: String,

    /// Also emit a percentile curve with this many points
    #[arg(long)]
    curve_points: Option<usize>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if maybe_list_presets(&args)? {
        return Ok(());
    }

    let estimator = build_estimator(&args)?;
    let percentiles = parse_percentiles(&args.percentiles)?;
    let schedule = BatchSchedule::new(
        args.initial_batch,
        Duration::from_millis(args.budget_ms),
        args.max_rounds,
    )?;

    if args.report == ReportFormat::Console && args.output.is_none() {
        announce_banner();
    }

    let rounds = run_schedule(&estimator, &schedule)?;
    let report = EstimateReport::collect(&estimator, &percentiles, rounds, args.curve_points)?;
    write_report(&args, &report)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn maybe_list_presets(args: &Args) -> Result<bool> {
    if !args.list_presets {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available presets:")?;
    for preset in preset_catalog().presets() {
        let goals: Vec<&str> = available_goal_kinds(&preset.banner)
            .into_iter()
            .map(GoalKind::label)
            .collect();
        writeln!(
            output_target.writer(),
            "  {:12} {:18} {}",
            preset.key,
            preset.banner.to_string(),
            preset.name
        )?;
        writeln!(output_target.writer(), "  {:12} goals: {}", "", goals.join(", "))?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn resolve_banner(args: &Args) -> Result<BannerConfig> {
    if let Some(text) = args.banner.as_deref() {
        return text
            .parse()
            .with_context(|| format!("invalid --banner {text:?}"));
    }
    if let Some(name) = args.preset.as_deref() {
        return preset_catalog()
            .resolve(name)
            .with_context(|| format!("invalid --preset {name:?}"));
    }
    Ok(BannerConfig::default())
}

fn build_estimator(args: &Args) -> Result<Estimator> {
    let banner = resolve_banner(args)?;
    let kind: GoalKind = args
        .goal
        .parse()
        .with_context(|| format!("invalid --goal {:?}", args.goal))?;
    let goal = Goal::new(kind, args.count).context("invalid --count")?;
    let seed = args
        .seed
        .unwrap_or_else(|| SeedSequence::from_entropy().root());
    log::info!("estimating {goal} on {banner} with seed {seed:#x}");
    Estimator::with_scenario(banner, goal, seed)
        .with_context(|| format!("goal {goal} cannot be completed on banner {banner}"))
}

fn announce_banner() {
    println!("{}", "🎲 Pullsim Estimator".bright_cyan().bold());
    println!("{}", "====================".cyan());
}

fn write_report(args: &Args, report: &EstimateReport) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, report)?,
        ReportFormat::Markdown => reports::generate_markdown_report(&mut output_target, report)?,
        ReportFormat::Console => reports::generate_console_report(&mut output_target, report)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pullsim_engine::{Color, ColorCounts};

    fn base_args() -> Args {
        Args {
            banner: None,
            preset: None,
            list_presets: false,
            goal: "any-fivestar".to_string(),
            count: 1,
            budget_ms: 500,
            initial_batch: 64,
            max_rounds: 2,
            seed: Some(7),
            percentiles: "0.25,0.5,0.75,0.9,0.99".to_string(),
            curve_points: None,
            report: ReportFormat::Json,
            verbose: false,
            output: None,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "pullsim-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn resolves_banner_text_preset_and_default() {
        let from_text = resolve_banner(&Args {
            banner: Some("3/0/0/0 (4, 2)".to_string()),
            ..base_args()
        })
        .unwrap();
        assert_eq!(from_text.focus_counts, ColorCounts::new(3, 0, 0, 0));

        let from_preset = resolve_banner(&Args {
            preset: Some("legendary".to_string()),
            ..base_args()
        })
        .unwrap();
        assert_eq!(from_preset.to_string(), "3/3/3/3 (8, 0)");

        assert_eq!(resolve_banner(&base_args()).unwrap(), BannerConfig::default());
        assert!(
            resolve_banner(&Args {
                preset: Some("nope".to_string()),
                ..base_args()
            })
            .is_err()
        );
    }

    #[test]
    fn build_estimator_applies_goal_and_seed() {
        let estimator = build_estimator(&Args {
            banner: Some("2/0/1/0 (5, 3)".to_string()),
            goal: "Red Focus".to_string(),
            count: 2,
            ..base_args()
        })
        .unwrap();
        let scenario = estimator.scenario();
        assert_eq!(scenario.goal().kind, GoalKind::ColorFocus(Color::Red));
        assert_eq!(scenario.goal().count(), 2);
        assert_eq!(estimator.root_seed(), 7);
    }

    #[test]
    fn build_estimator_rejects_unreachable_goal() {
        let err = build_estimator(&Args {
            banner: Some("2/0/1/0 (5, 3)".to_string()),
            goal: "blue".to_string(),
            ..base_args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("cannot be completed"));
        assert!(
            build_estimator(&Args {
                count: 0,
                ..base_args()
            })
            .is_err()
        );
    }

    #[test]
    fn maybe_list_presets_writes_output() {
        let path = temp_path("presets");
        let args = Args {
            list_presets: true,
            output: Some(path.clone()),
            ..base_args()
        };
        assert!(maybe_list_presets(&args).unwrap());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Available presets"));
        assert!(content.contains("hero-fest"));
        assert!(content.contains("Red Focus"));
    }

    #[test]
    fn maybe_list_presets_returns_false_when_disabled() {
        assert!(!maybe_list_presets(&base_args()).unwrap());
    }

    #[test]
    fn write_report_emits_json_to_file() {
        let path = temp_path("json");
        let args = Args {
            output: Some(path.clone()),
            ..base_args()
        };
        let estimator = build_estimator(&args).unwrap();
        estimator.run_batch(200).unwrap();
        let report = EstimateReport::collect(&estimator, &[0.5], Vec::new(), None).unwrap();
        write_report(&args, &report).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["samples"], 200);
        assert_eq!(value["root_seed"], 7);
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        writeln!(target, "pullsim").unwrap();
        target.flush().unwrap();
    }
}
