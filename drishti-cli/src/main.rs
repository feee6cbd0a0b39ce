// Drishti command line interface
// Replays scripted scenes through the guidance pipeline or runs it live

mod console;
mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use drishti_core::{Language, Millis};
use drishti_guide::{CycleReport, GuidancePipeline, GuidanceService, NarrationSettings, PipelineConfig};
use drishti_spk::{CustomNarrationEngine, EspeakEngine, NarrationConfig, NarrationEngine, Narrator};
use script::{Script, ScriptedScene};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "drishti")]
#[command(about = "Spoken obstacle guidance from object detections", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pipeline configuration file (TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted scene through the pipeline on a simulated clock
    Replay {
        /// Scene script (JSON)
        script: PathBuf,

        /// Narration language, overriding the config
        #[arg(long, short)]
        language: Option<Language>,

        #[arg(long, value_enum, default_value = "console")]
        engine: EngineKind,

        /// Pace ticks in real time instead of as fast as possible
        #[arg(long)]
        realtime: bool,

        /// Process detections without narrating
        #[arg(long)]
        muted: bool,
    },

    /// Loop a scripted scene through the live service with an interactive console
    Run {
        /// Scene script (JSON)
        script: PathBuf,

        /// Narration language, overriding the config
        #[arg(long, short)]
        language: Option<Language>,

        #[arg(long, value_enum, default_value = "console")]
        engine: EngineKind,
    },

    /// Validate a configuration file and print the effective settings
    CheckConfig {
        /// Configuration file (TOML)
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EngineKind {
    /// Print utterances to stdout, paced at the configured speech rate
    Console,
    /// Speak through espeak-ng
    Espeak,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Replay {
            script,
            language,
            engine,
            realtime,
            muted,
        } => {
            let config = load_config(cli.config.as_ref(), language)?;
            replay(config, &script, engine, realtime, muted).await?;
        }
        Commands::Run {
            script,
            language,
            engine,
        } => {
            let config = load_config(cli.config.as_ref(), language)?;
            run_live(config, &script, engine).await?;
        }
        Commands::CheckConfig { file } => {
            let config = PipelineConfig::load(&file).with_context(|| format!("Invalid config {}", file.display()))?;
            println!("Configuration OK: {}", file.display());
            println!("  refresh rate:       {} Hz ({} ms per tick)", config.refresh_hz, config.tick_interval_ms());
            println!("  inference interval: {} ms", config.vision.min_inference_interval_ms);
            println!("  language:           {}", config.language);
            println!("  debounce:           {} ms high / {} ms normal", config.policy.debounce_high_ms, config.policy.debounce_normal_ms);
            println!("  collision cooldown: {} ms", config.policy.collision_cooldown_ms);
            println!("  narration backlog:  {}", config.narration.max_pending);
        }
    }

    Ok(())
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level: {}", level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>, language: Option<Language>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::load(path).with_context(|| format!("Invalid config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(language) = language {
        config.language = language;
    }
    Ok(config)
}

fn build_engine(kind: EngineKind, config: &NarrationConfig) -> Arc<dyn NarrationEngine> {
    match kind {
        EngineKind::Console => {
            let rate = config.rate.max(1) as u64;
            Arc::new(CustomNarrationEngine::new(
                "console",
                move |text, language| {
                    println!("  [{}] {}", language.code(), text);
                    let words = text.split_whitespace().count() as u64;
                    Box::pin(async move {
                        tokio::time::sleep(Duration::from_millis(words * 60_000 / rate)).await;
                        Ok(())
                    })
                },
                |_| true,
            ))
        }
        EngineKind::Espeak => {
            let engine = EspeakEngine::new(config);
            if !engine.is_available() {
                warn!("espeak-ng unavailable, narration will fail");
            }
            Arc::new(engine)
        }
    }
}

fn build_pipeline(config: &PipelineConfig, scene: Arc<ScriptedScene>, engine: EngineKind) -> Result<GuidancePipeline> {
    let narrator = Narrator::new(build_engine(engine, &config.narration), config.narration.clone())?;
    let pipeline = GuidancePipeline::new(config, scene.clone(), scene, narrator)?;
    Ok(pipeline)
}

async fn replay(
    config: PipelineConfig,
    path: &PathBuf,
    engine: EngineKind,
    realtime: bool,
    muted: bool,
) -> Result<()> {
    let script = Script::load(path)?;
    let end_ms = script.duration_ms();
    let scene = ScriptedScene::manual(script);
    let mut pipeline = build_pipeline(&config, scene.clone(), engine)?;
    let tick_ms = config.tick_interval_ms();
    let settings = NarrationSettings {
        language: config.language,
        muted,
    };

    info!("Replaying {} ({} ms)", path.display(), end_ms);
    if config.announce_welcome && !muted {
        pipeline.welcome(config.language, |_| {});
    }

    let mut now_ms: Millis = 0;
    while now_ms <= end_ms {
        scene.set_time(now_ms);
        if let Some(report) = pipeline.tick(settings, now_ms).await {
            if report.inferred {
                println!("{}", describe_report(&report));
            }
        }
        if realtime {
            tokio::time::sleep(Duration::from_millis(tick_ms)).await;
        }
        now_ms += tick_ms;
    }

    pipeline.narrator().wait_idle().await;

    let stats = pipeline.sampler_stats();
    println!(
        "\n{} ticks, {} inferences, {} reused, {} not ready",
        stats.ticks, stats.inferences, stats.reuses, stats.not_ready
    );
    Ok(())
}

async fn run_live(config: PipelineConfig, path: &PathBuf, engine: EngineKind) -> Result<()> {
    let tick_ms = config.tick_interval_ms();
    let scene = ScriptedScene::looping(Script::load(path)?, tick_ms);
    let pipeline = build_pipeline(&config, scene, engine)?;

    let service = GuidanceService::new(pipeline, tick_ms, config.language, config.announce_welcome);
    service.start()?;

    let mut console = console::InteractiveConsole::new(service);
    console.run().await
}

/// One line per cycle plus one per object and announcement
pub(crate) fn describe_report(report: &CycleReport) -> String {
    let mut lines = vec![format!(
        "[{:>6} ms] {}{} | clear: {:?} (left {:.0}, right {:.0})",
        report.at_ms,
        report.mode,
        if report.low_light { ", low light" } else { "" },
        report.clearance.recommended,
        report.clearance.left_area,
        report.clearance.right_area,
    )];

    for overlay in &report.overlays {
        lines.push(format!(
            "    {} {:?} {:?} {:?}{}",
            overlay.display_label,
            overlay.zone,
            overlay.urgency,
            overlay.motion,
            if overlay.confirmed { "" } else { " (unconfirmed)" }
        ));
    }
    for announcement in &report.announcements {
        lines.push(format!(
            "    -> {:?}/{:?}: {}",
            announcement.kind, announcement.priority, announcement.text
        ));
    }
    lines.join("\n")
}
