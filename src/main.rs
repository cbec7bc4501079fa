use remixer::{
    cli::Cli,
    config::RenderConfig,
    input::InputVideo,
    plan::Plan,
    runner::{Outcome, Runner},
};
use remixer_av::{check_tool_with_arg, Ffmpeg, ToolPaths};

use anyhow::Result;
use serde::Serialize;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Respect RUST_LOG env var if set, otherwise pick a level from the flags
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "remixer=debug,remixer_av=debug".to_string()
        } else if cli.quiet {
            "remixer=warn,remixer_av=warn".to_string()
        } else {
            "remixer=info,remixer_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if cli.check_tools {
        return check_tools(&cli);
    }

    let config = RenderConfig::from_cli(&cli)?;
    tracing::debug!("Config: {:?}", config);

    // A dry run only probes, so it does not need ffmpeg itself
    let paths = if config.dry {
        ToolPaths::resolve_for_probing(config.ffmpeg.as_deref(), config.ffprobe.as_deref())?
    } else {
        ToolPaths::resolve(config.ffmpeg.as_deref(), config.ffprobe.as_deref())?
    };
    let tool = Ffmpeg::new(paths).with_echo_output(!config.quiet_ffmpeg);

    let outcome = Runner::new(&tool, &config).run()?;

    if config.json {
        print_plan_json(config.seed, outcome.inputs(), outcome.plan())?;
    }

    match outcome {
        Outcome::DryRun { inputs, plan } => {
            if !config.json && !config.quiet {
                println!("Random seed: {}", config.seed);
                print!("{}", plan.describe(&inputs));
                println!("\n[DRY RUN] No video written");
            }
        }
        Outcome::Rendered { plan, output, .. } => {
            if !config.json && !config.quiet {
                println!(
                    "Wrote {} ({} samples, {:.3}s, seed {})",
                    output.display(),
                    plan.len(),
                    plan.total_duration(),
                    config.seed
                );
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct PlanReport<'a> {
    seed: u64,
    inputs: &'a [InputVideo],
    #[serde(flatten)]
    plan: &'a Plan,
}

fn print_plan_json(seed: u64, inputs: &[InputVideo], plan: &Plan) -> Result<()> {
    let report = PlanReport { seed, inputs, plan };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn check_tools(cli: &Cli) -> Result<()> {
    println!("Checking external tools...\n");

    let ffmpeg = cli
        .ffmpeg
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "ffmpeg".to_string());
    let ffprobe = cli
        .ffprobe
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "ffprobe".to_string());

    let tools = [
        check_tool_with_arg(&ffmpeg, "-version"),
        check_tool_with_arg(&ffprobe, "-version"),
    ];
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
        Ok(())
    } else {
        anyhow::bail!("Some tools are missing. Install ffmpeg or pass --ffmpeg/--ffprobe.")
    }
}
