use anyhow::{Context, Result};
use buildpipe::{
    agent::{BuildkiteAgentUploader, StdoutUploader},
    changes::GitChangedFiles,
    cli::{
        commands::{ExpandCommand, RunCommand, ValidateCommand},
        output::*,
        Cli, Command, Settings,
    },
    core::config::PipelineConfig,
    execution::{RunOutcome, Runner},
    expansion::{plan, Plan},
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { cli.settings.level() };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match cli.command.clone().unwrap_or_default() {
        Command::Run(cmd) => run_pipeline(&cmd, &cli.settings).await?,
        Command::Expand(cmd) => expand_pipeline(&cmd, &cli.settings)?,
        Command::Validate(cmd) => validate_pipeline(&cmd, &cli.settings)?,
    }

    Ok(())
}

fn load_config(settings: &Settings, explicit: Option<&std::path::Path>) -> Result<PipelineConfig> {
    let path = settings.template_path(explicit)?;
    PipelineConfig::from_file(&path)
        .with_context(|| format!("Failed to load pipeline template {}", path.display()))
}

async fn run_pipeline(cmd: &RunCommand, settings: &Settings) -> Result<()> {
    let config = load_config(settings, None)?;
    let changes = GitChangedFiles::new(settings.git_config());

    let outcome: RunOutcome = if cmd.dry_run {
        Runner::new(changes, StdoutUploader)
            .with_event_handler(|event| eprintln!("{}", format_run_event(event)))
            .run(&config)
            .await?
    } else {
        let uploader = BuildkiteAgentUploader::new(settings.agent_config());
        Runner::new(changes, uploader)
            .with_event_handler(|event| eprintln!("{}", format_run_event(event)))
            .run(&config)
            .await?
    };

    eprintln!("{}", format_outcome(&outcome));
    Ok(())
}

fn expand_pipeline(cmd: &ExpandCommand, settings: &Settings) -> Result<()> {
    let config = load_config(settings, cmd.file.as_deref())?;

    let pipeline = match plan(&config, &cmd.changed)? {
        Plan::NoChanges => {
            eprintln!("{}", format_outcome(&RunOutcome::NoChanges));
            return Ok(());
        }
        Plan::NoAffectedProjects => {
            eprintln!("{}", format_outcome(&RunOutcome::NoAffectedProjects));
            return Ok(());
        }
        Plan::Pipeline(pipeline) => pipeline,
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&pipeline)?);
    } else {
        print!("{}", pipeline.to_yaml()?);
    }
    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand, settings: &Settings) -> Result<()> {
    eprintln!("{} Validating pipeline template...", INFO);

    match load_config(settings, cmd.file.as_deref()) {
        Ok(config) => {
            eprintln!("{}", format_template_summary(&config));
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} Validation failed:", CROSS);
            eprintln!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}
