use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use native_weaver::pipeline::{self, FileOutcome};
use native_weaver::project::{
    install_headers, BuildInfo, Config, FixedSource, InstallOutcome, ProjectLayout, SourceLocator,
};
use native_weaver::Conventions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "native-weaver")]
#[command(about = "Weave native fragments and type hints into generated C++", long_about = None)]
#[command(version)]
struct Cli {
    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Configuration file
    #[arg(long, default_value = "config.json", global = true)]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy native files into the build tree, then weave every generated file
    Run {
        /// Do not ask before copying
        #[arg(short, long)]
        yes: bool,
    },
    /// Like `run`, then keep re-weaving files as the generator rewrites them
    Watch {
        #[arg(short, long)]
        yes: bool,
    },
    /// Weave a directory of generated files without a build descriptor
    Weave {
        /// Directory with the generated files
        #[arg(long)]
        generated: PathBuf,
        /// Project directory with the script sources
        #[arg(long)]
        project: PathBuf,
    },
    /// Process a single generated file
    File {
        file: PathBuf,
        /// Script source to read annotations from
        #[arg(long, conflicts_with = "project")]
        source: Option<PathBuf>,
        /// Project directory to locate the script source in
        #[arg(long)]
        project: Option<PathBuf>,
    },
    /// Only copy native files into the build tree
    Install {
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("failed to install interrupt handler")?;
    }

    match cli.command {
        Commands::Run { yes } => {
            let (config, build) = load_project(&cli.config)?;
            install(&config, &build, yes)?;
            weave_build(&config, &build, &stop)?;
        }
        Commands::Watch { yes } => {
            let (config, build) = load_project(&cli.config)?;
            install(&config, &build, yes)?;
            weave_build(&config, &build, &stop)?;
            if !stop.load(Ordering::SeqCst) {
                let layout = ProjectLayout::new(&build.project_dir, &config.conventions);
                pipeline::watch(&build.scripts_dir(), &layout, &config.conventions, &stop)
                    .context("file watcher failed")?;
            }
        }
        Commands::Weave { generated, project } => {
            let conv = conventions_only(&cli.config)?;
            let layout = ProjectLayout::new(project, &conv);
            pipeline::run_batch(&generated, &layout, &conv, &stop)
                .with_context(|| format!("failed to list {}", generated.display()))?;
        }
        Commands::File {
            file,
            source,
            project,
        } => {
            let conv = conventions_only(&cli.config)?;
            let locator: Box<dyn SourceLocator> = match (source, project) {
                (Some(source), _) => Box::new(FixedSource(source)),
                (None, Some(project)) => Box::new(ProjectLayout::new(project, &conv)),
                (None, None) => bail!("either --source or --project is required"),
            };
            match pipeline::process_file(&file, locator.as_ref(), &conv) {
                FileOutcome::Failed(e) => bail!("{}: {}", file.display(), e),
                outcome => info!("{}: {}", file.display(), outcome.status()),
            }
        }
        Commands::Install { yes } => {
            let (config, build) = load_project(&cli.config)?;
            install(&config, &build, yes)?;
        }
    }

    Ok(())
}

fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(formatter)
        .with(filter)
        .init();
}

/// Conventions from the config file when there is one, defaults otherwise.
fn conventions_only(path: &Path) -> Result<Conventions> {
    if !path.exists() {
        return Ok(Conventions::default());
    }
    let config = Config::load(path)?;
    Ok(config.conventions)
}

fn load_project(config_path: &Path) -> Result<(Config, BuildInfo)> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let config = Config::load_or_prompt(config_path, &mut input, &mut output)?;

    let bff = config
        .build_bff
        .clone()
        .context("config has no build_bff path")?;
    let build = BuildInfo::load(&bff).context("could not load build.bff")?;
    info!("Loaded build.bff");
    info!("Project: {}", build.project_name);
    info!("Config: {}", build.config);
    info!("Source directory: {}", build.source_dir(config.cpp_dir()).display());
    info!("Target directory: {}", build.scripts_dir().display());
    Ok((config, build))
}

fn install(config: &Config, build: &BuildInfo, yes: bool) -> Result<()> {
    let src = build.source_dir(config.cpp_dir());
    let dest = build.scripts_dir();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    match install_headers(&src, &dest, yes, &mut input, &mut output)
        .with_context(|| format!("failed to copy files into {}", dest.display()))?
    {
        InstallOutcome::Cancelled => warn!("Copying canceled"),
        InstallOutcome::NothingToCopy => {}
        InstallOutcome::Copied(n) => info!("Copied {} file(s)", n),
    }
    Ok(())
}

fn weave_build(config: &Config, build: &BuildInfo, stop: &AtomicBool) -> Result<()> {
    let conv = &config.conventions;
    let layout = ProjectLayout::new(&build.project_dir, conv);
    let dir = build.scripts_dir();
    let summary = pipeline::run_batch(&dir, &layout, conv, stop)
        .with_context(|| format!("failed to list {}", dir.display()))?;
    if summary.failed > 0 {
        warn!("{} file(s) could not be processed", summary.failed);
    }
    Ok(())
}
