use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lib::intent::{ApprovalGate, FixedApproval, KeywordClassifier};
use lib::pipeline::{PipelineCoordinator, RunOutcome};
use lib::skills::{select_skills, ScoringTable, SelectOptions, SkillCatalog};

#[derive(Parser)]
#[command(name = "maestro")]
#[command(about = "Maestro CLI — skill-aware multi-agent pipeline orchestrator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and default files (config, scoring table, bundled agents and starter skills).
    Init {
        /// Config file path (default: MAESTRO_CONFIG_PATH or ~/.maestro/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Classify a request, select skills per pipeline step, and run the pipeline.
    Run {
        /// The task request, free text (e.g. "fix the login bug").
        request: String,

        /// Config file path (default: MAESTRO_CONFIG_PATH or ~/.maestro/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Workspace root for run state and the session log (default from config or current dir).
        #[arg(long, short, value_name = "PATH")]
        workspace: Option<PathBuf>,

        /// Skip the approval prompt for flagged task categories.
        #[arg(long, short)]
        yes: bool,
    },

    /// Show coordinator status for a workspace (phase, active task, counts).
    Status {
        /// Config file path (default: MAESTRO_CONFIG_PATH or ~/.maestro/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Workspace root (default from config or current dir).
        #[arg(long, short, value_name = "PATH")]
        workspace: Option<PathBuf>,
    },

    /// List the skill catalog, or preview selection for a query/role.
    Skills {
        /// Config file path (default: MAESTRO_CONFIG_PATH or ~/.maestro/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Preview skill selection for this query instead of listing everything.
        #[arg(long, short)]
        query: Option<String>,

        /// Role id for affinity scoring (only with --query).
        #[arg(long, short)]
        role: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("maestro {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Init { config }) => run_init(config),
        Some(Commands::Run {
            request,
            config,
            workspace,
            yes,
        }) => run_pipeline(request, config, workspace, yes),
        Some(Commands::Status { config, workspace }) => run_status(config, workspace),
        Some(Commands::Skills {
            config,
            query,
            role,
        }) => run_skills(config, query, role),
        None => {
            println!("Run with --help for usage");
            Ok(())
        }
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

/// Load config and build a coordinator for the workspace.
fn build_coordinator(
    config_path: Option<PathBuf>,
    workspace: Option<PathBuf>,
) -> anyhow::Result<PipelineCoordinator> {
    let (config, path) = lib::config::load_config(config_path)?;
    lib::init::require_initialized(&path, &config)?;

    let scoring = ScoringTable::load(&lib::config::resolve_scoring_table(&config, &path));
    let catalog = SkillCatalog::load(
        &lib::config::resolve_skills_dir(&config, &path),
        &scoring.vocabulary,
    );
    let agents = lib::agents::AgentRegistry::load(&lib::config::resolve_agents_dir(&config, &path));
    let workspace = workspace.unwrap_or_else(|| lib::config::resolve_workspace_dir(&config));
    let options = SelectOptions {
        max_skills: config.pipeline.max_skills,
        min_score: config.pipeline.min_score,
    };

    PipelineCoordinator::new(&workspace, catalog, scoring, agents, options)
}

fn run_pipeline(
    request: String,
    config_path: Option<PathBuf>,
    workspace: Option<PathBuf>,
    yes: bool,
) -> anyhow::Result<()> {
    let mut coordinator = build_coordinator(config_path, workspace)?;

    let console = ConsoleApproval;
    let always = FixedApproval(true);
    let approval: &dyn ApprovalGate = if yes { &always } else { &console };

    match coordinator.process_request(&request, &KeywordClassifier, approval)? {
        RunOutcome::Completed(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                std::process::exit(2);
            }
        }
        RunOutcome::Cancelled { task } => {
            println!("cancelled: {}", task);
        }
    }
    Ok(())
}

fn run_status(config_path: Option<PathBuf>, workspace: Option<PathBuf>) -> anyhow::Result<()> {
    let coordinator = build_coordinator(config_path, workspace)?;
    println!("{}", serde_json::to_string_pretty(&coordinator.status())?);
    Ok(())
}

fn run_skills(
    config_path: Option<PathBuf>,
    query: Option<String>,
    role: Option<String>,
) -> anyhow::Result<()> {
    let (config, path) = lib::config::load_config(config_path)?;
    lib::init::require_initialized(&path, &config)?;

    let scoring = ScoringTable::load(&lib::config::resolve_scoring_table(&config, &path));
    let catalog = SkillCatalog::load(
        &lib::config::resolve_skills_dir(&config, &path),
        &scoring.vocabulary,
    );

    match query {
        Some(query) => {
            let options = SelectOptions {
                max_skills: config.pipeline.max_skills,
                min_score: config.pipeline.min_score,
            };
            let selected = select_skills(&catalog, &scoring, &query, role.as_deref(), options);
            if selected.is_empty() {
                println!("no skills over threshold for this query");
            }
            for (skill, score) in selected {
                println!("{:30} {:.2}", skill.name, score);
            }
        }
        None => {
            for skill in catalog.iter() {
                println!("{:30} {}", skill.name, skill.description);
            }
        }
    }
    Ok(())
}

/// Blocking console prompt: the pipeline stalls here until the user answers.
struct ConsoleApproval;

impl ApprovalGate for ConsoleApproval {
    fn confirm(&self, task: &str) -> bool {
        use std::io::{BufRead, Write};

        println!("This task requires approval before execution.");
        println!("  Task: {}", task);
        print!("Proceed? (y/n): ");
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let stdin = std::io::stdin();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() {
            return false;
        }
        line.trim().eq_ignore_ascii_case("y")
    }
}
