use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use ghsemver::{config, logging, ui, VersionQuery};

#[derive(Parser)]
#[command(
    name = "ghsemver",
    version,
    about = "Compute semantic versions from conventional commits, locally or via the GitHub API"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the latest version tag reachable from the branch
    Current(CommonArgs),
    /// Print the version the next release should carry
    Next {
        #[command(flatten)]
        common: CommonArgs,

        #[arg(short, long, help = "Prerelease identifier for non-main branches")]
        suffix: Option<String>,
    },
}

#[derive(Args)]
struct CommonArgs {
    #[arg(short, long, help = "Branch to version (defaults to the checked-out branch)")]
    branch: Option<String>,

    #[arg(short, long, help = "Main branch (defaults to the repository default)")]
    main_branch: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Print diagnostics to stderr")]
    log: bool,
}

impl CommonArgs {
    fn query(&self) -> VersionQuery {
        let mut query = VersionQuery::new();
        if let Some(branch) = &self.branch {
            query = query.with_branch(branch);
        }
        if let Some(main_branch) = &self.main_branch {
            query = query.with_main_branch(main_branch);
        }
        query
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        ui::display_error(&ui::format_error_chain(&e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let version = match cli.command {
        Command::Current(common) => {
            logging::init(common.log);
            let config = config::load_config(common.config.as_deref())
                .context("Failed to load configuration")?;
            ghsemver::current_version(&config, &common.query()).await?
        }
        Command::Next { common, suffix } => {
            logging::init(common.log);
            let config = config::load_config(common.config.as_deref())
                .context("Failed to load configuration")?;
            let mut query = common.query();
            if let Some(suffix) = suffix {
                query = query.with_prerelease_suffix(suffix);
            }
            ghsemver::next_version(&config, &query).await?
        }
    };

    ui::display_version(Some(version.as_str()).filter(|v| !v.is_empty()));
    Ok(())
}
