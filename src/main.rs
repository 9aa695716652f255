use clap::{Parser, Subcommand};
use docs_wiki::config::{self, PublishConfig};
use docs_wiki::git::{Git, SystemRunner, WikiRemote};
use docs_wiki::{output, publish, scan};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "docs-wiki")]
#[command(about = "Publish a documentation folder to a GitHub wiki")]
#[command(long_about = "\
Publish a documentation folder to a GitHub wiki

Every markdown file under the configured folders becomes a wiki page with a
flat, lower-case name. Links between pages are rewritten to wiki links, links
to other repository files point at the file browser, and a collapsible
_Sidebar.md mirrors the folder structure.

  docs/
  ├── Home.md                  → home.md
  ├── Getting_Started.md       → getting-started.md
  ├── _Footer.md               → copied as is
  └── guide/
      └── Setup Notes.md       → setup-notes.md

  [guide](guide/Setup%20Notes.md)  → [guide](/owner/repo/wiki/setup-notes)
  [code](../src/main.rs)           → [code](/owner/repo/blob/main/src/main.rs)

A _Sidebar.md found in the folders replaces the generated sidebar.

Run 'docs-wiki gen-config' to generate a documented docs-wiki.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "docs-wiki.toml", global = true)]
    config: PathBuf,

    /// Repository checkout the folders are relative to
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY", global = true)]
    repo: Option<String>,

    /// Branch used for links to repository files
    #[arg(long, global = true)]
    branch: Option<String>,

    /// Folders to publish, comma separated
    #[arg(long, global = true)]
    folders: Option<String>,

    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the pages that would be published
    Scan {
        /// Print the scanned tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the wiki into a local directory
    Render {
        /// Output directory
        #[arg(long, default_value = "wiki")]
        output: PathBuf,
    },
    /// Clone the wiki, render into it, commit and push
    Publish {
        /// Token used to push to the wiki
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    /// Print a stock docs-wiki.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Scan { json } => {
            let config = resolve_config(&cli)?;
            let tree = scan::scan_folders(&cli.root, &config.folders, &config.wiki_extensions)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                output::print_scan_output(&tree, &config.link_context());
            }
        }
        Command::Render { output: ref out_dir } => {
            let config = resolve_config(&cli)?;
            let tree = scan::scan_folders(&cli.root, &config.folders, &config.wiki_extensions)?;
            let report = publish::render(&tree, &cli.root, out_dir, &config)?;
            output::print_render_output(&report);
            println!("==> Rendered to {}", out_dir.display());
        }
        Command::Publish { ref token } => {
            let config = resolve_config(&cli)?;
            run_publish(&cli.root, &config, token.clone())?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Stock defaults, then the config file, then command-line flags.
fn resolve_config(cli: &Cli) -> Result<PublishConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(repo) = &cli.repo {
        config.repo = repo.clone();
    }
    if let Some(branch) = &cli.branch {
        config.branch = branch.clone();
    }
    if let Some(folders) = &cli.folders {
        config.folders = config::parse_list(folders);
    }
    config.normalize();
    config.validate()?;
    Ok(config)
}

fn run_publish(
    root: &Path,
    config: &PublishConfig,
    token: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let worktree = tempfile::Builder::new().prefix("docs-wiki-").tempdir()?;
    let git = Git::new(SystemRunner, worktree.path().join("wiki"));
    let remote = WikiRemote {
        host: config.host.clone(),
        repo: config.repo.clone(),
        token,
    };

    // The clone runs while the documentation is scanned; nothing is written
    // to the worktree until it has finished.
    let clear = config.clear_wiki;
    let cloning = std::thread::spawn(move || git.clone_wiki(&remote, clear).map(|()| git));

    println!("==> Scanning {}", config.folders.join(", "));
    let tree = scan::scan_folders(root, &config.folders, &config.wiki_extensions)?;

    let git = cloning.join().map_err(|_| "wiki clone thread panicked")??;

    println!("==> Rendering into {}", git.worktree().display());
    let report = publish::render(&tree, root, git.worktree(), config)?;
    output::print_render_output(&report);

    println!("==> Pushing to {}", config.repo);
    git.configure_identity(&config.git.email, &config.git.name)?;
    git.commit_and_push(&["."], &config.git.commit_message)?;
    println!("==> Published {} pages", report.pages.len());
    Ok(())
}
