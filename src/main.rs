use clap::{Parser, Subcommand};
use linkmirror::config::{self, SiteConfig};
use linkmirror::driver::{self, RunMode};
use linkmirror::fsys::{DryRunFs, LocalFs};
use linkmirror::output;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "linkmirror")]
#[command(about = "Mirror a directory tree as symlinks with an HTML index per directory")]
#[command(long_about = "\
Mirror a directory tree as symlinks with an HTML index per directory

Every directory under the source is recreated in the destination. Files
become symbolic links to the originals, symbolic links are mirrored, and
each directory gets an index page with a breadcrumb trail, links to its
sibling directories, and one entry per item.

  home/                      dist/home/
  ├── a.txt            →     ├── index.html
  ├── latest -> sub/b.txt    ├── a.txt -> /abs/home/a.txt
  └── sub/                   ├── latest -> /abs/home/sub/b.txt
      └── b.txt              └── sub/
                                 ├── index.html
                                 └── b.txt -> /abs/home/sub/b.txt

Entries that cannot be mirrored are listed as BROKEN in the index and the
log; the rest of the tree is still built.

Run 'linkmirror gen-config' to generate a documented linkmirror.toml.")]
#[command(version = env!("LINKMIRROR_VERSION"))]
struct Cli {
    /// Config file (default: ./linkmirror.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory to mirror
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Destination directory (deleted and recreated by build)
    #[arg(long, global = true)]
    destination: Option<PathBuf>,

    /// URL prefix the destination is served under
    #[arg(long, global = true)]
    web_root: Option<String>,

    /// File name of the generated index pages
    #[arg(long, global = true)]
    index_name: Option<String>,

    /// Show link targets and debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print failures and the summary
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clean the destination, stage assets, and build the mirror
    Build,
    /// Walk the source and print the log without writing anything
    Check,
    /// Print a stock linkmirror.toml with all options documented
    GenConfig,
}

impl Cli {
    /// Command-line flags as the topmost config layer.
    fn overlay(&self) -> Option<toml::Value> {
        let mut table = toml::Table::new();
        let path = |p: &PathBuf| toml::Value::String(p.to_string_lossy().into_owned());
        if let Some(source) = &self.source {
            table.insert("source".into(), path(source));
        }
        if let Some(destination) = &self.destination {
            table.insert("destination".into(), path(destination));
        }
        if let Some(web_root) = &self.web_root {
            table.insert("web_root".into(), toml::Value::String(web_root.clone()));
        }
        if let Some(index_name) = &self.index_name {
            table.insert("index_name".into(), toml::Value::String(index_name.clone()));
        }
        let verbosity = if self.verbose {
            Some("verbose")
        } else if self.quiet {
            Some("quiet")
        } else {
            None
        };
        if let Some(v) = verbosity {
            table.insert("verbosity".into(), toml::Value::String(v.into()));
        }
        (!table.is_empty()).then_some(toml::Value::Table(table))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(cli.config.as_deref(), cli.overlay())?;
    init_logging(&config);

    match cli.command {
        Command::Build => {
            println!(
                "==> Mirroring {} → {}",
                config.source.display(),
                config.destination.display()
            );
            let report = driver::run(&config, &LocalFs, RunMode::Build)?;
            if !report.staged_assets.is_empty() {
                println!("==> Staged {} assets", report.staged_assets.len());
            }
            output::print_walk_output(&report.root, config.verbosity);
            println!("==> Build complete: {}", config.destination.display());
        }
        Command::Check => {
            println!("==> Checking {}", config.source.display());
            let report = driver::run(&config, &DryRunFs, RunMode::DryRun)?;
            output::print_walk_output(&report.root, config.verbosity);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Route `log` records to stderr; `RUST_LOG` overrides the verbosity default.
fn init_logging(config: &SiteConfig) {
    env_logger::Builder::new()
        .filter_level(config.verbosity.log_filter())
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
