//! otrkit CLI - inspect and extract OTR/O2R game asset archives.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use otrkit::prelude::*;
use otrkit::resource::{Envelope, HashResolver};

/// otrkit - OTR/O2R asset archive tool
#[derive(Parser)]
#[command(name = "otrkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where the archives come from.
#[derive(Args)]
struct Source {
    /// Archive to mount; repeat for patches (main first)
    #[arg(short, long = "archive", env = "OTRKIT_ARCHIVES", value_delimiter = ',')]
    archives: Vec<PathBuf>,

    /// JSON manager configuration, used instead of --archive
    #[arg(short, long, conflicts_with = "archives")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List files in the mounted archives
    List {
        #[command(flatten)]
        source: Source,

        /// Filter mask (glob-style, `*` crosses directories)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show size and resource type
        #[arg(short, long)]
        detailed: bool,
    },

    /// Extract raw files to a directory
    Extract {
        #[command(flatten)]
        source: Source,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Filter mask (glob-style, `*` crosses directories)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show the envelope and size of a resource
    Info {
        #[command(flatten)]
        source: Source,

        /// Logical resource path
        path: String,
    },

    /// Disassemble a display list
    Disasm {
        #[command(flatten)]
        source: Source,

        /// Logical display list path
        path: String,
    },

    /// Show the game versions of the mounted archives
    Versions {
        #[command(flatten)]
        source: Source,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List {
            source,
            filter,
            detailed,
        } => cmd_list(&source, filter.as_deref(), detailed),
        Commands::Extract {
            source,
            output,
            filter,
        } => cmd_extract(&source, &output, filter.as_deref()),
        Commands::Info { source, path } => cmd_info(&source, &path),
        Commands::Disasm { source, path } => cmd_disasm(&source, &path),
        Commands::Versions { source } => cmd_versions(&source),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Source {
    fn config(&self) -> Result<ManagerConfig> {
        if let Some(path) = &self.config {
            return ManagerConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()));
        }
        if self.archives.is_empty() {
            bail!("No archives given; pass --archive, --config or set OTRKIT_ARCHIVES");
        }
        Ok(ManagerConfig::with_archives(self.archives.iter().cloned()))
    }

    fn mount(&self) -> Result<ArchiveManager> {
        let config = self.config()?;
        ArchiveManager::mount(&config.archives, &config.valid_versions)
            .context("Failed to mount archives")
    }

    fn manager(&self) -> Result<ResourceManager> {
        ResourceManager::new(self.config()?).context("Failed to start resource manager")
    }
}

fn cmd_list(source: &Source, filter: Option<&str>, detailed: bool) -> Result<()> {
    let archives = source.mount()?;
    let paths = archives
        .list_files(filter.unwrap_or("*"))
        .context("Invalid filter")?;

    for path in &paths {
        if !detailed {
            println!("{path}");
            continue;
        }

        let Some(file) = archives.load_file(path, None)? else {
            continue;
        };
        let kind = match Envelope::parse(&file) {
            Ok(envelope) => format!(
                "{} v{}",
                envelope.init.resource_type, envelope.init.resource_version
            ),
            Err(_) => "-".to_string(),
        };
        println!("{:>10} {:<24} {}", file.len(), kind, path);
    }

    println!("\nTotal: {} files", paths.len());
    Ok(())
}

fn cmd_extract(source: &Source, output: &Path, filter: Option<&str>) -> Result<()> {
    let start = Instant::now();
    let archives = source.mount()?;
    println!(
        "Mounted {} archives ({} files) in {:?}",
        archives.archives().len(),
        archives.file_count(),
        start.elapsed()
    );

    let paths = archives
        .list_files(filter.unwrap_or("*"))
        .context("Invalid filter")?;
    println!("Extracting {} files...", paths.len());

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    let mut failed = 0usize;
    for path in &paths {
        let Some(output_path) = extract_path(output, path) else {
            tracing::warn!(path = %path, "skipping entry that escapes the output directory");
            failed += 1;
            pb.inc(1);
            continue;
        };

        match archives.load_file(path, None) {
            Ok(Some(file)) => {
                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&output_path, file.data())
                    .with_context(|| format!("Failed to write {}", output_path.display()))?;
            }
            Ok(None) => failed += 1,
            Err(e) => {
                tracing::warn!(path = %path, "failed to read: {e}");
                failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!("Extraction completed in {:?}", start.elapsed());
    if failed > 0 {
        println!("{failed} files could not be read");
    }
    Ok(())
}

/// Where an archive entry is written under `output`, if it stays inside it.
fn extract_path(output: &Path, entry: &str) -> Option<PathBuf> {
    hash::enclosed_path(entry).map(|relative| output.join(relative))
}

fn cmd_info(source: &Source, path: &str) -> Result<()> {
    let manager = source.manager()?;
    let resource = manager
        .load_resource(path, true)
        .with_context(|| format!("Failed to load resource {path}"))?;

    let init = resource.init_data();
    println!("Path:       {}", init.path);
    println!("Id:         {:#018x}", init.id);
    println!("Type:       {}", init.resource_type);
    println!("Version:    {}", init.resource_version);
    println!("Format:     {:?}", init.format);
    println!("Byte order: {:?}", init.byte_order);
    println!("Custom:     {}", init.is_custom);
    println!("Data size:  {} bytes", resource.pointer_size());
    if let Some(file) = resource.file() {
        println!("Archive:    {}", file.archive_name());
        println!("File size:  {} bytes", file.len());
    }
    Ok(())
}

fn cmd_disasm(source: &Source, path: &str) -> Result<()> {
    let manager = source.manager()?;
    let resource = manager
        .load_resource(path, true)
        .with_context(|| format!("Failed to load resource {path}"))?;
    let Some(list) = resource.data().as_display_list() else {
        bail!("{path} is a {}, not a display list", resource.resource_type());
    };

    let resolve = |hash: u64| manager.hash_to_path(hash);
    let resolver: HashResolver<'_> = &resolve;
    print!("{}", disassemble(list, Some(resolver)));
    Ok(())
}

fn cmd_versions(source: &Source) -> Result<()> {
    let archives = source.mount()?;
    for archive in archives.archives() {
        match archive.game_version() {
            Some(version) => println!("{:#010x}  {}", version, archive.name()),
            None => println!("{:>10}  {}", "-", archive.name()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_path_stays_in_output() {
        let output = Path::new("/tmp/out");
        assert_eq!(
            extract_path(output, "objects/gDL"),
            Some(PathBuf::from("/tmp/out/objects/gDL"))
        );
        assert_eq!(extract_path(output, "../x"), None);
        assert_eq!(extract_path(output, "a/../../x"), None);
    }
}
