//! Moorings Migration CLI Tool
//!
//! Command-line interface that turns migration files into apply, rollback and
//! drop SQL scripts for a target database platform. Suitable for CI/CD
//! pipelines: failures exit with status 1.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use moorings::migration::MigrationFile;
use moorings::{DdlConfig, DdlGenerator, Platform, SchemaModel};
use moorings_migrate::{generate_directory, preview};

#[derive(Parser)]
#[command(name = "moorings-migrate")]
#[command(about = "DDL migration script generator for Moorings")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate scripts for every migration in a directory
    Generate {
        /// Target platform (default: from config/moorings.toml or MOORINGS__DDL__PLATFORM)
        #[arg(long)]
        platform: Option<String>,

        /// Migrations directory path
        #[arg(long, default_value = "migrations")]
        migrations_dir: PathBuf,

        /// Directory the SQL scripts are written to
        #[arg(long, default_value = "sql")]
        output_dir: PathBuf,
    },

    /// Print the scripts for a single migration file
    Preview {
        /// Target platform (default: from configuration)
        #[arg(long)]
        platform: Option<String>,

        /// Migration file (m{YYYYMMDDHHMMSS}_{name}.json|toml)
        file: PathBuf,
    },

    /// List supported platforms
    Platforms,
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let result = match cli.command {
        Commands::Generate {
            platform,
            migrations_dir,
            output_dir,
        } => handle_generate(platform.as_deref(), &migrations_dir, &output_dir, cli.quiet),
        Commands::Preview { platform, file } => handle_preview(platform.as_deref(), &file),
        Commands::Platforms => {
            handle_platforms();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

/// Build the generator from configuration, with `--platform` taking precedence.
fn load_generator(platform: Option<&str>) -> anyhow::Result<DdlGenerator> {
    let mut config = DdlConfig::load().context("Failed to load configuration")?;
    if let Some(platform) = platform {
        config.platform = platform.to_string();
    }
    Ok(DdlGenerator::from_config(&config)?)
}

fn handle_generate(
    platform: Option<&str>,
    migrations_dir: &Path,
    output_dir: &Path,
    quiet: bool,
) -> anyhow::Result<()> {
    let generator = load_generator(platform)?;
    let generated = generate_directory(&generator, migrations_dir, output_dir)?;

    if quiet {
        return Ok(());
    }
    if generated.is_empty() {
        println!("No migrations found in {}", migrations_dir.display());
        return Ok(());
    }

    println!(
        "\n{} {} script(s) for {}\n",
        "Generated".green().bold(),
        generator.platform_name(),
        migrations_dir.display()
    );
    for migration in &generated {
        println!(
            "  {} m{}_{} {}",
            "✓".green(),
            migration.version,
            migration.name,
            format!("(source {})", short(&migration.source_checksum)).dimmed()
        );
        for script in &migration.scripts {
            println!(
                "      {} {}",
                script.path.display(),
                short(&script.checksum).dimmed()
            );
        }
    }
    println!("\nSummary: {} migration(s) written to {}", generated.len(), output_dir.display());
    Ok(())
}

fn handle_preview(platform: Option<&str>, file: &Path) -> anyhow::Result<()> {
    let generator = load_generator(platform)?;
    let migration = MigrationFile::open(file)?;
    let mut model = SchemaModel::new();
    let write = preview(&generator, &mut model, &migration)?;

    print_section("apply", &write.apply_script());
    print_section("rollback", &write.rollback_script());
    let drop = write.drop_script();
    if !drop.is_empty() {
        print_section("drop", &drop);
    }
    Ok(())
}

fn handle_platforms() {
    println!("{}", "Supported platforms:".bold());
    for platform in Platform::ALL {
        let ddl = platform.ddl();
        println!(
            "  {:<10} max identifier length {}",
            platform.name().cyan(),
            ddl.max_constraint_length()
        );
    }
}

fn print_section(title: &str, script: &str) {
    println!("{}", format!("-- {} --", title).yellow().bold());
    print!("{}", script);
    println!();
}

fn short(checksum: &str) -> &str {
    checksum.get(..12).unwrap_or(checksum)
}
