use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use slipway_app_core::persistence::FilePersistence;
use slipway_cli::commands::{self, BuildOverrides};
use slipway_cli::settings;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the build script against a solution, streaming its output
    Build {
        solution: Utf8PathBuf,
        #[arg(long, help = "Copy matching artifacts after a successful build")]
        copy: bool,
        #[arg(long, requires = "copy", help = "Destination directory for artifacts")]
        dest: Option<Utf8PathBuf>,
        #[arg(long, default_value = slipway_config::DEFAULT_EXTENSION_PATTERNS)]
        patterns: String,
        #[arg(long, help = "Override the configured timeout (seconds)")]
        timeout: Option<u64>,
        #[arg(long, help = "Override the configured script runner path")]
        runner: Option<Utf8PathBuf>,
        #[arg(long, help = "Override the configured build script path")]
        script: Option<Utf8PathBuf>,
    },
    /// Copy bin artifacts from an existing tree without building
    Copy {
        #[arg(help = "Solution file or source root to scan")]
        source: Utf8PathBuf,
        #[arg(long)]
        dest: Utf8PathBuf,
        #[arg(long, default_value = slipway_config::DEFAULT_EXTENSION_PATTERNS)]
        patterns: String,
    },
    /// Inspect or change persisted settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    Show,
    Set {
        #[arg(long)]
        timeout: Option<u64>,
        #[arg(long)]
        runner: Option<String>,
        #[arg(long)]
        script: Option<String>,
        #[arg(long)]
        copy_enabled: Option<bool>,
        #[arg(long)]
        dest: Option<String>,
        #[arg(long)]
        patterns: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("default subscriber");

    match cli.command {
        Commands::Build {
            solution,
            copy,
            dest,
            patterns,
            timeout,
            runner,
            script,
        } => commands::cmd_build(
            FilePersistence::new(),
            solution,
            dest,
            patterns,
            copy,
            BuildOverrides {
                timeout_secs: timeout,
                runner,
                script,
            },
        )?,
        Commands::Copy {
            source,
            dest,
            patterns,
        } => commands::cmd_copy(source, dest, &patterns)?,
        Commands::Settings { command } => match command {
            SettingsCommands::Show => settings::handle_show()?,
            SettingsCommands::Set {
                timeout,
                runner,
                script,
                copy_enabled,
                dest,
                patterns,
            } => settings::handle_set(timeout, runner, script, copy_enabled, dest, patterns)?,
        },
    }

    Ok(())
}
