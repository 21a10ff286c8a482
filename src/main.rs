use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;

use osdeps::atom::Atom;
use osdeps::family::FamilyProfile;
use osdeps::manager::{InstallMode, InstallOptions, NativeManager, ShellManager};
use osdeps::settings::{INSTALL_MODE, KEEP_UPTODATE, SettingsStore};

/// Resolve and install native OS package dependencies
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Package manager family to use (default: first detected native one)
    #[arg(short, long, global = true)]
    manager: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show install state for the given package atoms
    Status {
        /// Package atoms, e.g. `sys-apps/foo` or `>=sys-apps/bar-1.0`
        #[arg(required = true)]
        atoms: Vec<String>,
    },

    /// Install the given package atoms
    Install {
        #[arg(required = true)]
        atoms: Vec<String>,

        /// Only install atoms that are missing entirely, never update
        #[arg(long)]
        missing_only: bool,

        /// Install everything requested, even if already current
        #[arg(long)]
        reinstall: bool,

        /// Install without prompting
        #[arg(short = 'y', long)]
        yes: bool,

        /// Suppress non-essential output
        #[arg(long)]
        silent: bool,
    },

    /// List known package manager families and their availability
    Managers,

    /// Read or change persisted settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show all settings with their current values
    List,
    /// Print one setting value
    Get { key: String },
    /// Change one setting value
    Set { key: String, value: String },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { atoms } => status(cli.manager.as_deref(), &atoms),
        Commands::Install {
            atoms,
            missing_only,
            reinstall,
            yes,
            silent,
        } => install(
            cli.manager.as_deref(),
            &atoms,
            missing_only,
            reinstall,
            yes,
            silent,
        ),
        Commands::Managers => managers(),
        Commands::Config { command } => config(command),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "osdeps", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_manager(name: Option<&str>) -> Result<ShellManager> {
    let profile = match name {
        Some(name) => FamilyProfile::by_name(name)
            .with_context(|| format!("unknown package manager family '{name}'"))?,
        None => FamilyProfile::detect_native()
            .context("no supported native package manager found on this system")?,
    };
    let mut manager = ShellManager::new(profile);
    let store = SettingsStore::load()?;
    manager.configure(&store);
    Ok(manager)
}

fn status(family: Option<&str>, raw_atoms: &[String]) -> Result<()> {
    let mut manager = load_manager(family)?;

    for raw in raw_atoms {
        let atom = Atom::parse(raw);
        let installed = manager.is_installed(&atom)?;
        let up_to_date = manager.is_up_to_date(&atom)?;

        let label = if up_to_date {
            "installed".green()
        } else if installed {
            "update available".yellow()
        } else {
            "not installed".red()
        };
        println!("{:<40} {label}", atom.raw());
    }
    Ok(())
}

fn install(
    family: Option<&str>,
    raw_atoms: &[String],
    missing_only: bool,
    reinstall: bool,
    yes: bool,
    silent: bool,
) -> Result<()> {
    let mut manager = load_manager(family)?;
    if yes {
        manager.set_mode(InstallMode::Force);
    }

    let atoms: Vec<Atom> = raw_atoms.iter().map(|raw| Atom::parse(raw)).collect();
    let options = InstallOptions {
        filter_up_to_date: !reinstall,
        install_only: missing_only,
        silent,
    };

    let ran = manager.install(&atoms, &options)?;
    if ran {
        println!("{}", "Done.".green().bold());
    } else if !silent {
        println!("Nothing was installed.");
    }
    Ok(())
}

fn managers() -> Result<()> {
    println!("{}", "Known package manager families:".bold());
    for profile in FamilyProfile::all() {
        let mark = if profile.is_available() {
            "available".green()
        } else {
            "not found".red()
        };
        let level = if profile.policy.needs_root {
            "system"
        } else {
            "user"
        };
        println!("  {:<8} {:<6} {mark}", profile.name, level);
    }
    Ok(())
}

fn config(command: ConfigCommands) -> Result<()> {
    let mut store = SettingsStore::load()?;

    match command {
        ConfigCommands::List => {
            println!(
                "{:<16} {:<8} {}",
                KEEP_UPTODATE.key.bold(),
                store.bool(KEEP_UPTODATE),
                KEEP_UPTODATE.description
            );
            println!(
                "{:<16} {:<8} {}",
                INSTALL_MODE.key.bold(),
                store.string(INSTALL_MODE),
                INSTALL_MODE.description
            );
            Ok(())
        }
        ConfigCommands::Get { key } => {
            match key.as_str() {
                k if k == KEEP_UPTODATE.key => println!("{}", store.bool(KEEP_UPTODATE)),
                k if k == INSTALL_MODE.key => println!("{}", store.string(INSTALL_MODE)),
                other => anyhow::bail!("unknown setting '{other}'"),
            }
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            match key.as_str() {
                k if k == KEEP_UPTODATE.key => {
                    let parsed: bool = value
                        .parse()
                        .with_context(|| format!("'{value}' is not a boolean"))?;
                    store.set_bool(KEEP_UPTODATE, parsed);
                }
                k if k == INSTALL_MODE.key => {
                    let mode = InstallMode::from_name(&value).with_context(|| {
                        format!("'{value}' is not an install mode (manual, auto, force)")
                    })?;
                    store.set_string(INSTALL_MODE, mode.as_str());
                }
                other => anyhow::bail!("unknown setting '{other}'"),
            }
            store.save()
        }
    }
}
