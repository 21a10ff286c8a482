//! The manager façade: the capability external callers consume.
//!
//! One `ShellManager` wraps one manager family profile, owns the state
//! cache for its session and composes the template engine, resolver and
//! privileged executor. All families share this implementation; behavior
//! differences live entirely in the profile data.

use anyhow::Result;
use colored::Colorize;

use crate::atom::Atom;
use crate::cache::StateCache;
use crate::error::OsdepsError;
use crate::executor;
use crate::family::FamilyProfile;
use crate::resolver::{QueryOutput, Resolver};
use crate::settings::{INSTALL_MODE, KEEP_UPTODATE, SettingsStore};

/// Confirmation gate behavior, from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// Show the user-facing command, wait for acknowledgment, do not act.
    Manual,
    /// Install without prompting.
    Auto,
    /// Always install, announcing what runs.
    Force,
}

impl InstallMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "manual" => Some(Self::Manual),
            "auto" => Some(Self::Auto),
            "force" => Some(Self::Force),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
            Self::Force => "force",
        }
    }
}

/// What the confirmation gate decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Run the install, announcing the command first.
    Proceed,
    /// Run the install with no output.
    ProceedSilently,
    /// Show instructions only; the install does not run.
    DisplayOnly,
}

/// Pure decision function of configuration plus the silent flag. The
/// blocking acknowledgment read happens in the caller, and only on the
/// `DisplayOnly` branch.
pub fn gate_decision(mode: InstallMode, silent: bool) -> GateDecision {
    match mode {
        InstallMode::Manual => GateDecision::DisplayOnly,
        InstallMode::Auto => GateDecision::ProceedSilently,
        InstallMode::Force => {
            if silent {
                GateDecision::ProceedSilently
            } else {
                GateDecision::Proceed
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Skip atoms that are already installed and current.
    pub filter_up_to_date: bool,
    /// Only install atoms that are missing entirely, never update.
    pub install_only: bool,
    /// Suppress non-essential output.
    pub silent: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            filter_up_to_date: true,
            install_only: false,
            silent: false,
        }
    }
}

/// The fixed capability surface consumed by workspace and build-ordering
/// logic.
pub trait NativeManager {
    fn name(&self) -> &str;

    fn is_installed(&mut self, atom: &Atom) -> Result<bool>;

    fn is_up_to_date(&mut self, atom: &Atom) -> Result<bool>;

    /// Install the given atoms. Returns `true` iff an install actually
    /// ran and succeeded; a declined gate, an empty final set and a
    /// failed install command all return `false`.
    fn install(&mut self, atoms: &[Atom], options: &InstallOptions) -> Result<bool>;

    /// Pick up this manager's switches from the settings store.
    fn configure(&mut self, store: &SettingsStore);
}

/// Data-parameterized façade over one manager family.
pub struct ShellManager {
    profile: FamilyProfile,
    cache: StateCache,
    keep_uptodate: bool,
    mode: InstallMode,
}

impl ShellManager {
    pub fn new(profile: FamilyProfile) -> Self {
        Self {
            profile,
            cache: StateCache::new(),
            keep_uptodate: KEEP_UPTODATE.default,
            mode: InstallMode::Manual,
        }
    }

    pub fn profile(&self) -> &FamilyProfile {
        &self.profile
    }

    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    pub fn mode(&self) -> InstallMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InstallMode) {
        self.mode = mode;
    }

    pub fn set_keep_uptodate(&mut self, keep: bool) {
        self.keep_uptodate = keep;
    }

    /// Resolve the given atoms now, overwriting any cached state.
    fn resolve_into_cache(&mut self, atoms: &[Atom]) -> Result<()> {
        if self.profile.templates.query.is_none() {
            return Err(OsdepsError::Configuration {
                manager: self.profile.name.to_string(),
                variant: "query",
            }
            .into());
        }

        let profile = &self.profile;
        let resolution =
            Resolver::new(profile).resolve_with(atoms, |packages| run_query(profile, packages));

        for problem in &resolution.problems {
            eprintln!("{} {problem}", "osdeps:".yellow().bold());
        }
        for (raw, state) in resolution.states {
            self.cache.insert(raw, state);
        }
        Ok(())
    }

    /// Resolve whatever part of `atoms` the cache does not know yet, in
    /// one batch.
    fn fill_cache(&mut self, atoms: &[Atom]) -> Result<()> {
        let unknown: Vec<Atom> = atoms
            .iter()
            .filter(|atom| self.cache.get(atom.raw()).is_none())
            .cloned()
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }
        self.resolve_into_cache(&unknown)
    }
}

impl NativeManager for ShellManager {
    fn name(&self) -> &str {
        self.profile.name
    }

    fn is_installed(&mut self, atom: &Atom) -> Result<bool> {
        if let Some(state) = self.cache.get(atom.raw()) {
            return Ok(state.installed);
        }
        self.resolve_into_cache(std::slice::from_ref(atom))?;
        Ok(self
            .cache
            .get(atom.raw())
            .is_some_and(|state| state.installed))
    }

    fn is_up_to_date(&mut self, atom: &Atom) -> Result<bool> {
        if let Some(state) = self.cache.get(atom.raw()) {
            return Ok(state.up_to_date);
        }
        self.resolve_into_cache(std::slice::from_ref(atom))?;
        Ok(self
            .cache
            .get(atom.raw())
            .is_some_and(|state| state.up_to_date))
    }

    fn install(&mut self, atoms: &[Atom], options: &InstallOptions) -> Result<bool> {
        let selected: Vec<Atom> = if options.install_only || options.filter_up_to_date {
            self.fill_cache(atoms)?;

            let mut missing = Vec::new();
            let mut installed = Vec::new();
            for atom in atoms {
                if self.is_installed(atom)? {
                    installed.push(atom.clone());
                } else {
                    missing.push(atom.clone());
                }
            }

            let mut selected = missing;
            if options.filter_up_to_date
                && !options.install_only
                && self.keep_uptodate
                && !installed.is_empty()
            {
                // Fresh resolution for the installed subset: cached state
                // may predate an upstream repository sync.
                self.resolve_into_cache(&installed)?;
                for atom in installed {
                    if !self
                        .cache
                        .get(atom.raw())
                        .is_some_and(|state| state.up_to_date)
                    {
                        selected.push(atom);
                    }
                }
            }
            selected
        } else {
            atoms.to_vec()
        };

        if selected.is_empty() {
            return Ok(false);
        }

        let names: Vec<&str> = selected.iter().map(Atom::raw).collect();
        let auto_command = self
            .profile
            .templates
            .install_command(self.profile.name, &names)?;
        let user_command = self
            .profile
            .templates
            .user_command(self.profile.name, &names)?;

        match gate_decision(self.mode, options.silent) {
            GateDecision::DisplayOnly => {
                println!(
                    "{}",
                    "The following packages need to be installed:".bold()
                );
                for atom in &selected {
                    println!("  {atom}");
                }
                println!("\nRun:\n  {}", user_command.bold());
                let _ = dialoguer::Confirm::new()
                    .with_prompt("Continue once the packages above have been installed")
                    .default(true)
                    .interact()?;
                return Ok(false);
            }
            GateDecision::Proceed => {
                println!(
                    "{} {} ({})",
                    "Installing:".bold(),
                    names.join(" "),
                    self.profile.name
                );
            }
            GateDecision::ProceedSilently => {}
        }

        let outcome = executor::execute(&auto_command, &self.profile.policy)?;
        if outcome.success {
            self.cache.clear();
            Ok(true)
        } else {
            let failure = OsdepsError::InstallFailed {
                manager: self.profile.name.to_string(),
                status: outcome
                    .code
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
            };
            eprintln!("{} {failure}", "error:".red().bold());
            Ok(false)
        }
    }

    fn configure(&mut self, store: &SettingsStore) {
        self.keep_uptodate = store.bool(KEEP_UPTODATE);
        self.mode = InstallMode::from_name(&store.string(INSTALL_MODE)).unwrap_or(InstallMode::Manual);
    }
}

fn run_query(profile: &FamilyProfile, packages: &[&str]) -> Result<QueryOutput, OsdepsError> {
    let command = profile.templates.query_command(profile.name, packages)?;
    // Queries are side-effect-free and run unelevated; several managers
    // print the interesting lines on stderr.
    let output = duct::cmd("sh", ["-c", command.as_str()])
        .stdout_capture()
        .stderr_to_stdout()
        .unchecked()
        .run()?;
    Ok(QueryOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}
