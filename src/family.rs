//! Per-family manager profiles.
//!
//! A profile is pure data: the binary to detect, the command templates, the
//! execution policy and the flag table the output resolver matches dry-run
//! lines against. Adding a manager family means adding a profile here, not
//! new parsing code.

use regex::Regex;

use crate::cache::InstallState;
use crate::executor::ExecutionPolicy;
use crate::template::{CommandTemplate, TemplateSet};

/// Variables worth carrying into an elevated install. Package managers
/// need the proxy settings of the calling session, nothing else.
const PROXY_ENV: &[&str] = &["http_proxy", "https_proxy", "ftp_proxy", "no_proxy"];

/// One recognized dry-run line shape.
///
/// The regex must expose an `atom` capture for the decorated package
/// identifier and may expose a `flag` capture for the action token. The
/// flag is looked up in `classes` after whitespace normalization; a
/// recognized line whose flag is absent or unlisted classifies as `other`.
#[derive(Debug)]
pub struct FlagRule {
    pub line: Regex,
    pub classes: &'static [(&'static str, InstallState)],
    pub other: InstallState,
}

/// Ordered rule set for one family; first matching rule wins.
#[derive(Debug)]
pub struct FlagTable {
    rules: Vec<FlagRule>,
}

impl FlagTable {
    pub fn new(rules: Vec<FlagRule>) -> Self {
        Self { rules }
    }

    /// Classify a single output line, if any rule recognizes it.
    ///
    /// Returns the decorated identifier and the state the action flag
    /// implies.
    pub fn classify_line(&self, line: &str) -> Option<(String, InstallState)> {
        for rule in &self.rules {
            let Some(caps) = rule.line.captures(line) else {
                continue;
            };
            let ident = caps.name("atom")?.as_str().to_string();
            let state = match caps.name("flag") {
                Some(flag) => {
                    let flag: String = flag.as_str().split_whitespace().collect();
                    rule.classes
                        .iter()
                        .find(|(token, _)| *token == flag)
                        .map(|(_, state)| *state)
                        .unwrap_or(rule.other)
                }
                None => rule.other,
            };
            return Some((ident, state));
        }
        None
    }

    /// Classify every recognized line of a dry-run output, in order.
    pub fn classify_output(&self, output: &str) -> Vec<(String, InstallState)> {
        output
            .lines()
            .filter_map(|line| self.classify_line(line))
            .collect()
    }
}

/// Everything the resolver and executor need to know about one manager
/// family.
#[derive(Debug)]
pub struct FamilyProfile {
    pub name: &'static str,
    pub binary: &'static str,
    pub templates: TemplateSet,
    pub policy: ExecutionPolicy,
    pub table: FlagTable,
}

impl FamilyProfile {
    /// Gentoo portage. The reference family: its dry-run output carries a
    /// real action flag per line.
    ///
    /// `R` reinstalls the exact installed version, `N` is a new install,
    /// everything else (`U`, `UD`, `NS`, ...) touches an installed
    /// package.
    pub fn emerge() -> Self {
        Self {
            name: "emerge",
            binary: "emerge",
            templates: TemplateSet {
                query: Some(CommandTemplate::new(["emerge", "-p", "%s"])),
                install: Some(CommandTemplate::new(["emerge", "--color", "n", "%s"])),
                install_user: Some(CommandTemplate::new(["emerge", "-av", "%s"])),
            },
            policy: ExecutionPolicy::privileged(PROXY_ENV),
            table: FlagTable::new(vec![FlagRule {
                line: Regex::new(r"^\[ebuild\s+(?P<flag>[^\]]*?)\s*\]\s+(?P<atom>\S+)").unwrap(),
                classes: &[
                    ("R", InstallState::CURRENT),
                    ("N", InstallState::MISSING),
                ],
                other: InstallState::STALE,
            }]),
        }
    }

    /// Debian/Ubuntu apt. `Inst foo [old] (new ...)` upgrades an installed
    /// package, `Inst foo (new ...)` pulls a fresh one.
    pub fn apt() -> Self {
        Self {
            name: "apt",
            binary: "apt-get",
            templates: TemplateSet {
                query: Some(CommandTemplate::new(["apt-get", "install", "-s", "%s"])),
                install: Some(CommandTemplate::new(["apt-get", "install", "-y", "%s"])),
                install_user: Some(CommandTemplate::new(["apt-get", "install", "%s"])),
            },
            policy: ExecutionPolicy::privileged(PROXY_ENV),
            table: FlagTable::new(vec![
                FlagRule {
                    line: Regex::new(r"^(?P<flag>Inst)\s+(?P<atom>\S+)\s+\[").unwrap(),
                    classes: &[("Inst", InstallState::STALE)],
                    other: InstallState::STALE,
                },
                FlagRule {
                    line: Regex::new(r"^(?P<flag>Inst|Conf)\s+(?P<atom>\S+)").unwrap(),
                    classes: &[
                        ("Inst", InstallState::MISSING),
                        ("Conf", InstallState::MISSING),
                    ],
                    other: InstallState::STALE,
                },
            ]),
        }
    }

    /// Arch pacman. No true dry run; `--print-format` reports what `-S
    /// --needed` would fetch, up-to-date targets only show up as a
    /// skip warning.
    pub fn pacman() -> Self {
        Self {
            name: "pacman",
            binary: "pacman",
            templates: TemplateSet {
                query: Some(CommandTemplate::new([
                    "pacman",
                    "-S",
                    "--needed",
                    "--print-format",
                    "install %n",
                    "%s",
                ])),
                install: Some(CommandTemplate::new([
                    "pacman",
                    "-S",
                    "--noconfirm",
                    "--needed",
                    "%s",
                ])),
                install_user: Some(CommandTemplate::new(["pacman", "-S", "--needed", "%s"])),
            },
            policy: ExecutionPolicy::privileged(PROXY_ENV),
            table: FlagTable::new(vec![
                FlagRule {
                    line: Regex::new(
                        r"^warning: (?P<atom>.+?)-\d\S* is up to date -- skipping",
                    )
                    .unwrap(),
                    classes: &[],
                    other: InstallState::CURRENT,
                },
                FlagRule {
                    line: Regex::new(r"^(?P<flag>install)\s+(?P<atom>\S+)$").unwrap(),
                    classes: &[("install", InstallState::MISSING)],
                    other: InstallState::MISSING,
                },
            ]),
        }
    }

    /// Fedora/RHEL dnf. `--assumeno` aborts before acting but still prints
    /// the transaction table; the abort's non-zero exit is expected.
    pub fn dnf() -> Self {
        Self {
            name: "dnf",
            binary: "dnf",
            templates: TemplateSet {
                query: Some(CommandTemplate::new(["dnf", "install", "--assumeno", "%s"])),
                install: Some(CommandTemplate::new(["dnf", "install", "-y", "%s"])),
                install_user: Some(CommandTemplate::new(["dnf", "install", "%s"])),
            },
            policy: ExecutionPolicy::privileged(PROXY_ENV),
            table: FlagTable::new(vec![
                FlagRule {
                    line: Regex::new(r"^Package (?P<atom>.+?)-\d\S* is already installed")
                        .unwrap(),
                    classes: &[],
                    other: InstallState::CURRENT,
                },
                FlagRule {
                    line: Regex::new(
                        r"^\s+(?P<atom>[A-Za-z0-9._+-]+)\s+(?:noarch|x86_64|i686|aarch64|armv7hl|s390x|ppc64le)\s+",
                    )
                    .unwrap(),
                    classes: &[],
                    other: InstallState::MISSING,
                },
            ]),
        }
    }

    /// Python pip. User-level: no elevation, no machine-wide lock.
    pub fn pip() -> Self {
        Self {
            name: "pip",
            binary: "pip",
            templates: TemplateSet {
                query: Some(CommandTemplate::new(["pip", "install", "--dry-run", "%s"])),
                install: Some(CommandTemplate::new(["pip", "install", "%s"])),
                install_user: None,
            },
            policy: ExecutionPolicy::user(),
            table: FlagTable::new(vec![
                FlagRule {
                    line: Regex::new(r"^Requirement already satisfied: (?P<atom>\S+)").unwrap(),
                    classes: &[],
                    other: InstallState::CURRENT,
                },
                FlagRule {
                    line: Regex::new(r"^(?:Would install|Collecting)\s+(?P<atom>\S+)").unwrap(),
                    classes: &[],
                    other: InstallState::MISSING,
                },
            ]),
        }
    }

    pub fn all() -> Vec<FamilyProfile> {
        vec![
            Self::emerge(),
            Self::apt(),
            Self::pacman(),
            Self::dnf(),
            Self::pip(),
        ]
    }

    pub fn by_name(name: &str) -> Option<FamilyProfile> {
        Self::all().into_iter().find(|p| p.name == name)
    }

    /// Whether the family's binary exists on this machine.
    pub fn is_available(&self) -> bool {
        which::which(self.binary).is_ok()
    }

    /// First available native (root-level) family on this machine.
    pub fn detect_native() -> Option<FamilyProfile> {
        Self::all()
            .into_iter()
            .filter(|p| p.policy.needs_root)
            .find(|p| p.is_available())
    }
}
