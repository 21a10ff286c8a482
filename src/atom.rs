//! Package atom parsing and matching.
//!
//! An atom is a package specifier as the underlying manager understands it:
//! a bare name, optionally decorated with a version comparator, a version
//! and revision, a slot and a set of use-flags, e.g.
//! `>=sys-apps/foo-1.2-r1:3[ssl,-doc]`. Matching manager output back to
//! requested atoms only ever compares the bare name left after stripping
//! all decoration.

/// Version comparator prefix of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Less,
    LessEqual,
    Equal,
    GreaterEqual,
    Greater,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Equal => "=",
            Self::GreaterEqual => ">=",
            Self::Greater => ">",
        }
    }
}

/// A use-flag attached to an atom, possibly negated (`-doc`, `!doc`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseFlag {
    pub name: String,
    pub negated: bool,
}

/// A parsed package specifier.
///
/// Parsing never fails: a specifier that fits no known decoration simply
/// keeps its full text as the name. Two atoms with distinct raw specifiers
/// are cached independently even when their derived names agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    raw: String,
    name: String,
    comparator: Option<Comparator>,
    version: Option<String>,
    revision: Option<u32>,
    slot: Option<String>,
    use_flags: Vec<UseFlag>,
}

impl Atom {
    /// Parse a raw specifier.
    ///
    /// The leading comparator is stripped first, then decoration
    /// outside-in: use-flag bracket, slot suffix, revision, version. This
    /// way fully decorated identifiers from manager output
    /// (`sys-apps/foo-1.2-r1`) and sparse requests (`foo`) derive
    /// comparable names.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let mut rest = raw.as_str();

        let comparator = match () {
            _ if rest.starts_with("<=") => Some(Comparator::LessEqual),
            _ if rest.starts_with(">=") => Some(Comparator::GreaterEqual),
            _ if rest.starts_with('=') => Some(Comparator::Equal),
            _ if rest.starts_with('<') => Some(Comparator::Less),
            _ if rest.starts_with('>') => Some(Comparator::Greater),
            _ => None,
        };
        if let Some(cmp) = comparator {
            rest = &rest[cmp.as_str().len()..];
        }

        let mut use_flags = Vec::new();
        if rest.ends_with(']') {
            if let Some(open) = rest.rfind('[') {
                use_flags = parse_use_flags(&rest[open + 1..rest.len() - 1]);
                rest = &rest[..open];
            }
        }

        let mut slot = None;
        if let Some(colon) = rest.rfind(':') {
            let candidate = &rest[colon + 1..];
            if !candidate.is_empty() {
                slot = Some(candidate.to_string());
                rest = &rest[..colon];
            }
        }

        let mut revision = None;
        if let Some(pos) = rest.rfind("-r") {
            let digits = &rest[pos + 2..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                revision = digits.parse().ok();
                rest = &rest[..pos];
            }
        }

        let mut version = None;
        if let Some(pos) = find_version_dash(rest) {
            version = Some(rest[pos + 1..].to_string());
            rest = &rest[..pos];
        }

        let name = if rest.is_empty() { raw.as_str() } else { rest };
        let name = name.to_string();

        Self {
            raw,
            name,
            comparator,
            version,
            revision,
            slot,
            use_flags,
        }
    }

    /// The full specifier as given by the caller. Sole cache key.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The bare package name, all decoration stripped.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comparator(&self) -> Option<Comparator> {
        self.comparator
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn revision(&self) -> Option<u32> {
        self.revision
    }

    pub fn slot(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    pub fn use_flags(&self) -> &[UseFlag] {
        &self.use_flags
    }

    /// The name without its `category/` prefix, if it has one.
    pub fn base_name(&self) -> &str {
        match self.name.rsplit_once('/') {
            Some((_, base)) => base,
            None => &self.name,
        }
    }

    /// Name-equivalence: the sole equality used to bind manager output
    /// lines to requested atoms.
    ///
    /// Derived names must match exactly, except that when one side carries
    /// a category prefix and the other does not, the bare portion decides.
    /// Output lines are routinely more decorated than the request that
    /// produced them.
    pub fn name_matches(&self, other: &Atom) -> bool {
        if self.name == other.name {
            return true;
        }
        match (self.name.contains('/'), other.name.contains('/')) {
            (true, false) => self.base_name() == other.name,
            (false, true) => self.name == other.base_name(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn parse_use_flags(list: &str) -> Vec<UseFlag> {
    list.split(',')
        .map(str::trim)
        .filter(|flag| !flag.is_empty())
        .map(|flag| match flag.strip_prefix(['-', '!']) {
            Some(name) => UseFlag {
                name: name.to_string(),
                negated: true,
            },
            None => UseFlag {
                name: flag.to_string(),
                negated: false,
            },
        })
        .collect()
}

/// Find the dash introducing a trailing version: the last `-` directly
/// followed by a digit. Package names themselves may contain dashes
/// (`pacman-contrib`), versions always start with a digit.
fn find_version_dash(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    (0..s.len()).rev().find(|&i| {
        bytes[i] == b'-' && i + 1 < s.len() && bytes[i + 1].is_ascii_digit() && i > 0
    })
}
