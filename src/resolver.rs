//! Heuristic resolution of install state from dry-run output.
//!
//! The underlying managers report intent as free text, so resolution is
//! best-effort: run one batch query, bind every recognized line to a
//! requested atom, then fall back to one query per atom still pending. A
//! single malformed or unmatched atom must not block resolution of the
//! others; the per-atom queries are the expensive fallback, not the
//! default. Anything that stays unexplained ends up not-installed: a
//! false negative costs a redundant install, a false positive would
//! silently skip a needed dependency.

use std::collections::{BTreeSet, HashMap};

use crate::atom::Atom;
use crate::cache::InstallState;
use crate::error::OsdepsError;
use crate::family::FamilyProfile;

/// Raw result of one query invocation. A non-zero exit is data here, not
/// an error: partial output is still parsed.
#[derive(Debug)]
pub struct QueryOutput {
    pub success: bool,
    pub stdout: String,
}

/// Why an atom could not be resolved.
#[derive(Debug, PartialEq, Eq)]
pub enum ProblemKind {
    /// No recognizable output line, in the batch or the per-atom query.
    Unresolved,
    /// The per-atom query matched more than one distinct package name.
    Ambiguous(Vec<String>),
    /// The per-atom query invocation itself failed.
    QueryFailed(String),
}

#[derive(Debug)]
pub struct ResolutionProblem {
    pub atom: String,
    pub kind: ProblemKind,
}

impl std::fmt::Display for ResolutionProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ProblemKind::Unresolved => {
                write!(f, "could not determine install state of '{}', assuming not installed", self.atom)
            }
            ProblemKind::Ambiguous(candidates) => {
                write!(
                    f,
                    "'{}' matches several packages ({}), assuming not installed",
                    self.atom,
                    candidates.join(", ")
                )
            }
            ProblemKind::QueryFailed(reason) => {
                write!(f, "query for '{}' failed: {reason}", self.atom)
            }
        }
    }
}

/// Outcome of resolving a batch of atoms. States are keyed by the raw
/// specifier, the sole cache key.
#[derive(Debug)]
pub struct Resolution {
    pub states: HashMap<String, InstallState>,
    pub problems: Vec<ResolutionProblem>,
}

pub struct Resolver<'a> {
    profile: &'a FamilyProfile,
}

impl<'a> Resolver<'a> {
    pub fn new(profile: &'a FamilyProfile) -> Self {
        Self { profile }
    }

    /// Resolve the given atoms, issuing queries through `query`.
    ///
    /// `query` receives the raw specifiers to pass to the manager's
    /// dry-run command: once for the whole batch, then once per atom the
    /// batch output did not account for. An `Err` from the batch query
    /// leaves everything pending; an `Err` from a per-atom query records
    /// a problem for that atom alone.
    pub fn resolve_with<F>(&self, atoms: &[Atom], mut query: F) -> Resolution
    where
        F: FnMut(&[&str]) -> Result<QueryOutput, OsdepsError>,
    {
        let mut states: HashMap<String, InstallState> = atoms
            .iter()
            .map(|atom| (atom.raw().to_string(), InstallState::MISSING))
            .collect();
        let mut problems = Vec::new();

        if atoms.is_empty() {
            return Resolution { states, problems };
        }

        let mut pending: Vec<usize> = (0..atoms.len()).collect();

        let raws: Vec<&str> = atoms.iter().map(Atom::raw).collect();
        if let Ok(output) = query(&raws) {
            for (ident, state) in self.profile.table.classify_output(&output.stdout) {
                let reported = Atom::parse(&ident);
                // Each line binds at most one still-pending atom. Distinct
                // raw specifiers with the same derived name consume
                // distinct lines.
                if let Some(pos) = pending
                    .iter()
                    .position(|&i| atoms[i].name_matches(&reported))
                {
                    states.insert(atoms[pending[pos]].raw().to_string(), state);
                    pending.remove(pos);
                }
            }
        }

        for &i in &pending {
            let atom = &atoms[i];
            match query(&[atom.raw()]) {
                Ok(output) => {
                    let matches: Vec<(Atom, InstallState)> = self
                        .profile
                        .table
                        .classify_output(&output.stdout)
                        .into_iter()
                        .map(|(ident, state)| (Atom::parse(&ident), state))
                        .filter(|(reported, _)| atom.name_matches(reported))
                        .collect();

                    let names: BTreeSet<&str> =
                        matches.iter().map(|(reported, _)| reported.name()).collect();

                    if names.len() > 1 {
                        problems.push(ResolutionProblem {
                            atom: atom.raw().to_string(),
                            kind: ProblemKind::Ambiguous(
                                names.into_iter().map(String::from).collect(),
                            ),
                        });
                    } else if let Some((_, state)) = matches.first() {
                        states.insert(atom.raw().to_string(), *state);
                    } else {
                        problems.push(ResolutionProblem {
                            atom: atom.raw().to_string(),
                            kind: ProblemKind::Unresolved,
                        });
                    }
                }
                Err(err) => {
                    problems.push(ResolutionProblem {
                        atom: atom.raw().to_string(),
                        kind: ProblemKind::QueryFailed(err.to_string()),
                    });
                }
            }
        }

        Resolution { states, problems }
    }
}
