//! Resolver and installer for native OS package dependencies.
//!
//! Given package atoms and an opaque native package manager (emerge, apt,
//! pacman, dnf, pip, ...), this crate decides whether each atom is already
//! installed and up to date, and performs the install when it is not.
//!
//! # Architecture
//!
//! - [`atom::Atom`]: parsed package specifier with name-equivalence
//!   matching
//! - [`template::CommandTemplate`]: command line generation for the query,
//!   automatic and user-facing variants
//! - [`executor`]: privileged execution with environment isolation and a
//!   machine-wide advisory lock
//! - [`cache::StateCache`]: per-façade install-state cache, cleared
//!   wholesale after a successful install
//! - [`resolver::Resolver`]: heuristic dry-run output parsing with a
//!   per-atom fallback for everything the batch cannot account for
//! - [`family::FamilyProfile`]: per-family data (templates, execution
//!   policy, flag table)
//! - [`manager::ShellManager`]: the façade composing the above, one
//!   instance per workspace session

pub mod atom;
pub mod cache;
pub mod error;
pub mod executor;
pub mod family;
pub mod manager;
pub mod resolver;
pub mod settings;
pub mod template;

pub use atom::Atom;
pub use cache::{InstallState, StateCache};
pub use error::OsdepsError;
pub use family::FamilyProfile;
pub use manager::{InstallMode, InstallOptions, NativeManager, ShellManager};
pub use settings::SettingsStore;
