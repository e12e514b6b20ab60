//! AMX Regex - regular expressions for AMX scripts
//!
//! Scripts can only pass cells, so every native object the bridge creates
//! (compiled patterns, match results) lives in a per-script registry and the
//! script holds an opaque integer handle to it. Each call re-validates its
//! handles against the live set.
//!
//! # Layers
//!
//! - [`flags`]: caller bitmasks to option sets
//! - [`grammar`]: POSIX and ECMAScript patterns to engine syntax
//! - [`pattern`]: compiled patterns, whole-match, search and replace
//! - [`registry`]: handle registries
//! - [`marshal`]: strings and references across the VM boundary
//! - [`script`]: one attached script's context
//! - [`natives`]: the native table
//! - [`plugin`]: load, attach, dispatch, detach, unload

#![warn(missing_docs)]

// ============================================================================
// Modules
// ============================================================================

mod backtrack;
pub mod config;
pub mod error;
pub mod flags;
mod format;
pub mod grammar;
pub mod locale;
pub mod marshal;
pub mod natives;
pub mod pattern;
pub mod plugin;
pub mod registry;
pub mod script;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH};
pub use error::{HandleKind, RegexError, RegexResult};
pub use flags::{match_flag, regex_flag, regex_grammar, Grammar, MatchFlags, SyntaxOptions};
pub use locale::{Locale, TextMode};
pub use natives::{Native, NATIVES};
pub use pattern::{CompiledPattern, MatchResult};
pub use plugin::{AttachError, Plugin, ScriptId, INCLUDE_VERSION, PLUGIN_NAME, VERSION_VAR};
pub use registry::HandleRegistry;
pub use script::Script;
