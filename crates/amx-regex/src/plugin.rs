//! Plugin lifecycle
//!
//! The host loads the plugin once, then attaches it to each script that
//! declares the natives and detaches it when the script unloads. Every
//! attached script gets its own [`Script`] context; detaching drops it and
//! with it every handle the script was given.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use amx_sdk::{Amx, Cell, Params};
use parking_lot::Mutex;
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::locale::Locale;
use crate::natives::{self, Native, NATIVES};
use crate::script::Script;

/// Name used in log lines.
pub const PLUGIN_NAME: &str = "Pawn.Regex";

/// Version the script include must declare, as
/// `major << 16 | minor << 8 | patch`.
pub const INCLUDE_VERSION: Cell = 0x00_02_00;

/// Public variable the include uses to publish its version.
pub const VERSION_VAR: &str = "_pawnregex_version";

/// Host-chosen identifier of one VM instance.
pub type ScriptId = usize;

/// Why a script could not be attached
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    /// The script does not declare the version variable
    #[error("script does not declare _pawnregex_version; include the plugin's .inc file")]
    MissingVersion,

    /// The include and the plugin disagree
    #[error(".inc-file version {found:#x} does not equal the plugin's version {expected:#x}")]
    VersionMismatch {
        /// Version the plugin was built with
        expected: Cell,
        /// Version the script declared
        found: Cell,
    },

    /// The host attached the same script twice
    #[error("script {0} is already attached")]
    AlreadyAttached(ScriptId),
}

/// A loaded plugin and its attached scripts.
pub struct Plugin {
    config_path: PathBuf,
    config: Config,
    scripts: Mutex<HashMap<ScriptId, Arc<Script>>>,
}

impl Plugin {
    /// Load the plugin, reading (or creating) the configuration at
    /// `config_path`.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref().to_path_buf();
        let config = Config::load(&config_path)?;
        tracing::info!(
            plugin = PLUGIN_NAME,
            version = env!("CARGO_PKG_VERSION"),
            locale = %config.locale_name,
            "plugin loaded"
        );
        Ok(Self {
            config_path,
            config,
            scripts: Mutex::new(HashMap::new()),
        })
    }

    /// Natives to register with the host.
    pub fn natives(&self) -> &'static [Native] {
        &NATIVES
    }

    /// Settings read at load time.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of attached scripts.
    pub fn script_count(&self) -> usize {
        self.scripts.lock().len()
    }

    /// Context of an attached script.
    pub fn script(&self, id: ScriptId) -> Option<Arc<Script>> {
        self.scripts.lock().get(&id).cloned()
    }

    /// Attach to a script after checking its include version.
    pub fn attach(&self, id: ScriptId, amx: &dyn Amx) -> Result<(), AttachError> {
        let result = self.try_attach(id, amx);
        match &result {
            Ok(()) => tracing::info!(script = id, "script attached"),
            Err(error) => tracing::error!(plugin = PLUGIN_NAME, script = id, %error, "attach refused"),
        }
        result
    }

    fn try_attach(&self, id: ScriptId, amx: &dyn Amx) -> Result<(), AttachError> {
        let found = amx
            .pub_var(VERSION_VAR)
            .and_then(|addr| amx.cell(addr))
            .ok_or(AttachError::MissingVersion)?;
        if found != INCLUDE_VERSION {
            return Err(AttachError::VersionMismatch {
                expected: INCLUDE_VERSION,
                found,
            });
        }

        let mut scripts = self.scripts.lock();
        if scripts.contains_key(&id) {
            return Err(AttachError::AlreadyAttached(id));
        }
        let locale = Locale::new(&self.config.locale_name);
        scripts.insert(id, Arc::new(Script::new(locale)));
        Ok(())
    }

    /// Detach from a script, invalidating every handle it holds. Returns
    /// whether the script was attached.
    pub fn detach(&self, id: ScriptId) -> bool {
        let removed = self.scripts.lock().remove(&id);
        match removed {
            Some(script) => {
                let (patterns, matches) = script.clear();
                tracing::info!(script = id, patterns, matches, "script detached");
                true
            }
            None => false,
        }
    }

    /// Dispatch native `name` for script `id`. Unknown scripts and natives
    /// yield 0.
    pub fn call(&self, id: ScriptId, name: &str, amx: &mut dyn Amx, params: &[Cell]) -> Cell {
        let Some(native) = natives::find(name) else {
            tracing::error!(plugin = PLUGIN_NAME, native = name, "unknown native");
            return 0;
        };
        let Some(script) = self.script(id) else {
            tracing::error!(plugin = PLUGIN_NAME, native = name, script = id, "script is not attached");
            return 0;
        };
        native.invoke(&script, amx, &Params::new(params))
    }

    /// Save the configuration and release every script.
    pub fn unload(self) -> Result<(), ConfigError> {
        let scripts = std::mem::take(&mut *self.scripts.lock());
        for script in scripts.values() {
            script.clear();
        }
        let saved = self.config.save(&self.config_path);
        tracing::info!(plugin = PLUGIN_NAME, "plugin unloaded");
        saved
    }
}
