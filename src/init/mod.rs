//! `mes init`: create the `.mes/` directory of a project.
//!
//! ```text
//! .mes/
//! └── mes.toml     # Access, derivation and logging settings
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::mes_config::{CONFIG_FILE, MesToml};

/// The name of the mes configuration directory.
pub const MES_DIR: &str = ".mes";

/// Result of initializing a project.
#[derive(Debug)]
pub struct InitResult {
    /// Path to the .mes directory
    pub mes_dir: PathBuf,
    /// Whether the directory was newly created (false if it already existed)
    pub created: bool,
    /// Whether a default mes.toml was written
    pub wrote_config: bool,
}

/// Initialize a project in the given directory.
///
/// Existing files are never overwritten; running it twice only fills in what
/// is missing.
pub fn init_project(project_dir: &Path) -> Result<InitResult> {
    let mes_dir = project_dir.join(MES_DIR);

    let created = !mes_dir.exists();
    if created {
        std::fs::create_dir_all(&mes_dir)
            .with_context(|| format!("Failed to create directory: {}", mes_dir.display()))?;
    }

    let config_path = mes_dir.join(CONFIG_FILE);
    let wrote_config = if config_path.exists() {
        false
    } else {
        MesToml::default().save(&config_path)?;
        true
    };

    tracing::debug!(dir = %mes_dir.display(), created, wrote_config, "Initialized project");
    Ok(InitResult {
        mes_dir,
        created,
        wrote_config,
    })
}

/// Check if a project is already initialized.
pub fn is_initialized(project_dir: &Path) -> bool {
    project_dir.join(MES_DIR).exists()
}

/// Get the path to the .mes directory for a project.
pub fn get_mes_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(MES_DIR)
}
