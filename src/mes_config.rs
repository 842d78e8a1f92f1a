//! Configuration for the MES kernel.
//!
//! Read from `.mes/mes.toml`, layered file → environment → CLI:
//! - `MES_CONFIG` points at a config file elsewhere
//! - without a project file, `~/.config/mes/mes.toml` is used when present
//! - `MES_LOG` replaces the log filter
//! - `--verbose` forces `debug`
//!
//! # Configuration File Format
//!
//! ```toml
//! [access]
//! login_path = "/login"
//! fallback_path = "/welcome"
//! public_paths = ["/login", "/welcome"]
//! reserved_patterns = ["/welcome", "/profile", "/profile/**"]
//! prefix_mode = "segment"
//! denied_notice = "无权限访问该页面"
//! super_admin_group = "超级管理员"
//!
//! [[access.detail_rules]]
//! fragment = "/detail"
//! list_path = "/workorders"
//!
//! [derivation]
//! separator = "-"
//! code_policy = "always"
//! description_policy = "preserve-manual"
//!
//! [logging]
//! level = "warn"
//! json = false
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::access::{
    AccessPolicy, DetailRule, NavigationGuard, PathAccessResolver, PrefixMode, normalize_path,
    resolver::default_reserved_patterns,
};
use crate::derive::{DEFAULT_SEPARATOR, FieldPolicies, FieldPolicy, Templates};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "MES_CONFIG";

/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "MES_LOG";

/// Config file name inside the `.mes` directory.
pub const CONFIG_FILE: &str = "mes.toml";

/// Navigation and permission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessSection {
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Where a denied navigation is sent
    #[serde(default = "default_fallback_path")]
    pub fallback_path: String,
    /// Pages open to everyone, exact match
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
    /// Glob patterns open to every signed-in user
    #[serde(default = "default_reserved_patterns")]
    pub reserved_patterns: Vec<String>,
    #[serde(default)]
    pub prefix_mode: PrefixMode,
    #[serde(default = "default_denied_notice")]
    pub denied_notice: String,
    /// Group whose members see every menu
    #[serde(default = "default_super_admin_group")]
    pub super_admin_group: String,
    #[serde(default = "default_detail_rules")]
    pub detail_rules: Vec<DetailRule>,
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_fallback_path() -> String {
    "/welcome".to_string()
}

fn default_public_paths() -> Vec<String> {
    vec!["/login".to_string(), "/welcome".to_string()]
}

fn default_denied_notice() -> String {
    "无权限访问该页面".to_string()
}

fn default_super_admin_group() -> String {
    "超级管理员".to_string()
}

fn default_detail_rules() -> Vec<DetailRule> {
    vec![DetailRule::work_order_detail()]
}

impl Default for AccessSection {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            fallback_path: default_fallback_path(),
            public_paths: default_public_paths(),
            reserved_patterns: default_reserved_patterns(),
            prefix_mode: PrefixMode::default(),
            denied_notice: default_denied_notice(),
            super_admin_group: default_super_admin_group(),
            detail_rules: default_detail_rules(),
        }
    }
}

/// Derived-field settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivationSection {
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Whether a regenerated code may replace a manual edit
    #[serde(default = "default_code_policy")]
    pub code_policy: FieldPolicy,
    /// Same for descriptions and material names
    #[serde(default = "default_description_policy")]
    pub description_policy: FieldPolicy,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_code_policy() -> FieldPolicy {
    FieldPolicy::Always
}

fn default_description_policy() -> FieldPolicy {
    FieldPolicy::PreserveManual
}

impl Default for DerivationSection {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            code_policy: default_code_policy(),
            description_policy: default_description_policy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Filter directive, e.g. `warn` or `mes=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of plain text
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// The complete mes.toml structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MesToml {
    #[serde(default)]
    pub access: AccessSection,
    #[serde(default)]
    pub derivation: DerivationSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl MesToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse mes.toml")
    }

    /// Load `mes.toml` from `mes_dir`, or defaults when it does not exist.
    pub fn load_or_default(mes_dir: &Path) -> Result<Self> {
        let config_path = mes_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize mes.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.derivation.separator.is_empty() {
            warnings.push(
                "Empty derivation separator: codes will run parent and version together"
                    .to_string(),
            );
        }

        for path in [&self.access.login_path, &self.access.fallback_path]
            .into_iter()
            .chain(&self.access.public_paths)
        {
            if !path.trim().starts_with('/') {
                warnings.push(format!(
                    "Path '{}' is relative; it will be read as '/{}'",
                    path,
                    path.trim().trim_start_matches('/')
                ));
            }
        }

        for raw in &self.access.reserved_patterns {
            let pattern = normalize_path(raw);
            if !raw.trim().starts_with('/') {
                warnings.push(format!(
                    "Reserved pattern '{}' is relative; it will be read as '{}'",
                    raw, pattern
                ));
            }
            if let Err(err) = glob::Pattern::new(&pattern) {
                warnings.push(format!(
                    "Invalid reserved pattern '{}': {}",
                    pattern, err.msg
                ));
            }
        }

        for rule in &self.access.detail_rules {
            if rule.fragment.trim().is_empty() {
                warnings.push(format!(
                    "Detail rule for '{}' has no fragment and will never match",
                    rule.list_path
                ));
            }
        }

        if !is_valid_log_level(&self.logging.level) {
            warnings.push(format!(
                "Invalid logging level '{}': should be trace, debug, info, warn, error or a filter directive",
                self.logging.level
            ));
        }

        warnings
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::empty()
            .with_reserved_patterns(&self.access.reserved_patterns)
            .with_public_paths(&self.access.public_paths)
            .with_detail_rules(self.access.detail_rules.clone())
            .with_prefix_mode(self.access.prefix_mode)
    }

    pub fn resolver(&self) -> PathAccessResolver {
        PathAccessResolver::new(self.access_policy())
    }

    pub fn guard(&self) -> NavigationGuard {
        NavigationGuard::new(
            self.resolver(),
            &self.access.login_path,
            &self.access.fallback_path,
            self.access.denied_notice.clone(),
        )
    }

    pub fn templates(&self) -> Templates {
        Templates::new(self.derivation.separator.clone())
    }

    pub fn field_policies(&self) -> FieldPolicies {
        FieldPolicies {
            code: self.derivation.code_policy,
            label: self.derivation.description_policy,
        }
    }
}

/// Same grammar the subscriber is built with.
fn is_valid_log_level(filter: &str) -> bool {
    !filter.trim().is_empty() && EnvFilter::try_new(filter).is_ok()
}

/// Per-user config file, e.g. `~/.config/mes/mes.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mes").join(CONFIG_FILE))
}

/// Where the config file lives, first match wins:
/// 1. `MES_CONFIG` if set and non-empty
/// 2. `<mes_dir>/mes.toml` if it exists
/// 3. the per-user file if it exists
/// 4. `<mes_dir>/mes.toml`, where `mes config init` will create it
pub fn resolve_config_path(
    mes_dir: &Path,
    env_override: Option<String>,
    user_config: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = env_override.filter(|path| !path.trim().is_empty()) {
        return PathBuf::from(path);
    }
    let project = mes_dir.join(CONFIG_FILE);
    if project.exists() {
        return project;
    }
    match user_config {
        Some(user) if user.exists() => user,
        _ => project,
    }
}

/// Configuration plus runtime settings for one CLI invocation.
#[derive(Debug, Clone)]
pub struct MesConfig {
    pub project_dir: PathBuf,
    pub mes_dir: PathBuf,
    /// File the TOML was (or would be) read from
    pub config_path: PathBuf,
    pub toml: MesToml,
    /// CLI override: verbose mode
    pub verbose: bool,
}

impl MesConfig {
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let mes_dir = crate::init::get_mes_dir(&project_dir);
        let config_path = resolve_config_path(
            &mes_dir,
            std::env::var(CONFIG_ENV).ok(),
            user_config_path(),
        );
        let toml = if config_path.exists() {
            MesToml::load(&config_path)?
        } else {
            MesToml::default()
        };

        Ok(Self {
            project_dir,
            mes_dir,
            config_path,
            toml,
            verbose: false,
        })
    }

    pub fn with_cli_args(project_dir: PathBuf, verbose: bool) -> Result<Self> {
        let mut config = Self::new(project_dir)?;
        config.verbose = verbose;
        Ok(config)
    }

    /// Log filter (CLI → env → file).
    pub fn log_filter(&self) -> String {
        if self.verbose {
            return "debug".to_string();
        }
        std::env::var(LOG_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.toml.logging.level.clone())
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}
