//! Configuration view and validation commands: `mes config`.

use anyhow::Result;

use super::super::ConfigCommands;
use mes::mes_config::{MesConfig, MesToml};

pub fn cmd_config(config: &MesConfig, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = &config.config_path;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("MES Configuration");
            println!("=================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No mes.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let toml = &config.toml;
            println!("[access]");
            println!("  login_path = \"{}\"", toml.access.login_path);
            println!("  fallback_path = \"{}\"", toml.access.fallback_path);
            println!("  public_paths = {:?}", toml.access.public_paths);
            println!("  reserved_patterns = {:?}", toml.access.reserved_patterns);
            println!("  prefix_mode = \"{}\"", toml.access.prefix_mode);
            println!("  denied_notice = \"{}\"", toml.access.denied_notice);
            println!("  super_admin_group = \"{}\"", toml.access.super_admin_group);
            for rule in &toml.access.detail_rules {
                println!(
                    "  detail_rule: \"{}\" -> \"{}\"",
                    rule.fragment, rule.list_path
                );
            }
            println!();

            println!("[derivation]");
            println!("  separator = \"{}\"", toml.derivation.separator);
            println!("  code_policy = \"{}\"", toml.derivation.code_policy);
            println!(
                "  description_policy = \"{}\"",
                toml.derivation.description_policy
            );
            println!();

            println!("[logging]");
            println!("  level = \"{}\"", toml.logging.level);
            println!("  json = {}", toml.logging.json);
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  log_filter = \"{}\"", config.log_filter());
            println!();

            if !config_path.exists() {
                println!("Run 'mes config init' to create a mes.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No mes.toml found. Using defaults (valid).");
                return Ok(());
            }

            let warnings = config.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("mes.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if let Some(parent) = config_path.parent()
                && !parent.exists()
            {
                std::fs::create_dir_all(parent)?;
            }

            MesToml::default().save(config_path)?;

            println!("Created mes.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [access] public paths, reserved patterns and detail rules");
            println!("  - [derivation] separator and field policies");
            println!("  - [logging] level and format");
            println!();
        }
    }

    Ok(())
}
