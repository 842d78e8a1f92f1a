//! Permission commands: `mes access`.

use anyhow::{Context, Result};

use super::super::AccessCommands;
use mes::access::{
    AccessDecision, GuardOutcome, SessionState, build_menu_tree, extract_forest, normalize_path,
};
use mes::load::{read_json, read_menus};
use mes::mes_config::MesConfig;
use mes_common::MenuRecord;

/// Run an access subcommand. Returns `false` when a navigation was denied.
pub fn cmd_access(config: &MesConfig, command: AccessCommands) -> Result<bool> {
    match command {
        AccessCommands::Paths { menus } => {
            let menus = read_menus(&menus)?;
            for path in extract_forest(&menus).iter() {
                println!("{}", path);
            }
            Ok(true)
        }
        AccessCommands::Check { path, menus, json } => {
            let menus = read_menus(&menus)?;
            let allowed = extract_forest(&menus);
            let decision = config.toml.resolver().decide(&path, &allowed);
            let path = normalize_path(&path);

            if json {
                let rule = match decision {
                    AccessDecision::Allowed(rule) => Some(rule),
                    AccessDecision::Denied => None,
                };
                let out = serde_json::json!({
                    "path": path,
                    "allowed": decision.is_allowed(),
                    "rule": rule,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                match decision {
                    AccessDecision::Allowed(rule) => println!(
                        "{} {} ({})",
                        console::style("allowed").green().bold(),
                        path,
                        rule
                    ),
                    AccessDecision::Denied => {
                        println!("{} {}", console::style("denied").red().bold(), path)
                    }
                }
            }
            Ok(decision.is_allowed())
        }
        AccessCommands::Guard {
            path,
            menus,
            session,
            user,
            json,
        } => {
            let session = parse_session(&session, &user)?;
            let menus = match menus {
                Some(file) => Some(read_menus(&file)?),
                None => None,
            };
            let outcome = config
                .toml
                .guard()
                .evaluate(&path, &session, menus.as_deref());

            if json {
                let out = match &outcome {
                    GuardOutcome::Proceed => serde_json::json!({ "proceed": true }),
                    GuardOutcome::Redirect { to, notice } => serde_json::json!({
                        "proceed": false,
                        "redirect": to,
                        "notice": notice,
                    }),
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                match &outcome {
                    GuardOutcome::Proceed => {
                        println!("{} {}", console::style("proceed").green().bold(), normalize_path(&path))
                    }
                    GuardOutcome::Redirect { to, notice } => {
                        println!("{} {}", console::style("redirect").yellow().bold(), to);
                        if let Some(notice) = notice {
                            println!("  {}", console::style(notice).dim());
                        }
                    }
                }
            }
            Ok(outcome.is_proceed())
        }
        AccessCommands::Tree { records, groups } => {
            let records: Vec<MenuRecord> = read_json(&records)?;
            let groups: Vec<String> = groups
                .split(',')
                .map(str::trim)
                .filter(|group| !group.is_empty())
                .map(str::to_string)
                .collect();
            let tree = build_menu_tree(&records, &groups, &config.toml.access.super_admin_group);
            let out = serde_json::json!({ "menus": tree });
            println!(
                "{}",
                serde_json::to_string_pretty(&out).context("Failed to serialize menu tree")?
            );
            Ok(true)
        }
    }
}

fn parse_session(state: &str, user: &str) -> Result<SessionState> {
    match state.to_lowercase().as_str() {
        "authenticated" => Ok(SessionState::Authenticated {
            username: user.to_string(),
        }),
        "anonymous" => Ok(SessionState::Anonymous),
        "expired" => Ok(SessionState::Expired),
        "unavailable" => Ok(SessionState::Unavailable),
        _ => anyhow::bail!(
            "Invalid session state '{}'. Valid values: authenticated, anonymous, expired, unavailable",
            state
        ),
    }
}
