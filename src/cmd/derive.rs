//! Derived-field commands: `mes derive`.

use anyhow::{Context, Result};
use std::path::Path;

use super::super::DeriveCommands;
use mes::derive::{
    DerivationSession, EntityKind, FormEvent, MaterialEvent, MaterialSession, ReferenceSnapshot,
};
use mes::load::read_json;
use mes::mes_config::MesConfig;

pub fn cmd_derive(config: &MesConfig, command: DeriveCommands) -> Result<()> {
    match command {
        DeriveCommands::Code {
            snapshot,
            kind,
            parent,
            version,
            json,
        } => {
            let kind: EntityKind = kind.parse()?;
            let snapshot = ReferenceSnapshot::load(&snapshot)?;
            let mut session = DerivationSession::new(
                kind,
                config.toml.templates(),
                config.toml.field_policies(),
            );
            session.set_parent(parent, &snapshot);
            let state = session.set_version(&version, &snapshot);

            if json {
                let out = serde_json::json!({
                    "kind": kind,
                    "state": state,
                    "code": session.code(),
                    "description": session.description(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("code        = \"{}\"", session.code());
                println!("description = \"{}\"", session.description());
            }
        }
        DeriveCommands::Material {
            snapshot,
            category,
            params,
            json,
        } => {
            let snapshot = ReferenceSnapshot::load(&snapshot)?;
            let mut session =
                MaterialSession::new(config.toml.templates(), config.toml.field_policies());
            let mut state = session.set_category(category, &snapshot);
            for raw in &params {
                let (param, value) = parse_param(raw)?;
                state = session.set_param(param, &value, &snapshot);
            }

            if json {
                let out = serde_json::json!({
                    "state": state,
                    "code": session.code(),
                    "name": session.name(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("code = \"{}\"", session.code());
                println!("name = \"{}\"", session.name());
            }
        }
        DeriveCommands::Replay {
            snapshot,
            kind,
            events,
            submit,
        } => {
            let snapshot = ReferenceSnapshot::load(&snapshot)?;
            let out = if kind.trim().eq_ignore_ascii_case("material") {
                replay_material(config, &snapshot, &events, submit)?
            } else {
                replay_entity(config, kind.parse()?, &snapshot, &events, submit)?
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}

fn replay_entity(
    config: &MesConfig,
    kind: EntityKind,
    snapshot: &ReferenceSnapshot,
    events: &Path,
    submit: bool,
) -> Result<serde_json::Value> {
    let events: Vec<FormEvent> = read_json(events)?;
    let mut session =
        DerivationSession::new(kind, config.toml.templates(), config.toml.field_policies());
    for event in events {
        session.apply(event, snapshot);
    }

    let record = if submit {
        session
            .submit()
            .with_context(|| format!("Submitting {} form", kind))?
    } else {
        session.record()
    };
    Ok(serde_json::to_value(record)?)
}

fn replay_material(
    config: &MesConfig,
    snapshot: &ReferenceSnapshot,
    events: &Path,
    submit: bool,
) -> Result<serde_json::Value> {
    let events: Vec<MaterialEvent> = read_json(events)?;
    let mut session = MaterialSession::new(config.toml.templates(), config.toml.field_policies());
    for event in events {
        session.apply(event, snapshot);
    }

    let record = if submit {
        session.submit().context("Submitting material form")?
    } else {
        session.record()
    };
    Ok(serde_json::to_value(record)?)
}

/// Parse `ID=VALUE`. The value may be empty.
fn parse_param(raw: &str) -> Result<(i64, String)> {
    let Some((id, value)) = raw.split_once('=') else {
        anyhow::bail!("Invalid parameter '{}': expected ID=VALUE", raw);
    };
    let id = id
        .trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid parameter id in '{}'", raw))?;
    Ok((id, value.to_string()))
}
