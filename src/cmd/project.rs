//! Project initialization command.

use anyhow::Result;

pub fn cmd_init(project_dir: &std::path::Path) -> Result<()> {
    use mes::init::{init_project, is_initialized};

    let was_initialized = is_initialized(project_dir);

    let result = init_project(project_dir)?;

    if result.created {
        println!("Initialized mes project at {}", result.mes_dir.display());
        println!();
        println!("Created directory structure:");
        println!("  .mes/");
        println!("  └── mes.toml      # Access, derivation and logging settings");
        println!();
        println!("Next steps:");
        println!("  1. Adjust public paths and detail rules under [access]");
        println!("  2. Run `mes config validate` to check the result");
    } else if was_initialized && !result.wrote_config {
        println!(
            "mes project already initialized at {}",
            result.mes_dir.display()
        );
        println!("Existing mes.toml left untouched.");
    } else {
        println!(
            "Completed mes initialization at {}",
            result.mes_dir.display()
        );
    }

    Ok(())
}
