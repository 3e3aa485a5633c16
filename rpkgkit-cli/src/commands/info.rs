//! CLI interface for toolkit status
use std::path::Path;

use console::style;
use rpkgcore::hash_list::LoadOutcome;
use rpkgkit::{KitConfig, Toolkit};

use crate::progress::print_field;

pub fn execute(
    toolkit: &Toolkit,
    hash_list: Option<&Path>,
    resource_lib: Option<&Path>,
    game: Option<&str>,
) -> anyhow::Result<()> {
    let game = super::parse_game(game)?;

    println!("{}", style("Configuration").bold());
    print_field(
        "  config file",
        KitConfig::config_path().map_or_else(|| "unavailable".to_string(), |p| p.display().to_string()),
    );
    print_field("  game", game.unwrap_or(toolkit.config().game));
    print_field("  simple output", toolkit.config().simple_output);

    println!("{}", style("Hash list").bold());
    match toolkit.load_hash_list(hash_list, false)? {
        LoadOutcome::Loaded {
            path,
            entries,
            version,
            ..
        } => {
            print_field("  path", path.display());
            print_field("  entries", entries);
            print_field(
                "  version",
                version.map_or_else(|| "unknown".to_string(), |v| v.to_string()),
            );
        }
        LoadOutcome::Skipped { path, reason } => {
            print_field("  path", path.display());
            print_field("  status", style(reason).yellow());
        }
    }

    println!("{}", style("Resource library").bold());
    if resource_lib.is_none() && toolkit.config().resource_lib_path.is_none() {
        print_field("  status", style("not configured").yellow());
        return Ok(());
    }
    match toolkit
        .resource_library(resource_lib, game)
        .and_then(|library| Ok((library.path().to_path_buf(), library.supported_resource_types()?)))
    {
        Ok((path, types)) => {
            print_field("  path", path.display());
            print_field("  resource types", types.join(", "));
        }
        Err(err) => print_field("  status", style(err).red()),
    }
    Ok(())
}
