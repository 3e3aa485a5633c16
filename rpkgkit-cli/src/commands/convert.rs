//! CLI interface for resource conversion
use std::path::Path;
use std::time::Instant;

use rpkgcore::converter::ConversionMode;
use rpkgkit::Toolkit;
use rpkgkit::operations::conversion::{resolve_output_path, resource_type_of};

use crate::progress::{DOCUMENT, GEAR, print_done, print_step};

pub struct ConvertArgs<'a> {
    pub source: &'a Path,
    pub destination: Option<&'a Path>,
    pub out_dir: Option<&'a Path>,
    pub resource_lib: Option<&'a Path>,
    pub resource_type: Option<&'a str>,
    pub game: Option<&'a str>,
    pub verbose: bool,
    pub stdout: bool,
}

pub fn execute(toolkit: &Toolkit, args: &ConvertArgs<'_>) -> anyhow::Result<()> {
    let start = Instant::now();
    let game = super::parse_game(args.game)?;
    let resource_type = match args.resource_type {
        Some(ty) => ty.to_ascii_uppercase(),
        None => resource_type_of(args.source).ok_or_else(|| {
            anyhow::anyhow!(
                "Cannot detect resource type from {}; pass --type",
                args.source.display()
            )
        })?,
    };
    let mode = if args.verbose {
        ConversionMode::Verbose
    } else {
        ConversionMode::from_simple(toolkit.config().simple_output)
    };

    print_step(1, 2, GEAR, &format!("Loading {resource_type} converter..."));
    toolkit.load_converter_plugin(args.resource_lib, game, &resource_type)?;

    if args.stdout {
        let json = toolkit.convert_file_to_json_string(args.source, mode)?;
        println!("{json}");
        return Ok(());
    }

    let destination = resolve_output_path(args.source, args.destination, args.out_dir);
    if let Some(dir) = args.out_dir {
        std::fs::create_dir_all(dir)?;
    }
    print_step(
        2,
        2,
        DOCUMENT,
        &format!("Writing {} ({mode})...", destination.display()),
    );
    toolkit.convert_file_to_json_file(args.source, &destination, mode)?;
    print_done(start.elapsed());
    Ok(())
}
