//! CLI interface for hash list lookups
use std::path::Path;

use console::style;
use rpkgkit::Toolkit;

use crate::progress::{LOOKING_GLASS, print_step};

pub fn execute(toolkit: &Toolkit, hashes: &[String], hash_list: Option<&Path>) -> anyhow::Result<()> {
    print_step(1, 1, LOOKING_GLASS, "Loading hash list...");
    toolkit.load_hash_list(hash_list, true)?;

    let mut missing = 0usize;
    for hash in hashes {
        match toolkit.lookup_hash(hash)? {
            Some(entry) => println!(
                "{} {}",
                style(&entry.file_name).cyan(),
                entry.display_name()
            ),
            None => {
                missing += 1;
                println!("{} {}", style(hash).red(), style("not found").dim());
            }
        }
    }

    if missing > 0 {
        anyhow::bail!("{missing} of {} hashes not found", hashes.len());
    }
    Ok(())
}
