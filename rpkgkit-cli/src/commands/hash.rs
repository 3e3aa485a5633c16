//! CLI interface for IOI hashing
use std::path::{Path, PathBuf};
use std::time::Instant;

use rpkgcore::hash::HashFormat;
use rpkgkit::Toolkit;
use rpkgkit::operations::hashing;

use crate::progress::{DOCUMENT, LINK, print_done, print_step};

pub fn execute(
    toolkit: &Toolkit,
    input: &str,
    md5: bool,
    file: bool,
    lines: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let format = if md5 { HashFormat::Md5 } else { HashFormat::Ioi };

    if lines {
        let start = Instant::now();
        print_step(1, 2, LINK, &format!("Hashing lines of {input}..."));
        let pairs = toolkit.hash_lines_from_file(PathBuf::from(input))?;

        match output {
            Some(dest) => {
                print_step(2, 2, DOCUMENT, &format!("Writing {}...", dest.display()));
                hashing::write_hash_pairs(&pairs, dest)?;
            }
            None => print!("{}", hashing::format_hash_pairs(&pairs)),
        }
        print_done(start.elapsed());
        return Ok(());
    }

    let hash = if file {
        toolkit.compute_hash_from_file(PathBuf::from(input), format)?
    } else {
        toolkit.compute_hash(input, format)
    };
    println!("{hash}");
    Ok(())
}
