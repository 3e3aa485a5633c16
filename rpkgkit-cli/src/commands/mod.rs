use clap::Subcommand;
use rpkgkit::Toolkit;
use std::path::PathBuf;

pub mod convert;
pub mod hash;
pub mod info;
pub mod lookup;

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the IOI hash of a string or file
    Hash {
        /// String to hash, or a file path with --file / --lines
        input: String,

        /// Print the full 128-bit MD5 instead of the IOI hash
        #[arg(long)]
        md5: bool,

        /// Hash the contents of the file at INPUT
        #[arg(long, conflicts_with = "lines")]
        file: bool,

        /// Hash every line of the file at INPUT
        #[arg(long)]
        lines: bool,

        /// Write `HASH,line` pairs here instead of stdout (with --lines)
        #[arg(short, long, requires = "lines")]
        output: Option<PathBuf>,
    },

    /// Look up hashes in the hash list
    Lookup {
        /// Hashes such as 00D5CB7E6D04E32C or 00D5CB7E6D04E32C.TEMP
        #[arg(required = true)]
        hashes: Vec<String>,

        /// Hash list file (defaults to the configured one)
        #[arg(long)]
        hash_list: Option<PathBuf>,
    },

    /// Convert a binary resource to JSON
    Convert {
        /// Resource file, e.g. 00D5CB7E6D04E32C.TEMP
        #[arg(short, long)]
        source: PathBuf,

        /// Output JSON file (defaults to SOURCE.json)
        #[arg(short, long)]
        destination: Option<PathBuf>,

        /// Directory to write SOURCE.json into
        #[arg(short, long, conflicts_with = "destination")]
        out_dir: Option<PathBuf>,

        /// Resource library to load converters from
        #[arg(long)]
        resource_lib: Option<PathBuf>,

        /// Resource type (defaults to the source extension)
        #[arg(short = 't', long = "type")]
        resource_type: Option<String>,

        /// Game version: HM2016, HM2 or HM3
        #[arg(short, long)]
        game: Option<String>,

        /// Emit verbose JSON with type information
        #[arg(short, long)]
        verbose: bool,

        /// Print the JSON instead of writing a file
        #[arg(long, conflicts_with_all = ["destination", "out_dir"])]
        stdout: bool,
    },

    /// Show configuration, hash list, and resource library status
    Info {
        /// Hash list file (defaults to the configured one)
        #[arg(long)]
        hash_list: Option<PathBuf>,

        /// Resource library to inspect
        #[arg(long)]
        resource_lib: Option<PathBuf>,

        /// Game version: HM2016, HM2 or HM3
        #[arg(short, long)]
        game: Option<String>,
    },
}

impl Commands {
    pub fn execute(&self, toolkit: &Toolkit) -> anyhow::Result<()> {
        match self {
            Commands::Hash {
                input,
                md5,
                file,
                lines,
                output,
            } => hash::execute(toolkit, input, *md5, *file, *lines, output.as_deref()),
            Commands::Lookup { hashes, hash_list } => {
                lookup::execute(toolkit, hashes, hash_list.as_deref())
            }
            Commands::Convert {
                source,
                destination,
                out_dir,
                resource_lib,
                resource_type,
                game,
                verbose,
                stdout,
            } => convert::execute(
                toolkit,
                &convert::ConvertArgs {
                    source,
                    destination: destination.as_deref(),
                    out_dir: out_dir.as_deref(),
                    resource_lib: resource_lib.as_deref(),
                    resource_type: resource_type.as_deref(),
                    game: game.as_deref(),
                    verbose: *verbose,
                    stdout: *stdout,
                },
            ),
            Commands::Info {
                hash_list,
                resource_lib,
                game,
            } => info::execute(
                toolkit,
                hash_list.as_deref(),
                resource_lib.as_deref(),
                game.as_deref(),
            ),
        }
    }
}

/// Parse a `--game` value.
pub(crate) fn parse_game(
    game: Option<&str>,
) -> anyhow::Result<Option<rpkgcore::converter::plugin::GameVersion>> {
    game.map(|g| g.parse().map_err(anyhow::Error::msg))
        .transpose()
}
