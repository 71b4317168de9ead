use clap::Parser;

/// clipsum – concatenate dropped files and copy the result to the clipboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or folders to add, as the drag-and-drop transport would
    /// deliver them (quoting is stripped).
    #[arg(value_name = "PATHS")]
    pub paths: Vec<String>,

    /// Headless mode: filter, aggregate and copy everything eligible
    /// without opening the interactive list.
    #[arg(long)]
    pub all: bool,

    /// Print the aggregated output instead of touching the clipboard.
    #[arg(long)]
    pub dry_run: bool,

    /// Session override: plain comment headers instead of structured
    /// blocks (does not change the saved setting).
    #[arg(long)]
    pub plain: bool,

    /// Session override: leave file paths out of the headers.
    #[arg(long)]
    pub no_filepath: bool,

    /// In headless mode, accept unknown extensions instead of skipping
    /// them (there is nobody to ask).
    #[arg(long)]
    pub allow_unknown: bool,
}
