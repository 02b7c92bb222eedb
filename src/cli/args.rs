//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Inspect and edit nested JSON documents as ordered trees
#[derive(Parser, Debug)]
#[command(name = "arboreal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d -d -d)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Field holding child levels (overrides config)
    #[arg(short = 'k', long, global = true)]
    pub children_key: Option<String>,

    /// Separator for ids and index paths (overrides config)
    #[arg(short, long, global = true)]
    pub separator: Option<char>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tree outline
    Show {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Append node data to every line
        #[arg(long)]
        data: bool,
        /// Draw with box characters
        #[arg(long, conflicts_with = "data")]
        pretty: bool,
    },

    /// Show the node with the given id
    Find {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node id, e.g. 0/2/1
        id: String,
    },

    /// Resolve an index path relative to the root
    Path {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Child positions joined by the separator, e.g. /1/0
        path: String,
    },

    /// Remove a child and print the remaining tree
    Remove {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Id of the parent node
        parent: String,
        /// Child position or child id
        child: String,
    },

    /// List leaf ids
    Leaves {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print the tree as nested JSON
    Export {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show effective settings
    Config,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
