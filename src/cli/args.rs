//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::{InputMode, TraceAlgorithm, TraversalKind};

/// Binary tree playground: build trees from arrays, lay them out, replay traversals step by step
#[derive(Parser, Debug)]
#[command(name = "treewalk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Additional config file, applied over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Array input shared by the tree commands.
#[derive(clap::Args, Debug, Clone)]
pub struct TreeInput {
    /// Array literal, e.g. "[1,2,3,null,4]"; brackets and single quotes are accepted
    pub array: String,

    /// How the array is read: level (null marks a missing child) or preorder (null ends a branch)
    #[arg(short, long)]
    pub mode: Option<InputMode>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a tree and print it
    Build {
        #[command(flatten)]
        input: TreeInput,
    },

    /// Print traversal sequences
    Traverse {
        #[command(flatten)]
        input: TreeInput,
        /// Only this traversal (default: all four)
        #[arg(short, long)]
        kind: Option<TraversalKind>,
    },

    /// Print node coordinates
    Layout {
        #[command(flatten)]
        input: TreeInput,
        /// Viewport width used for centering
        #[arg(long)]
        viewport: Option<f64>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the CALL/PROCESS/RETURN event sequence
    Trace {
        #[command(flatten)]
        input: TreeInput,
        /// Algorithm to trace
        #[arg(short, long, default_value = "inorder")]
        algo: TraceAlgorithm,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Animate a traversal or trace in the terminal
    Play {
        #[command(flatten)]
        input: TreeInput,
        /// Traversal to play
        #[arg(short, long, default_value = "inorder")]
        kind: TraversalKind,
        /// Play the recursion trace of this algorithm instead
        #[arg(short, long)]
        trace: Option<TraceAlgorithm>,
        /// Step with Enter instead of the timer
        #[arg(long)]
        manual: bool,
        /// Step interval in milliseconds (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Save an array to a slot for later import
    Save {
        /// Array literal
        array: String,
        /// Slot name
        #[arg(short, long, default_value = crate::application::DEFAULT_SLOT)]
        slot: String,
    },

    /// Build the tree stored in a slot
    Import {
        /// Slot name
        #[arg(short, long, default_value = crate::application::DEFAULT_SLOT)]
        slot: String,
        /// How the stored array is read
        #[arg(short, long)]
        mode: Option<InputMode>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Create config file template
    Init {
        /// Target file (default: global config path)
        #[arg(value_hint = ValueHint::FilePath)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
