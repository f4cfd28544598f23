//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::{ContextId, Direction, FieldId, FieldKind, ParentRef, ReceiverId, StepId};

/// Questionnaire field tree manager: ordered fields, options, trigger fields and templates
#[derive(Parser, Debug)]
#[command(name = "formtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Document store (overrides config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    /// Directory holding a local .formtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the questionnaire (or template library) as a tree
    Tree {
        /// Restrict to one step
        #[arg(long)]
        step: Option<StepId>,
        /// Show the template library instead
        #[arg(long)]
        templates: bool,
    },

    /// List every field of a step in pre-order
    Flatten {
        step: StepId,
    },

    /// Show the ancestor chain of a field, outermost first
    Ancestors {
        field: FieldId,
    },

    /// List fields an option of FIELD may point at as trigger
    Triggers {
        field: FieldId,
    },

    /// Create, delete and move fields
    Field {
        #[command(subcommand)]
        command: FieldCommands,
    },

    /// Edit the options of a choice field (saved with the field)
    #[command(name = "option")]
    Options {
        #[command(subcommand)]
        command: OptionCommands,
    },

    /// Clear dangling or cyclic triggers and report broken ordering
    Validate {
        /// Persist fields whose triggers were cleared
        #[arg(long)]
        fix: bool,
    },

    /// Manage contexts and their receivers
    Context {
        #[command(subcommand)]
        command: ContextCommands,
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
pub enum FieldCommands {
    /// Add a field below PARENT (step:<id>, field:<id> or library)
    Add {
        parent: ParentRef,
        label: String,
        /// Field type
        #[arg(short = 't', long = "type")]
        kind: FieldKind,
    },

    /// Embed a template below PARENT as a reference
    FromTemplate {
        parent: ParentRef,
        template: FieldId,
    },

    /// Add a template to the library
    Template {
        label: String,
        #[arg(short = 't', long = "type")]
        kind: FieldKind,
        /// Template group to add into (default: top level)
        #[arg(long)]
        group: Option<FieldId>,
    },

    /// Delete a field and its subtree
    Delete {
        id: FieldId,
    },

    /// Move a field among its siblings
    Move {
        id: FieldId,
        #[arg(value_enum)]
        direction: MoveDirection,
    },
}

#[derive(Subcommand, Debug)]
pub enum OptionCommands {
    /// Append an option
    Add {
        field: FieldId,
        #[arg(short, long, default_value = "")]
        label: String,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        score: i32,
    },

    /// Delete the option at INDEX
    Delete {
        field: FieldId,
        index: usize,
    },

    /// Swap the option at INDEX with its neighbour
    Move {
        field: FieldId,
        index: usize,
        #[arg(value_enum)]
        direction: MoveDirection,
    },

    /// Point the option at a trigger field (omit TRIGGER to clear)
    Trigger {
        field: FieldId,
        index: usize,
        trigger: Option<FieldId>,
    },

    /// Set the score points of the option
    Score {
        field: FieldId,
        index: usize,
        #[arg(allow_negative_numbers = true)]
        points: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContextCommands {
    /// List contexts with their receivers
    List,

    /// Create a context on the default questionnaire
    Add {
        name: String,
    },

    /// Delete a context
    Delete {
        id: ContextId,
    },

    /// Move a context among its siblings
    Move {
        id: ContextId,
        #[arg(value_enum)]
        direction: MoveDirection,
    },

    /// Select or unselect a receiver, then save the context
    Receiver {
        context: ContextId,
        receiver: ReceiverId,
    },

    /// Swap the selected receiver at INDEX with its neighbour, then save
    MoveReceiver {
        context: ContextId,
        index: usize,
        #[arg(value_enum)]
        direction: MoveDirection,
    },

    /// List receivers not selected for the context
    Unselected {
        context: ContextId,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(direction: MoveDirection) -> Self {
        match direction {
            MoveDirection::Up => Direction::Up,
            MoveDirection::Down => Direction::Down,
        }
    }
}
