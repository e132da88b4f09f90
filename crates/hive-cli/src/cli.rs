//! Clap CLI definitions for the `hive` command.

use clap::{Args, Parser, Subcommand};

/// hive -- browse and edit the row store's blob namespace.
#[derive(Parser, Debug)]
#[command(
    name = "hive",
    about = "Browse and edit the row store's blob namespace",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Row database path (default resolved via config).
    #[arg(long, global = true)]
    pub path: Option<String>,

    /// Actor name attributed to writes (default: $HIVE_ACTOR, $USER, "unknown").
    #[arg(long, global = true, env = "HIVE_ACTOR")]
    pub actor: Option<String>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug logging.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List entries underneath a path (root if omitted).
    Ls(LsArgs),

    /// Get the value stored at a path.
    Get(GetArgs),

    /// Delete the value stored at a path.
    Rm(RmArgs),

    /// Set or create the value at a path.
    Edit(EditArgs),
}

/// Arguments for `hive ls`.
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Path to list (root if omitted).
    pub path: Option<String>,
}

/// Arguments for `hive get`.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Path to read.
    pub path: String,
}

/// Arguments for `hive rm`.
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Path to delete.
    pub path: String,
}

/// Arguments for `hive edit`.
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Path to edit.
    pub path: String,

    /// JSON value to set (mutually exclusive with `--editor`/`--file`).
    pub value: Option<String>,

    /// Open $VISUAL or $EDITOR on a temp file to produce the value.
    #[arg(long, conflicts_with_all = ["file"])]
    pub editor: bool,

    /// Read the JSON value from a file.
    #[arg(short = 'f', long)]
    pub file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_ls_with_no_path() {
        let cli = Cli::try_parse_from(["hive", "ls"]).unwrap();
        assert!(matches!(cli.command, Commands::Ls(LsArgs { path: None })));
    }

    #[test]
    fn cli_parses_ls_with_path() {
        let cli = Cli::try_parse_from(["hive", "ls", "cortex"]).unwrap();
        match cli.command {
            Commands::Ls(args) => assert_eq!(args.path.as_deref(), Some("cortex")),
            _ => panic!("expected Ls"),
        }
    }

    #[test]
    fn cli_parses_edit_with_inline_value() {
        let cli = Cli::try_parse_from(["hive", "edit", "a/b", "{\"x\":1}"]).unwrap();
        match cli.command {
            Commands::Edit(args) => {
                assert_eq!(args.path, "a/b");
                assert_eq!(args.value.as_deref(), Some("{\"x\":1}"));
                assert!(!args.editor);
            }
            _ => panic!("expected Edit"),
        }
    }

    #[test]
    fn cli_parses_edit_with_editor_flag() {
        let cli = Cli::try_parse_from(["hive", "edit", "a/b", "--editor"]).unwrap();
        match cli.command {
            Commands::Edit(args) => assert!(args.editor),
            _ => panic!("expected Edit"),
        }
    }

    #[test]
    fn cli_global_json_flag() {
        let cli = Cli::try_parse_from(["hive", "--json", "get", "a"]).unwrap();
        assert!(cli.global.json);
    }
}
