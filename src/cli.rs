//! CLI argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Avatar sticker CLI - composites an avatar under a fixed mask.
#[derive(Parser, Debug)]
#[command(name = "sticker", version, about)]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,

    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the sticker for an identifier and save it as a PNG.
    Render(RenderArgs),
    /// Render the sticker for an identifier and copy it to the clipboard.
    Copy(CopyArgs),
    /// Read identifiers from stdin, re-rendering as the input changes.
    Watch(WatchArgs),
}

/// Arguments for `render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Identifier (defaults to the last one entered).
    pub identifier: Option<String>,

    /// Directory to save into (defaults to the configured output dir).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `copy`.
#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Identifier (defaults to the last one entered).
    pub identifier: Option<String>,
}

/// Arguments for `watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// File rewritten with the current canvas after every render.
    #[arg(short, long, default_value = "sticker-preview.png")]
    pub preview: PathBuf,

    /// Directory `:save` writes into (defaults to the configured output dir).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// A line typed in watch mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchInput {
    /// New value of the identifier field.
    Identifier(String),
    /// Save the current sticker.
    Save,
    /// Copy the current sticker to the clipboard.
    Copy,
}

impl WatchInput {
    /// Interpret one stdin line. Surrounding whitespace is ignored.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            ":save" => Self::Save,
            ":copy" => Self::Copy,
            other => Self::Identifier(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_with_identifier() {
        let cli = Cli::parse_from(["sticker", "render", "12345"]);
        match cli.command {
            Command::Render(args) => {
                assert_eq!(args.identifier.as_deref(), Some("12345"));
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn render_all_options() {
        let cli = Cli::parse_from([
            "sticker", "render", "-o", "/tmp/out", "--config", "my.toml", "-v", "987654",
        ]);
        let Command::Render(args) = cli.command else { panic!("expected render") };
        assert_eq!(args.identifier.as_deref(), Some("987654"));
        assert_eq!(args.output, Some(PathBuf::from("/tmp/out")));
        assert_eq!(cli.config.as_deref(), Some("my.toml"));
        assert!(cli.verbose);
    }

    #[test]
    fn copy_without_identifier() {
        let cli = Cli::parse_from(["sticker", "copy"]);
        let Command::Copy(args) = cli.command else { panic!("expected copy") };
        assert!(args.identifier.is_none());
    }

    #[test]
    fn watch_defaults() {
        let cli = Cli::parse_from(["sticker", "watch"]);
        let Command::Watch(args) = cli.command else { panic!("expected watch") };
        assert_eq!(args.preview, PathBuf::from("sticker-preview.png"));
        assert!(args.output.is_none());
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["sticker"]).is_err());
    }

    #[test]
    fn watch_input_parsing() {
        assert_eq!(WatchInput::parse("12345\n"), WatchInput::Identifier("12345".into()));
        assert_eq!(WatchInput::parse(""), WatchInput::Identifier(String::new()));
        assert_eq!(WatchInput::parse(" :save "), WatchInput::Save);
        assert_eq!(WatchInput::parse(":copy"), WatchInput::Copy);
    }
}
