//! Command-line arguments for `chatbot`.

use std::path::PathBuf;

use chatbot_widget::bootstrap::Dependency;
use clap::{Args, Parser, Subcommand};

/// chatbot - terminal client and packager for the chat widget
#[derive(Debug, Parser)]
#[command(name = "chatbot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_enum, value_name = "LEVEL", default_value = "warn", global = true)]
    pub log_level: LogLevelArg,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Chat with the relay from the terminal
    Chat(ChatArgs),
    /// Write the standalone floating-widget script
    Bundle(BundleArgs),
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Origin of the server exposing /api/chat
    #[arg(long, value_name = "URL", default_value = "http://localhost:3000")]
    pub relay_url: String,
}

#[derive(Debug, Args)]
pub struct BundleArgs {
    /// Origin the script sends relay requests to; empty means same origin
    #[arg(long, value_name = "URL", default_value = "")]
    pub relay_origin: String,

    /// Output path
    #[arg(long, value_name = "PATH", default_value = "public/chatbot.js")]
    pub out: PathBuf,

    /// Do not load the default icon set
    #[arg(long)]
    pub no_default_dependencies: bool,

    /// Extra script to load before mounting, as NAME=URL (repeatable, loaded in order)
    #[arg(long = "dependency", value_name = "NAME=URL", value_parser = parse_dependency)]
    pub dependencies: Vec<Dependency>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to a `tracing` filter directive.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevelArg::Off => "off",
            LogLevelArg::Error => "error",
            LogLevelArg::Warn => "warn",
            LogLevelArg::Info => "info",
            LogLevelArg::Debug => "debug",
            LogLevelArg::Trace => "trace",
        }
    }
}

fn parse_dependency(raw: &str) -> Result<Dependency, String> {
    match raw.split_once('=') {
        Some((name, src)) if !name.is_empty() && !src.is_empty() => Ok(Dependency::new(name, src)),
        _ => Err(format!("expected NAME=URL, got '{raw}'")),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chat_defaults_to_local_server() {
        let cli = Cli::parse_from(["chatbot", "chat"]);
        let Commands::Chat(args) = cli.command else {
            panic!("expected chat");
        };
        assert_eq!(args.relay_url, "http://localhost:3000");
    }

    #[test]
    fn bundle_collects_dependencies_in_order() {
        let cli = Cli::parse_from([
            "chatbot",
            "bundle",
            "--relay-origin",
            "https://chat.example.com",
            "--dependency",
            "a=https://cdn.example/a.js",
            "--dependency",
            "b=https://cdn.example/b.js",
        ]);
        let Commands::Bundle(args) = cli.command else {
            panic!("expected bundle");
        };
        let names: Vec<&str> = args.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(args.out, PathBuf::from("public/chatbot.js"));
    }

    #[test]
    fn malformed_dependency_is_rejected() {
        assert!(parse_dependency("no-url").is_err());
        assert!(parse_dependency("=https://x").is_err());
    }
}
