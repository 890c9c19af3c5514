//! `chatbot` – terminal client and standalone-script packager.

mod cli;

use anyhow::Context;
use chatbot_types::Message;
use chatbot_widget::bootstrap::StandaloneBundle;
use chatbot_widget::format;
use chatbot_widget::render::{EMPTY_PROMPT, title};
use chatbot_widget::{ChatWidget, HttpRelayClient, Variant, WidgetEvent};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::cli::{BundleArgs, ChatArgs, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the conversation.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.as_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat(args) => chat(args).await,
        Commands::Bundle(args) => bundle(args).await,
    }
}

async fn chat(args: ChatArgs) -> anyhow::Result<()> {
    let client = HttpRelayClient::new(&args.relay_url);
    info!(endpoint = client.endpoint(), "chat session started");

    let mut widget = ChatWidget::new(Variant::FullScreen);
    widget.subscribe(|event| {
        if let WidgetEvent::MessageAppended { message, .. } = event {
            if let Some(line) = transcript_line(message) {
                println!("{line}\n");
            }
        }
    });

    println!("{} (type /quit to leave)\n{EMPTY_PROMPT}\n", title(Variant::FullScreen));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim() == "/quit" {
            break;
        }
        widget.set_input(line);
        widget.send(&client).await;
    }

    info!(messages = widget.messages().len(), "chat session ended");
    Ok(())
}

/// Bot messages are formatted for the terminal. The user's own input is
/// already on screen.
fn transcript_line(message: &Message) -> Option<String> {
    if message.is_user() {
        None
    } else {
        Some(format!("bot> {}", format::parse(&message.content).to_plain_text()))
    }
}

async fn bundle(args: BundleArgs) -> anyhow::Result<()> {
    let mut bundle = StandaloneBundle::new(args.relay_origin.as_str());
    if args.no_default_dependencies {
        bundle = bundle.without_dependencies();
    }
    for dependency in args.dependencies {
        bundle = bundle.dependency(dependency);
    }
    let script = bundle.render().context("rendering standalone script")?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(&args.out, script)
        .await
        .with_context(|| format!("writing {}", args.out.display()))?;

    info!(
        out = %args.out.display(),
        relay_origin = bundle.relay_origin(),
        dependencies = bundle.dependencies().len(),
        "standalone script written"
    );
    Ok(())
}
