use anyhow::Result;
use clap::Parser;
use colored::*;
use futures_util::StreamExt;
use palaver_client::{ChatSession, ChunkKind, RelayClient};
use palaver_common::{ASSISTANT_NAME, ChatHistory, MessageRole, RelayConfig};
use regex::Regex;
use std::io::{self, Write};
use std::path::PathBuf;
use termimad::MadSkin;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Streaming cursor appended while a response is still arriving
const STREAM_CURSOR: &str = "▌";

/// Command-line arguments for the Palaver CLI
#[derive(Parser)]
#[command(
    name = "palaver",
    about = "Palaver - terminal chat over a task-queue generation API"
)]
pub struct Args {
    /// Path to a TOML relay configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Override the task insertion endpoint
    #[clap(long)]
    insert_url: Option<String>,

    /// Override the output polling endpoint
    #[clap(long)]
    output_url: Option<String>,

    /// Send a single prompt, print the response, and exit
    #[clap(long)]
    once: Option<String>,

    /// Enable debug mode
    #[clap(short, long)]
    debug: bool,
}

/// Replace Markdown links with OSC 8 hyperlinks for supported terminals.
fn add_osc8_hyperlinks(input: &str) -> String {
    let re = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let text = &caps[1];
        let url = &caps[2];
        format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, text)
    })
    .to_string()
}

/// Re-render the whole transcript with markdown formatting.
fn render_history(history: &ChatHistory, skin: &MadSkin) {
    if history.is_empty() {
        println!("{}", "No messages yet.".bright_black());
        return;
    }
    for message in history.messages() {
        let label = match message.role {
            MessageRole::User => "You".bright_cyan().bold(),
            MessageRole::Assistant => ASSISTANT_NAME.bright_green().bold(),
            MessageRole::System => "System".red().bold(),
        };
        println!(
            "{} {}",
            label,
            format!("[{}]", message.timestamp.format("%H:%M:%S")).bright_black()
        );
        let formatted = add_osc8_hyperlinks(&message.content);
        println!("{}", skin.term_text(&formatted));
    }
}

/// Stream one response to the terminal and record it in the session.
async fn stream_to_terminal(session: &mut ChatSession, prompt: &str) -> Result<()> {
    print!("{}", format!("{}: ", ASSISTANT_NAME).bright_green().bold());
    io::stdout().flush()?;

    let mut stream = session.send(prompt);
    let mut shown = String::new();
    let mut cursor_visible = false;

    while let Some(chunk) = stream.next().await {
        if cursor_visible {
            // Back over the cursor so new text overwrites it.
            print!("\u{8} \u{8}");
            cursor_visible = false;
        }
        match chunk.kind {
            ChunkKind::Text => {
                print!("{}", chunk.content);
                print!("{}", STREAM_CURSOR.bright_black());
                cursor_visible = true;
            }
            ChunkKind::Error | ChunkKind::Timeout => {
                print!("{}", chunk.content.as_str().red());
            }
            ChunkKind::Complete => {}
        }
        shown.push_str(&chunk.content);
        io::stdout().flush()?;
    }

    if cursor_visible {
        print!("\u{8} \u{8}");
    }
    println!();
    io::stdout().flush()?;

    session.record_response(shown);
    Ok(())
}

/// Main conversation loop against the relay
async fn conversation_loop(mut session: ChatSession) -> Result<()> {
    println!(
        "{}",
        format!(
            "💬 Chatting with {}. Type 'quit' or 'exit' to stop.",
            ASSISTANT_NAME
        )
        .bright_green()
    );
    println!(
        "{}",
        "Type '/history' to re-render the transcript.".bright_yellow()
    );
    println!();

    let skin = MadSkin::default();

    loop {
        print!("{}", "You: ".bright_cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // stdin closed
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" => {
                println!("{}", "👋 Goodbye!".bright_green());
                break;
            }
            "/history" => {
                render_history(session.history(), &skin);
                continue;
            }
            _ => {}
        }

        stream_to_terminal(&mut session, input).await?;
        println!();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => RelayConfig::load(path)?,
        None => RelayConfig::default(),
    };
    if let Some(url) = args.insert_url {
        config.insert_url = url;
    }
    if let Some(url) = args.output_url {
        config.output_url = url;
    }

    info!("Starting Palaver CLI");
    info!("Insert endpoint: {}", config.insert_url);
    info!("Output endpoint: {}", config.output_url);

    let client = RelayClient::new(config)?;
    let mut session = ChatSession::new(client);

    if let Some(prompt) = args.once {
        println!("{} {}", "You:".bright_cyan().bold(), prompt);
        stream_to_terminal(&mut session, &prompt).await?;
        return Ok(());
    }

    conversation_loop(session).await
}
