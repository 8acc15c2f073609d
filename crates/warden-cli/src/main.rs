//! Chat Warden CLI - inspect the trust & safety layer from the terminal

use clap::Parser;

use warden_context::{ContextSnippet, ContextValidator};
use warden_output::{sanitize_html, sanitize_text, sanitize_url};
use warden_prompt::{InjectionDetector, PromptSanitizer};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Chat Warden - Trust & Safety Layer for AI Chat")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Scan text for prompt injection patterns
    Scan {
        /// The text to scan
        text: String,
    },
    /// Sanitize a value for browser rendering
    Sanitize {
        /// What kind of value this is: html, text, or url
        #[arg(short, long, default_value = "html")]
        mode: String,
        /// The value to sanitize
        value: String,
    },
    /// Assess a model response for hallucination risk
    Assess {
        /// The model response
        response: String,
        /// The original user query
        #[arg(short, long, default_value = "")]
        query: String,
        /// Context snippet (repeatable)
        #[arg(short, long = "snippet")]
        snippets: Vec<String>,
    },
    /// Show warden status
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    match cli.command {
        Some(Commands::Scan { text }) => {
            let sanitized = PromptSanitizer::new().sanitize(&text);
            let verdict = InjectionDetector::new().detect(&sanitized);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Some(Commands::Sanitize { mode, value }) => match mode.as_str() {
            "html" => println!("{}", sanitize_html(&value)),
            "text" => println!("{}", sanitize_text(&value)),
            "url" => println!("{}", sanitize_url(&value)),
            other => anyhow::bail!("unknown sanitize mode: {other} (expected html, text, or url)"),
        },
        Some(Commands::Assess {
            response,
            query,
            snippets,
        }) => {
            let snippets: Vec<ContextSnippet> = snippets
                .into_iter()
                .map(|text| ContextSnippet::new(text, 0.5))
                .collect();
            let assessment = ContextValidator::new().assess(&response, &snippets, &query);
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }
        Some(Commands::Status) => {
            println!("Chat Warden v0.1.0: READY");
        }
        None => {
            println!("Chat Warden v0.1.0 - Use --help for commands");
        }
    }

    Ok(())
}
