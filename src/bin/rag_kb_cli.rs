//! rag-kb-cli: command-line front end for the RAG chat and items API
//!
//! Usage:
//!   rag-kb-cli ask <message> [--system <prompt>] [--stream]
//!   rag-kb-cli chat [--system <prompt>]
//!   rag-kb-cli items list
//!   rag-kb-cli items get <id>
//!   rag-kb-cli items create [--title <t>] [--text <t>] [--url <u>] [--tags a,b]
//!   rag-kb-cli items update <id> [--title <t>] [--text <t>] [--url <u>] [--tags a,b] [--state <s>]
//!   rag-kb-cli items delete <id>

use anyhow::{bail, Context};
use rag_kb_sdk::{ChatRequest, ItemPatch, NewItem, RagClient, RagClientBuilder};
use std::io::{BufRead, Write};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "ask" => cmd_ask(&args[2..]).await,
        "chat" => cmd_chat(&args[2..]).await,
        "items" => cmd_items(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("rag-kb-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        if let Some(api_err) = e.downcast_ref::<rag_kb_sdk::Error>() {
            for field in api_err.field_errors() {
                eprintln!("  - {field}");
            }
        }
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"rag-kb-cli - RAG chat and knowledge-base command-line tool

USAGE:
    rag-kb-cli <COMMAND> [OPTIONS]

COMMANDS:
    ask <message> [--system <p>] [--stream]   Ask one question
    chat [--system <p>]                       Interactive chat session
    items list                                List items
    items get <id>                            Show an item and its neighbors
    items create [--title] [--text] [--url] [--tags a,b]
    items update <id> [--title] [--text] [--url] [--tags a,b] [--state]
    items delete <id>                         Delete an item
    version                                   Show version information
    help                                      Show this help message

ENVIRONMENT:
    RAG_API_BASE_URL            API base address (default http://localhost:3000)
    RAG_API_KEY                 Credential (falls back to the OS keyring)
    RAG_PROXY_URL               Optional HTTP proxy
    RUST_LOG                    Log filter, e.g. rag_kb_sdk=debug"#
    );
}

fn client() -> anyhow::Result<RagClient> {
    RagClientBuilder::from_env()
        .build()
        .context("failed to configure client")
}

/// Value following `--name`, if present.
fn flag(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn tags(args: &[String]) -> Option<Vec<String>> {
    flag(args, "--tags").map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    })
}

fn positional(args: &[String], what: &str) -> anyhow::Result<String> {
    match args.first() {
        Some(v) if !v.starts_with("--") => Ok(v.clone()),
        _ => bail!("missing {what}"),
    }
}

async fn cmd_ask(args: &[String]) -> anyhow::Result<()> {
    let message = positional(args, "message")?;
    let mut request = ChatRequest::new(message);
    if let Some(prompt) = flag(args, "--system") {
        request = request.system_prompt(prompt);
    }
    let client = client()?;

    if has_flag(args, "--stream") {
        use futures::StreamExt;
        use rag_kb_sdk::ChatStreamEvent;

        let mut events = client.rag_chat_stream(&request).await?;
        let mut stdout = std::io::stdout();
        while let Some(event) = events.next().await {
            match event? {
                ChatStreamEvent::Delta { content } => {
                    print!("{content}");
                    stdout.flush()?;
                }
                ChatStreamEvent::Done { usage, limit, .. } => {
                    println!();
                    print_quota(usage, limit);
                }
                ChatStreamEvent::Error { message } => eprintln!("\n[stream error] {message}"),
                ChatStreamEvent::Other { .. } => {}
            }
        }
        return Ok(());
    }

    let reply = client.rag_chat(&request).await?;
    println!("{}", reply.reply);
    print_quota(reply.usage, reply.limit);
    Ok(())
}

fn print_quota(usage: Option<u64>, limit: Option<u64>) {
    if let (Some(usage), Some(limit)) = (usage, limit) {
        eprintln!("[usage {usage}/{limit}]");
    }
}

async fn cmd_chat(args: &[String]) -> anyhow::Result<()> {
    let client = client()?;
    let mut session = client.chat_session(flag(args, "--system"));
    println!("Chat session started. Commands: /history /clear /system <prompt> /quit");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear_history();
                println!("(history cleared)");
            }
            "/history" => {
                for turn in session.history() {
                    println!("{}: {}", turn.role, turn.text);
                }
            }
            _ if line.starts_with("/system ") => {
                session.set_system_prompt(line["/system ".len()..].trim());
                println!("(system prompt updated)");
            }
            _ => match session.send_message(line).await {
                Ok(reply) => println!("{}", reply.reply),
                // A failed turn is not recorded, so the user can simply retry.
                Err(e) => eprintln!("Error: {e}"),
            },
        }
    }
    Ok(())
}

async fn cmd_items(args: &[String]) -> anyhow::Result<()> {
    let client = client()?;
    let sub = args.first().map(String::as_str).unwrap_or("list");
    let rest = args.get(1..).unwrap_or(&[]);

    match sub {
        "list" => {
            let items = client.list_items().await?;
            for item in &items {
                println!(
                    "{:<12} {:<10} {}",
                    item.id.as_ref().map(|i| i.as_str()).unwrap_or("-"),
                    item.state.as_deref().unwrap_or("-"),
                    item.title.as_deref().unwrap_or("(untitled)")
                );
            }
            eprintln!("{} item(s)", items.len());
        }
        "get" => {
            let id = positional(rest, "item id")?;
            let detail = client.get_item(&id).await?;
            println!("{}", serde_json::to_string_pretty(&detail.item)?);
            if !detail.neighbors.is_empty() {
                println!("\nNeighbors:");
                for n in &detail.neighbors {
                    println!(
                        "  {} {}",
                        n.id.as_ref().map(|i| i.as_str()).unwrap_or("-"),
                        n.title.as_deref().unwrap_or("(untitled)")
                    );
                }
            }
        }
        "create" => {
            let item = NewItem {
                title: flag(rest, "--title"),
                url: flag(rest, "--url"),
                text: flag(rest, "--text"),
                tags: tags(rest),
                state: flag(rest, "--state"),
            };
            let created = client.create_item(&item).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        "update" => {
            let id = positional(rest, "item id")?;
            let patch = ItemPatch {
                title: flag(rest, "--title"),
                url: flag(rest, "--url"),
                text: flag(rest, "--text"),
                tags: tags(rest),
                state: flag(rest, "--state"),
            };
            if patch.is_empty() {
                bail!("nothing to update; pass at least one field flag");
            }
            let updated = client.update_item(&id, &patch).await?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        "delete" => {
            let id = positional(rest, "item id")?;
            let resp = client.delete_item(&id).await?;
            println!("{}", resp.message);
        }
        other => bail!("unknown items subcommand: {other}"),
    }
    Ok(())
}
