use std::io::Write;

use anyhow::Context;
use colored::Colorize;
use jsonbox_server::{JsonboxServer, ServerConfig};
use jsonbox_store::{DocumentStore, FileDocumentStore};
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Usage(args) => cmd_usage(args, cli.format),
        Command::Put(args) => cmd_put(args, cli.format),
        Command::Get(args) => cmd_get(args),
    }
}

fn open_store(args: &StoreArgs) -> anyhow::Result<FileDocumentStore> {
    FileDocumentStore::open(&args.root, args.max_bytes)
        .with_context(|| format!("failed to open storage at {}", args.root.display()))
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let base = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    let config = args.apply(base);
    let server = JsonboxServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_usage(args: StoreArgs, format: OutputFormat) -> anyhow::Result<()> {
    let usage = open_store(&args)?.usage();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&usage)?),
        OutputFormat::Text => {
            println!("Storage: {}", args.root.display().to_string().bold());
            println!("  Documents: {}", usage.documents.to_string().cyan());
            println!(
                "  Used: {:.2}MB of {:.2}MB ({} bytes free)",
                usage.used_mb(),
                usage.limit_bytes as f64 / 1024.0 / 1024.0,
                usage.remaining_bytes().to_string().green()
            );
        }
    }
    Ok(())
}

fn cmd_put(args: PutArgs, format: OutputFormat) -> anyhow::Result<()> {
    let document = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let receipt = open_store(&args.store)?.put(&args.path, &document)?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "status": "success",
                "path": receipt.key.as_str(),
                "storage_used_mb": receipt.storage_used_mb(),
            })
        ),
        OutputFormat::Text => println!(
            "{} Stored {} ({} bytes, {:.2}MB used)",
            "✓".green().bold(),
            receipt.key.as_str().yellow(),
            receipt.size,
            receipt.storage_used_mb()
        ),
    }
    Ok(())
}

fn cmd_get(args: GetArgs) -> anyhow::Result<()> {
    let document = open_store(&args.store)?.get(&args.path)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&document)?;
    stdout.write_all(b"\n")?;
    Ok(())
}
