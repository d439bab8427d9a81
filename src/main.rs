//! Main entry point for the zipgrab CLI.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::fs;

use zipgrab::cli::Cli;
use zipgrab::{
    ArchiveLocation, ExtractOptions, HttpTransport, MemberEntry, RemoteZip, Transport,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut location = ArchiveLocation::parse(&cli.url)?;
    if let Some(ref ua) = cli.user_agent {
        location = location.with_user_agent(ua.clone());
    }

    let transport = Arc::new(HttpTransport::new()?);
    let archive = RemoteZip::connect(transport, location).await?;

    if cli.list || cli.verbose {
        return list_members(&archive, cli.verbose).await;
    }

    let entries = archive.entries().await?;
    let selected: Vec<_> = entries
        .iter()
        .filter(|e| !e.is_directory && is_selected(e, &cli.members))
        .collect();

    for entry in selected {
        extract_member(&archive, entry, &cli).await?;
    }

    Ok(())
}

/// An entry is selected when no member arguments were given, or when one
/// of them equals its full path or its basename.
fn is_selected(entry: &MemberEntry, members: &[String]) -> bool {
    if members.is_empty() {
        return true;
    }
    let basename = Path::new(&entry.name)
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    members
        .iter()
        .any(|m| entry.name == *m || basename == *m)
}

async fn list_members<T: Transport>(archive: &RemoteZip<T>, verbose: bool) -> Result<()> {
    let entries = archive.entries().await?;

    if !verbose {
        for entry in &entries {
            println!("{}", entry.name);
        }
        return Ok(());
    }

    println!("{:>10}  {:>10}  {:>5}  Name", "Length", "Size", "Cmpr");
    println!("{}", "-".repeat(50));

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in &entries {
        let ratio = if entry.uncompressed_size > 0 {
            format!(
                "{:>4}%",
                100 - (entry.compressed_size * 100 / entry.uncompressed_size)
            )
        } else {
            "  0%".to_string()
        };
        println!(
            "{:>10}  {:>10}  {}  {}",
            entry.uncompressed_size, entry.compressed_size, ratio, entry.name
        );

        if !entry.is_directory {
            total_uncompressed += entry.uncompressed_size;
            total_compressed += entry.compressed_size;
            file_count += 1;
        }
    }

    println!("{}", "-".repeat(50));
    println!(
        "{:>10}  {:>10}         {} files",
        total_uncompressed, total_compressed, file_count
    );

    Ok(())
}

async fn extract_member<T: Transport>(
    archive: &RemoteZip<T>,
    entry: &MemberEntry,
    cli: &Cli,
) -> Result<()> {
    let output_path = match cli.extract_dir {
        Some(ref dir) => PathBuf::from(dir).join(&entry.name),
        None => PathBuf::from(&entry.name),
    };

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    if !cli.quiet {
        println!("  extracting: {}", entry.name);
    }

    let mut file = fs::File::create(&output_path).await?;
    archive
        .extract(entry, &mut file, &ExtractOptions::default())
        .await?;

    Ok(())
}
