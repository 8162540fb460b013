use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use seaweed_client::{FileLocator, FilerClient, SeaweedClient};
use seaweed_core::models::{AssignOptions, ListOptions, Replication};
use seaweed_core::parse_volume_id;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use seaweed_cli::{entry_line, init_tracing, parse_tag, print_json};

#[derive(Parser, Debug)]
#[command(name = "weed-client")]
#[command(about = "Store, fetch and list objects on a SeaweedFS cluster")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Master(MasterCommand),

    /// List a filer directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
        /// Entries per request
        #[arg(long, default_value_t = 100)]
        limit: u32,
        /// Only names matching this pattern (* and ?)
        #[arg(long)]
        pattern: Option<String>,
        /// Skip names matching this pattern (* and ?)
        #[arg(long)]
        exclude: Option<String>,
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage Seaweed- tags on a filer path
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },
}

/// Commands served by the master and volume servers.
#[derive(Subcommand, Debug)]
enum MasterCommand {
    /// Reserve a file id on the master
    Assign {
        #[arg(long)]
        count: Option<u32>,
        #[arg(long)]
        collection: Option<String>,
        /// Replica placement: 000, 001, 010, 100, 200 or 110
        #[arg(long)]
        replication: Option<Replication>,
        /// Time to live, e.g. 3m, 4h, 5d
        #[arg(long)]
        ttl: Option<String>,
    },

    /// Show the volume servers hosting a volume id or file id
    Lookup { id: String },

    /// Upload a local file under a newly assigned file id
    Upload {
        file: PathBuf,
        #[arg(long)]
        collection: Option<String>,
        #[arg(long)]
        replication: Option<Replication>,
    },

    /// Download an object to stdout or a file
    Get {
        fid: String,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Volume server to use instead of asking the master
        #[arg(long)]
        volume_url: Option<String>,
        /// Use the volume server's public address
        #[arg(long)]
        public: bool,
    },

    /// Delete an object
    Delete {
        fid: String,
        #[arg(long)]
        volume_url: Option<String>,
    },

    /// Show master and cluster status
    Status {
        /// Also show this volume server's disks and volumes (host:port)
        #[arg(long)]
        server: Option<String>,
    },

    /// Compact volumes above a garbage ratio
    Vacuum {
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[derive(Subcommand, Debug)]
enum TagAction {
    /// Set tags given as Seaweed-Name=value
    Set {
        path: String,
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Remove the named tags, or every Seaweed- tag when none are named
    Remove { path: String, names: Vec<String> },
    /// Show the tags set on a path
    List { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Command::Tag { action } => run_tag(filer(&token)?, action).await,
        Command::Ls {
            path,
            limit,
            pattern,
            exclude,
            json,
        } => {
            let options = ListOptions {
                limit: Some(limit),
                name_pattern: pattern,
                name_pattern_exclude: exclude,
                ..ListOptions::default()
            };
            let mut pages = filer(&token)?
                .list_entries(&path, options)
                .with_context(|| format!("Invalid listing of {}", path))?;

            let mut all = Vec::new();
            while let Some(page) = pages.next().await {
                let page = page.with_context(|| format!("Failed to list {}", path))?;
                if json {
                    all.extend(page);
                } else {
                    for entry in &page {
                        println!("{}", entry_line(entry));
                    }
                }
            }
            if json {
                print_json(&all)?;
            }
            Ok(())
        }
        Command::Master(command) => run_master(master(&token)?, command).await,
    }
}

fn master(token: &CancellationToken) -> Result<SeaweedClient> {
    let client = SeaweedClient::from_env().context("Failed to configure master client")?;
    Ok(client.with_cancellation(token.clone()))
}

fn filer(token: &CancellationToken) -> Result<FilerClient> {
    let client = FilerClient::from_env().context("Failed to configure filer client")?;
    Ok(client.with_cancellation(token.clone()))
}

async fn run_master(client: SeaweedClient, command: MasterCommand) -> Result<()> {
    match command {
        MasterCommand::Assign {
            count,
            collection,
            replication,
            ttl,
        } => {
            let assigned = client
                .assign(&AssignOptions {
                    count,
                    collection,
                    replication,
                    ttl,
                    ..AssignOptions::default()
                })
                .await
                .context("Failed to assign a file id")?;
            print_json(&assigned)
        }

        MasterCommand::Lookup { id } => {
            let volume_id = if id.contains(',') {
                parse_volume_id(&id)?
            } else {
                id.parse::<u32>()
                    .with_context(|| format!("'{}' is neither a volume id nor a file id", id))?
            };
            let locations = client.resolve(volume_id).await?;
            print_json(&locations)
        }

        MasterCommand::Upload {
            file,
            collection,
            replication,
        } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let assigned = client
                .assign(&AssignOptions {
                    collection,
                    replication,
                    ..AssignOptions::default()
                })
                .await
                .context("Failed to assign a file id")?;
            let written = client
                .write(&assigned.fid, &assigned.url, data, &filename)
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;

            print_json(&serde_json::json!({
                "fid": assigned.fid,
                "url": assigned.url,
                "publicUrl": assigned.public_url,
                "name": written.name,
                "size": written.size,
                "eTag": written.e_tag,
            }))
        }

        MasterCommand::Get {
            fid,
            output,
            volume_url,
            public,
        } => {
            let mut locator = FileLocator::new(&fid);
            locator.volume_url = volume_url;
            locator.public = public;

            let mut stream = client.get_stream(&locator).await?;
            let mut sink: Box<dyn tokio::io::AsyncWrite + Unpin> = match &output {
                Some(path) => Box::new(
                    tokio::fs::File::create(path)
                        .await
                        .with_context(|| format!("Failed to create {}", path.display()))?,
                ),
                None => Box::new(tokio::io::stdout()),
            };

            while let Some(chunk) = stream.next().await {
                sink.write_all(&chunk?).await?;
            }
            sink.flush().await?;
            Ok(())
        }

        MasterCommand::Delete { fid, volume_url } => {
            let mut locator = FileLocator::new(&fid);
            locator.volume_url = volume_url;
            let deleted = client.delete(&locator).await?;
            print_json(&deleted)
        }

        MasterCommand::Status { server } => {
            let health = client.cluster_health().await?;
            let status = client.cluster_status().await?;
            print_json(&serde_json::json!({
                "master": client.master_url(),
                "health": health,
                "cluster": status,
            }))?;

            if let Some(server) = server {
                let volume_status = client
                    .volume_server_status(&server)
                    .await
                    .with_context(|| format!("Failed to read status of {}", server))?;
                print_json(&volume_status)?;
            }
            Ok(())
        }

        MasterCommand::Vacuum { threshold } => {
            let topology = client.vacuum(threshold).await?;
            print_json(&topology)
        }
    }
}

async fn run_tag(client: FilerClient, action: TagAction) -> Result<()> {
    match action {
        TagAction::Set { path, tags } => {
            let tags = tags
                .iter()
                .map(|raw| parse_tag(raw))
                .collect::<Result<Vec<_>>>()?;
            let count = tags.len();
            client.set_tags(&path, tags).await?;
            println!("Set {} tag(s) on {}", count, path);
            Ok(())
        }
        TagAction::Remove { path, names } => {
            client.remove_tags(&path, &names).await?;
            if names.is_empty() {
                println!("Removed all tags from {}", path);
            } else {
                println!("Removed {} from {}", names.join(", "), path);
            }
            Ok(())
        }
        TagAction::List { path } => {
            let tags = client.get_tags(&path).await?;
            print_json(&tags)
        }
    }
}
