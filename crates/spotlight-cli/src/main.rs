// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Spotlight CLI
//!
//! Drives the spotlight hub over its Unix socket: open/claim/close the
//! session, send compliments, manage opt-out, or watch the community feed.

use anyhow::Result;
use clap::{Parser, Subcommand};
use spotlight_client::SessionClient;
use spotlight_proto::{
    default_socket_path, AckStatus, ChannelKind, Command, ComplimentPayload, ContributionMode,
    Delivery, Participant, ServerMessage,
};

#[derive(Parser, Debug)]
#[command(name = "spotlight", version, about = "Spotlight hub CLI")]
struct Cli {
    /// Unix socket path of the hub (defaults to the well-known path)
    #[arg(long, global = true)]
    socket: Option<String>,
    /// Participant id to identify as (required for claim/compliment/opt)
    #[arg(long, global = true)]
    id: Option<u64>,
    /// Display name that goes with --id
    #[arg(long, global = true)]
    name: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Announce a new spotlight session (admin)
    Open,
    /// Claim the open session for yourself
    Claim,
    /// Ask the hub to pick a random eligible connected participant
    Random,
    /// Send a compliment to the current spotlight
    Compliment {
        /// Send anonymously (implies a direct channel origin)
        #[arg(long)]
        anon: bool,
        /// The compliment text
        text: Vec<String>,
    },
    /// Opt out of being spotlighted
    OptOut,
    /// Opt back into spotlight selection
    OptIn,
    /// Close the session and deliver collected compliments (admin)
    Close,
    /// Close-and-deliver, then immediately re-open (admin)
    Reopen,
    /// Show the current session state
    Status,
    /// Stay connected and print notifications and deliveries
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let socket = cli
        .socket
        .clone()
        .unwrap_or_else(|| default_socket_path().display().to_string());
    let mut client = SessionClient::connect(&socket).await?;

    if let (Some(id), Some(name)) = (cli.id, cli.name.as_deref()) {
        client.hello(Participant::new(id, name)).await?;
        // consume the hello ack so it does not shadow the real reply
        let _ = client.next_message().await?;
    }

    let cmd = match &cli.command {
        Commands::Open => Command::OpenSession,
        Commands::Claim => Command::Claim,
        Commands::Random => Command::ClaimRandom,
        Commands::Compliment { anon, text } => {
            let (channel, mode) = if *anon {
                (ChannelKind::Direct, ContributionMode::Anonymous)
            } else {
                (ChannelKind::Community, ContributionMode::Public)
            };
            Command::Compliment(ComplimentPayload {
                channel,
                mode,
                text: text.join(" "),
            })
        }
        Commands::OptOut => Command::OptOut,
        Commands::OptIn => Command::OptIn,
        Commands::Close => Command::CloseSession,
        Commands::Reopen => Command::Reopen,
        Commands::Status => Command::Status,
        Commands::Watch => return watch(client).await,
    };

    match client.request(&cmd).await? {
        ServerMessage::Reply(reply) => match reply.status {
            AckStatus::Ok => {
                if let Some(message) = reply.message {
                    println!("{message}");
                }
            }
            AckStatus::Error => {
                let info = reply
                    .error
                    .map_or_else(|| "rejected".to_string(), |e| e.message);
                anyhow::bail!(info);
            }
        },
        ServerMessage::Status(status) => {
            println!("state: {}", status.state);
            if let Some(spotlight) = status.spotlight {
                println!("spotlight: {} (id {})", spotlight.display_name, spotlight.id);
            }
        }
        other => println!("{other:?}"),
    }
    Ok(())
}

/// Print broadcasts and deliveries until the hub goes away.
async fn watch(mut client: SessionClient) -> Result<()> {
    while let Some(msg) = client.next_message().await? {
        match msg {
            ServerMessage::Notification(n) => {
                println!("* {}", n.title);
                if let Some(body) = n.body {
                    println!("{body}");
                }
            }
            ServerMessage::Delivery(delivery) => print_delivery(&delivery),
            ServerMessage::Reply(_) | ServerMessage::Status(_) => {}
        }
    }
    Ok(())
}

fn print_delivery(delivery: &Delivery) {
    println!(
        "compliments for {} (id {}):",
        delivery.recipient.display_name, delivery.recipient.id
    );
    for entry in &delivery.snapshot.public {
        println!("  {}: {}", entry.author, entry.text);
    }
    for text in &delivery.snapshot.anonymous {
        println!("  (anonymous): {text}");
    }
    if delivery.snapshot.is_empty() {
        println!("  (none)");
    }
}
