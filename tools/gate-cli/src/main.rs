//! gate-cli: command-line client for the Streamgate gateway.
//!
//! An external tool with the same access level as any browser client: it
//! signs plaintext messages with a local wallet key and calls the gateway's
//! public routes with the resulting credential headers.
//!
//! ## Usage
//!
//! ```bash
//! # Mint a throwaway wallet
//! gate-cli keygen
//!
//! # Publish a catalog entry as that wallet
//! gate-cli publish --key 0x... '{"id":"vid-1","title":"first"}'
//!
//! # Read the public catalog
//! gate-cli catalog
//! ```

mod client;
mod wallet;

use anyhow::Result;
use clap::{Parser, Subcommand};

use client::{GatewayClient, Reply};
use wallet::Wallet;

/// Streamgate command-line client
#[derive(Parser, Debug)]
#[command(name = "gate-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Gateway base URL
    #[arg(short, long, default_value = "http://127.0.0.1:8787")]
    endpoint: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a throwaway wallet keypair
    Keygen,
    /// Print the three credential headers for a signed message
    Sign {
        /// Private key, 32-byte hex
        #[arg(short, long)]
        key: String,
        /// Plaintext message to sign
        #[arg(short, long, default_value = "streamgate login")]
        message: String,
    },
    /// List the published catalog
    Catalog,
    /// Publish a catalog entry as the signing wallet
    Publish {
        /// Private key, 32-byte hex
        #[arg(short, long)]
        key: String,
        /// Plaintext message to sign
        #[arg(short, long, default_value = "streamgate login")]
        message: String,
        /// JSON object describing the video
        entry: String,
    },
    /// Open a direct-upload slot for the signing wallet
    UploadLink {
        /// Private key, 32-byte hex
        #[arg(short, long)]
        key: String,
        /// Plaintext message to sign
        #[arg(short, long, default_value = "streamgate login")]
        message: String,
    },
    /// Fetch provider metadata for one video
    Video {
        /// Video id
        id: String,
    },
    /// Mint a playback credential from a capability token
    Playback {
        /// Compact capability token
        #[arg(short, long)]
        capability: String,
    },
    /// Gateway health and counters
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = GatewayClient::new(&args.endpoint)?;

    match args.command {
        Command::Keygen => {
            let wallet = Wallet::generate();
            println!("address:     {}", wallet.address);
            println!("private key: {}", wallet.private_key_hex());
        }
        Command::Sign { key, message } => {
            let wallet = Wallet::from_hex(&key)?;
            for line in wallet.sign_headers(&message)?.lines() {
                println!("{line}");
            }
        }
        Command::Catalog => {
            print_reply(&client.get("/kv/videos").await?)?;
        }
        Command::Publish {
            key,
            message,
            entry,
        } => {
            let wallet = Wallet::from_hex(&key)?;
            let headers = wallet.sign_headers(&message)?;
            print_reply(&client.post_signed("/kv/videos", &headers, entry).await?)?;
        }
        Command::UploadLink { key, message } => {
            let wallet = Wallet::from_hex(&key)?;
            let headers = wallet.sign_headers(&message)?;
            print_reply(&client.get_signed("/upload/link", &headers).await?)?;
        }
        Command::Video { id } => {
            print_reply(&client.get(&format!("/videos/{id}")).await?)?;
        }
        Command::Playback { capability } => {
            print_reply(
                &client
                    .get_with_capability("/videos/presigned-url", &capability)
                    .await?,
            )?;
        }
        Command::Health => {
            print_reply(&client.get("/health").await?)?;
        }
    }

    Ok(())
}

/// Print a gateway reply, pretty-printing JSON bodies, and fail the
/// invocation on non-2xx statuses.
fn print_reply(reply: &Reply) -> Result<()> {
    match serde_json::from_str::<serde_json::Value>(&reply.body) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{}", reply.body),
        },
        Err(_) => println!("{}", reply.body),
    }

    if reply.status.is_success() {
        Ok(())
    } else {
        anyhow::bail!("gateway returned {}", reply.status)
    }
}
