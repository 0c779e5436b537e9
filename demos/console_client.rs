//! Console client - minimal login-and-listen session.
//!
//! This example demonstrates:
//! - Subscribing to server messages before connecting
//! - Capturing the session token from `AuthToken`
//! - Sending typed messages with `client.send()`
//!
//! Run against a local server:
//!
//! ```sh
//! cargo run --example console_client -- <username> <password>
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use flotilla_client::{Client, Message, MessageType};

const SERVER_HOST: &str = "127.0.0.1";
const SERVER_PORT: u16 = 9090;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = env::args().skip(1);
    let username = args.next().unwrap_or_else(|| "guest".into());
    let password = args.next().unwrap_or_else(|| "guest".into());

    let client = Arc::new(tokio::sync::Mutex::new(Client::new()));

    // Channel to hand the token from the reader task back to main.
    let (token_tx, mut token_rx) = tokio::sync::mpsc::channel::<String>(1);

    {
        let client = client.lock().await;

        client.subscribe(MessageType::AuthToken, move |msg| {
            if let Message::AuthToken { token } = msg {
                let _ = token_tx.try_send(token.clone());
            }
        });
        client.subscribe(MessageType::AuthSuccess, |msg| {
            if let Message::AuthSuccess { username } = msg {
                println!("logged in as {username}");
            }
        });
        client.subscribe(MessageType::AuthFailed, |msg| {
            if let Message::AuthFailed { reason } = msg {
                eprintln!("login failed: {reason}");
            }
        });
        client.subscribe(MessageType::ChatMessage, |msg| {
            if let Message::ChatMessage { username, text } = msg {
                println!("<{username}> {text}");
            }
        });
        client.subscribe(MessageType::OnlinePlayersList, |msg| {
            if let Message::OnlinePlayersList { players, .. } = msg {
                println!("{} players online:", players.len());
                for p in players {
                    println!("  {} ({}, {})", p.username, p.elo_rating, p.rank);
                }
            }
        });
    }

    {
        let mut client = client.lock().await;
        client.connect(SERVER_HOST, SERVER_PORT).await?;
        client
            .send(&Message::Login { username, password })
            .await?;
    }

    // Wait for the server to issue a session token, then use it.
    match tokio::time::timeout(Duration::from_secs(5), token_rx.recv()).await {
        Ok(Some(token)) => {
            let client = client.lock().await;
            client.set_token(token);
            client.send(&Message::GetOnlinePlayers).await?;
        }
        _ => eprintln!("no session token received"),
    }

    // Listen for a while, then leave cleanly.
    tokio::time::sleep(Duration::from_secs(30)).await;

    let mut client = client.lock().await;
    if client.is_connected() {
        client.send(&Message::Logout).await.ok();
    }
    client.disconnect().await;

    Ok(())
}
