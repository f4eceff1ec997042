//! graph-cli - Lightweight Microsoft Graph client
//!
//! Interactive console client for Graph mail and directory operations,
//! signing in with the OAuth2 device code flow.

mod api;
mod auth;
mod config;
mod error;
mod graph;
mod models;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;
use crate::graph::Graph;

#[derive(Parser)]
#[command(name = "graph-cli")]
#[command(about = "Lightweight CLI client for Microsoft Graph mail and directory", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let settings = Settings::load()?;

    let mut graph = Graph::new();
    graph.init_user_auth(
        settings,
        Arc::new(|info| {
            println!();
            println!("{}", info.message);
            println!();
        }),
    )?;

    greet_user(&graph).await;

    loop {
        println!();
        println!("Please choose one of the following options:");
        println!("0. Exit");
        println!("1. Display access token");
        println!("2. List my inbox");
        println!("3. Send mail to myself");
        println!("4. List users (requires app-only auth)");
        println!("5. Probe notebooks");
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        match line.trim() {
            "0" => break,
            "1" => display_access_token(&graph).await,
            "2" => list_inbox(&graph).await,
            "3" => send_mail_to_self(&graph).await,
            "4" => list_users(&mut graph).await,
            "5" => probe_notebooks(&graph).await,
            "" => {}
            other => println!("Invalid choice: {}", other),
        }
    }

    println!("Goodbye.");
    Ok(())
}

async fn greet_user(graph: &Graph) {
    match graph.current_user().await {
        Ok(user) => {
            println!();
            println!("Hello, {}!", user.display_name.as_deref().unwrap_or("user"));
            // For Work/school accounts, email is in mail property
            // Personal accounts, email is in userPrincipalName
            let email = user.mail.or(user.user_principal_name);
            println!("Email: {}", email.as_deref().unwrap_or("(none)"));
        }
        Err(e) => println!("Error getting user: {}", e),
    }
}

async fn display_access_token(graph: &Graph) {
    match graph.user_token().await {
        Ok(token) => println!("User token: {}", token),
        Err(e) => println!("Error getting user access token: {}", e),
    }
}

async fn list_inbox(graph: &Graph) {
    let page = match graph.inbox().await {
        Ok(page) => page,
        Err(e) => {
            println!("Error getting user's inbox: {}", e);
            return;
        }
    };

    for message in &page.value {
        println!(
            "Message: {}",
            message.subject.as_deref().unwrap_or("NO SUBJECT")
        );
        let from = message
            .from
            .as_ref()
            .and_then(|r| r.email_address.name.as_deref().or(r.email_address.address.as_deref()));
        println!("  From: {}", from.unwrap_or("UNKNOWN"));
        println!(
            "  Status: {}",
            match message.is_read {
                Some(true) => "Read",
                _ => "Unread",
            }
        );
        println!(
            "  Received: {}",
            message.received_date_time.as_deref().unwrap_or("unknown")
        );
    }

    println!();
    println!("More messages available? {}", page.next_link.is_some());
}

async fn send_mail_to_self(graph: &Graph) {
    // Send mail to the signed-in user's own address
    let email = match graph.current_user().await {
        Ok(user) => user.mail.or(user.user_principal_name),
        Err(e) => {
            println!("Error getting user: {}", e);
            return;
        }
    };
    let Some(email) = email else {
        println!("Couldn't get your email address, canceling...");
        return;
    };

    match graph
        .send_mail("Testing Microsoft Graph", "Hello world!", &email)
        .await
    {
        Ok(()) => println!("Mail sent."),
        Err(e) => println!("Error sending mail: {}", e),
    }
}

async fn list_users(graph: &mut Graph) {
    if let Err(e) = graph.ensure_app_only_auth() {
        println!("Error preparing app-only auth: {}", e);
        return;
    }

    let page = match graph.list_users().await {
        Ok(page) => page,
        Err(e) => {
            println!("Error getting users: {}", e);
            return;
        }
    };

    for user in &page.value {
        println!("User: {}", user.display_name.as_deref().unwrap_or("NO NAME"));
        println!("  ID: {}", user.id);
        println!("  Email: {}", user.mail.as_deref().unwrap_or("NO EMAIL"));
    }

    println!();
    println!("More users available? {}", page.next_link.is_some());
}

async fn probe_notebooks(graph: &Graph) {
    let notebooks = graph.try_list_notebooks().await;
    if notebooks.is_empty() {
        println!("No notebooks found (failures are logged, not raised).");
        return;
    }
    for nb in &notebooks {
        println!("Notebook: {}", nb.display_name.as_deref().unwrap_or("(unnamed)"));
    }
}
