use anyhow::Context;
use clap::{Parser, Subcommand};
use courier_chats::{load_snapshot, ChatSnapshot};
use courier_config::load as load_config;
use courier_database::{prepare_database, run_migrations};
use courier_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "courier-server")]
#[command(about = "Courier chat backend (serves by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Dump chats, participants, messages and the audit log
    DumpData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Migrate => migrate().await,
        Commands::DumpData => dump_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting Courier backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;
    let app = services.router(&config);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(courier_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    services.database.close().await;
    info!("backend shut down");
    Ok(())
}

async fn migrate() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    let connection = prepare_database(&config.database).await?;
    run_migrations(&connection).await?;
    info!(backend = connection.kind().as_str(), "migrations applied");

    connection.close().await;
    Ok(())
}

async fn dump_data() -> anyhow::Result<()> {
    info!("dumping chat data from database");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let snapshot = load_snapshot(services.database.pool())
        .await
        .context("failed to load chat data")?;
    print_snapshot(&snapshot);

    services.database.close().await;
    Ok(())
}

fn print_snapshot(snapshot: &ChatSnapshot) {
    println!("=== CHATS ===");
    if snapshot.chats.is_empty() {
        println!("No chats found in database");
    } else {
        println!("Found {} chats:", snapshot.chats.len());
        println!("{:<8} {:<40}", "ID", "Title");
        println!("{}", "-".repeat(50));
        for chat in &snapshot.chats {
            println!("{:<8} {:<40}", chat.id, chat.title);
        }
    }

    println!("\n=== PARTICIPANTS ===");
    if snapshot.participants.is_empty() {
        println!("No participants found in database");
    } else {
        println!("Found {} participants:", snapshot.participants.len());
        println!("{:<8} {:<10}", "Chat ID", "User ID");
        println!("{}", "-".repeat(20));
        for participant in &snapshot.participants {
            println!("{:<8} {:<10}", participant.chat_id, participant.user_id);
        }
    }

    println!("\n=== MESSAGES ===");
    if snapshot.messages.is_empty() {
        println!("No messages found in database");
    } else {
        println!("Found {} messages:", snapshot.messages.len());
        println!(
            "{:<8} {:<8} {:<10} {:<50} {:<32}",
            "ID", "Chat ID", "User ID", "Text (truncated)", "Sent At"
        );
        println!("{}", "-".repeat(110));
        for message in &snapshot.messages {
            println!(
                "{:<8} {:<8} {:<10} {:<50} {:<32}",
                message.id,
                message.chat_id,
                message.user_id,
                truncate(&message.text, 47),
                message.sent_at.to_rfc3339()
            );
        }
    }

    println!("\n=== AUDIT LOG ===");
    if snapshot.audit_log.is_empty() {
        println!("No audit entries found in database");
    } else {
        println!("Found {} audit entries:", snapshot.audit_log.len());
        println!(
            "{:<8} {:<15} {:<10} {:<32}",
            "ID", "Action", "User ID", "Created At"
        );
        println!("{}", "-".repeat(68));
        for entry in &snapshot.audit_log {
            println!(
                "{:<8} {:<15} {:<10} {:<32}",
                entry.id,
                entry.action.as_str(),
                entry.user_id,
                entry.created_at.to_rfc3339()
            );
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars - 3).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["courier-server"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn subcommands_use_kebab_case() {
        let cli = Cli::try_parse_from(["courier-server", "dump-data"]).unwrap();
        assert_eq!(cli.command, Some(Commands::DumpData));

        let cli = Cli::try_parse_from(["courier-server", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
    }

    #[test]
    fn truncate_respects_character_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }
}
