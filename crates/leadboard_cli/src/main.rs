//! Terminal front-end for the lead board.
//!
//! # Responsibility
//! - Drive `BoardController` against a local SQLite lead database.
//! - Offer a line-oriented shell so undo and the detail view work within one session.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use leadboard_core::{
    init_logging_from_config, BoardConfig, BoardController, DateRange, DetailOpen, FilterSpec, Lead,
    LeadId, LeadRepository, LeadStatus, LinkedListing, Notice, SqliteLeadGateway,
    TransitionOutcome,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "leadboard", version, about = "Pipeline board for marketplace inquiries")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Database path, overrides the config value.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Health check.
    Ping,
    /// Print the core version.
    Version,
    /// Print the board, optionally filtered.
    Board {
        #[arg(long, default_value = "")]
        query: String,
        /// all|today|last_7_days|last_30_days
        #[arg(long)]
        range: Option<DateRange>,
        #[arg(long)]
        listing: Option<String>,
    },
    /// Add a lead in the `new` column.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long, requires = "listing_title")]
        listing_id: Option<String>,
        #[arg(long, requires = "listing_id")]
        listing_title: Option<String>,
    },
    /// Move one lead to another column.
    Move { lead_id: LeadId, status: LeadStatus },
    /// Interactive session.
    Shell,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::default(),
    };
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_logging_from_config(&config)?;

    match cli.command {
        Command::Ping => println!("leadboard_core ping={}", leadboard_core::ping()),
        Command::Version => println!("leadboard_core version={}", leadboard_core::core_version()),
        Command::Board {
            query,
            range,
            listing,
        } => {
            let controller = load_controller(&config).await?;
            let spec = FilterSpec::new(
                &query,
                range.unwrap_or(config.default_date_range),
                listing,
            );
            print_board(&controller, &spec);
        }
        Command::Add {
            name,
            email,
            company,
            listing_id,
            listing_title,
        } => {
            let gateway = SqliteLeadGateway::open(&config.db_path)?;
            let mut lead = Lead::new(name, email, chrono::Utc::now().timestamp_millis());
            lead.company = company;
            if let (Some(id), Some(title)) = (listing_id, listing_title) {
                lead = lead.with_listing(LinkedListing {
                    id,
                    title,
                    price_cents: None,
                });
            }
            let id = gateway.repo().create_lead(&lead)?;
            println!("{id}");
        }
        Command::Move { lead_id, status } => {
            let mut controller = load_controller(&config).await?;
            let outcome = controller.request_transition(lead_id, status).await;
            print_notices(&mut controller);
            if let TransitionOutcome::RolledBack { error, .. } = outcome {
                bail!("move failed: {error}");
            }
            if outcome == TransitionOutcome::Skipped {
                println!("nothing to do");
            }
        }
        Command::Shell => {
            let mut controller = load_controller(&config).await?;
            run_shell(&mut controller, config.default_date_range).await?;
        }
    }
    Ok(())
}

async fn load_controller(config: &BoardConfig) -> Result<BoardController<SqliteLeadGateway>> {
    let gateway = SqliteLeadGateway::open(&config.db_path)
        .with_context(|| format!("opening {}", config.db_path.display()))?;
    let mut controller = BoardController::new(gateway);
    if !controller.load().await {
        print_notices(&mut controller);
        bail!("board could not be loaded");
    }
    Ok(controller)
}

async fn run_shell(
    controller: &mut BoardController<SqliteLeadGateway>,
    default_range: DateRange,
) -> Result<()> {
    println!("commands: list [query], move <id> <status>, undo, open <id>, notes <text>, close, quit");
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
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match verb {
            "" => continue,
            "quit" | "exit" => break,
            "list" => print_board(controller, &FilterSpec::new(rest, default_range, None)),
            "move" => {
                let mut args = rest.split_whitespace();
                match (
                    args.next().map(str::parse::<LeadId>),
                    args.next().map(str::parse::<LeadStatus>),
                ) {
                    (Some(Ok(id)), Some(Ok(status))) => {
                        if controller.request_transition(id, status).await
                            == TransitionOutcome::Skipped
                        {
                            println!("nothing to do");
                        }
                    }
                    _ => println!("usage: move <lead-id> <status>"),
                }
            }
            "undo" => {
                if controller.undo_last().await == TransitionOutcome::Skipped {
                    println!("nothing to undo");
                }
            }
            "open" => match rest.parse::<LeadId>() {
                Ok(id) => match controller.open_detail(id) {
                    DetailOpen::UnknownLead => println!("unknown lead"),
                    DetailOpen::Opened => print_detail(controller),
                    DetailOpen::ReceiptDue(lead_id) => {
                        print_detail(controller);
                        controller.send_read_receipt(lead_id).await;
                    }
                },
                Err(_) => println!("usage: open <lead-id>"),
            },
            "notes" => {
                if controller.detail().is_none() {
                    println!("open a lead first");
                } else {
                    controller.save_notes(rest).await;
                }
            }
            "close" => controller.close_detail(),
            other => println!("unknown command `{other}`"),
        }
        print_notices(controller);
    }
    Ok(())
}

fn print_board(controller: &BoardController<SqliteLeadGateway>, spec: &FilterSpec) {
    let view = controller.filtered(spec, &chrono::Local::now());
    for (status, leads) in view.board.columns() {
        println!("[{status}] ({})", leads.len());
        for lead in leads {
            let marker = if lead.is_read { ' ' } else { '*' };
            let listing = lead
                .listing
                .as_ref()
                .map(|listing| format!(" / {}", listing.title))
                .unwrap_or_default();
            println!(
                " {marker} {}  {}{}{}",
                lead.id,
                lead.name,
                lead.company
                    .as_deref()
                    .map(|company| format!(" ({company})"))
                    .unwrap_or_default(),
                listing
            );
        }
    }
    println!("{} of {} leads", view.filtered_count, view.total_count);
}

fn print_detail(controller: &BoardController<SqliteLeadGateway>) {
    let Some(detail) = controller.detail() else {
        return;
    };
    let Some(lead) = controller.board().get(detail.lead_id) else {
        return;
    };
    println!("{} <{}> [{}]", lead.name, lead.email, detail.status);
    if let Some(message) = &lead.message {
        println!("  message: {message}");
    }
    println!("  notes: {}", detail.notes.as_deref().unwrap_or("-"));
}

fn print_notices<G: leadboard_core::LeadGateway>(controller: &mut BoardController<G>) {
    for notice in controller.drain_notices() {
        match notice {
            Notice::Moved { lead_id, to, .. } => {
                println!("moved {lead_id} to {to} (undo available)")
            }
            Notice::Undone { lead_id, status } => println!("undone: {lead_id} back in {status}"),
            Notice::MoveFailed { message, .. } => eprintln!("move failed, reverted: {message}"),
            Notice::UndoFailed { message, .. } => eprintln!("undo failed: {message}"),
            Notice::NotesSaved { .. } => println!("notes saved"),
            Notice::NotesFailed { message, .. } => eprintln!("notes not saved: {message}"),
            Notice::LoadFailed { message } => eprintln!("could not load board: {message}"),
        }
    }
}
