use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::{Local, Offset};
use clap::Parser;
use client_core::{
    ActionOutcome, AlwaysConfirm, ControllerEvent, ControllerOptions, DateDisplay,
    DeleteConfirmation, ExpenseListController, HttpExpenseBackend,
};
use shared::domain::PaginationMode;
use tokio::sync::broadcast::{error::TryRecvError, Receiver};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod render;
mod terminal;

use command::{parse_command, Command, HELP};
use config::{load_settings, Settings};
use terminal::Terminal;

#[derive(Parser, Debug)]
#[command(about = "Browse, filter, add and delete expenses on an expense backend")]
struct Args {
    /// Settings file; missing files are skipped.
    #[arg(long, default_value = "expenses.toml")]
    config: PathBuf,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    items_per_page: Option<u32>,
    /// `server` or `client` side pagination.
    #[arg(long, value_parser = parse_mode)]
    mode: Option<PaginationMode>,
    /// strftime pattern used to show and filter dates.
    #[arg(long)]
    date_format: Option<String>,
    /// Delete without asking for confirmation.
    #[arg(long)]
    yes: bool,
}

fn parse_mode(raw: &str) -> Result<PaginationMode, String> {
    PaginationMode::parse(raw).ok_or_else(|| format!("unknown pagination mode '{raw}'"))
}

impl Args {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(v) = self.api_url {
            settings.api_url = v;
        }
        if let Some(v) = self.items_per_page.filter(|v| *v > 0) {
            settings.items_per_page = v;
        }
        if let Some(v) = self.mode {
            settings.pagination_mode = v;
        }
        if let Some(v) = self.date_format {
            settings.date_format = v;
        }
        settings.assume_yes |= self.yes;
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(&args.config);
    let settings = args.apply(settings);
    info!(
        "expense_tracker: api_url={} items_per_page={} mode={:?}",
        settings.api_url, settings.items_per_page, settings.pagination_mode
    );

    let backend = HttpExpenseBackend::new(
        &settings.api_url,
        Duration::from_secs(settings.request_timeout_secs),
    )
    .context("failed to set up the expense backend client")?;
    let date_display = DateDisplay::new(settings.date_format.clone(), Local::now().offset().fix())
        .context("invalid date format")?;

    let terminal = Arc::new(Terminal::new());
    let confirmation: Arc<dyn DeleteConfirmation> = if settings.assume_yes {
        Arc::new(AlwaysConfirm)
    } else {
        terminal.clone()
    };
    let controller = ExpenseListController::new(
        Arc::new(backend),
        confirmation,
        ControllerOptions {
            items_per_page: settings.items_per_page,
            pagination_mode: settings.pagination_mode,
            date_display,
        },
    );
    let mut events = controller.subscribe_events();

    controller.refresh().await;
    show(&controller, &mut events).await;

    loop {
        let Some(line) = terminal
            .read_line("> ")
            .await
            .context("failed to read from stdin")?
        else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        debug!("expense_tracker: command={command:?}");
        if command == Command::Quit {
            break;
        }
        if command == Command::Help {
            println!("{HELP}");
            continue;
        }
        let outcome = execute(&controller, command).await;
        if outcome == ActionOutcome::Ignored {
            println!("(nothing to do)");
        }
        show(&controller, &mut events).await;
    }

    Ok(())
}

async fn execute(controller: &ExpenseListController, command: Command) -> ActionOutcome {
    match command {
        Command::Next => controller.next_page().await,
        Command::Previous => controller.previous_page().await,
        Command::Page(page) => controller.go_to_page(page).await,
        Command::Limit(limit) => controller.set_items_per_page(limit).await,
        Command::Filter(text) => {
            controller.set_filter(text).await;
            ActionOutcome::Applied
        }
        Command::ClearFilter => {
            controller.clear_filter().await;
            ActionOutcome::Applied
        }
        Command::Amount(amount) => {
            controller.set_form_amount(amount).await;
            ActionOutcome::Applied
        }
        Command::Description(description) => {
            controller.set_form_description(description).await;
            ActionOutcome::Applied
        }
        Command::Add {
            amount,
            description,
        } => {
            if let Some(amount) = amount {
                controller.set_form_amount(amount).await;
            }
            if let Some(description) = description {
                controller.set_form_description(description).await;
            }
            controller.add_expense().await
        }
        Command::Delete(id) => controller.delete_expense(id).await,
        Command::Refresh => controller.refresh().await,
        Command::Help | Command::Quit => ActionOutcome::Ignored,
    }
}

/// Prints pending notices, then the current frame.
async fn show(controller: &ExpenseListController, events: &mut Receiver<ControllerEvent>) {
    loop {
        match events.try_recv() {
            Ok(ControllerEvent::Notice(notice)) => println!("!! {}", notice.message()),
            Ok(ControllerEvent::StateChanged) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    let snapshot = controller.snapshot().await;
    print!("{}", render::render(&snapshot, controller.date_display()));
}
