//! `farefind` - CLI for farefinder
//!
//! This binary provides the command-line interface for looking up airports,
//! searching flights and picking an outbound and return itinerary.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use farefinder::cli::{AirportsCommand, Cli, Command, ConfigCommand, OutputFormat, SearchCommand};
use farefinder::flow::FlowState;
use farefinder::form::AirportField;
use farefinder::{
    init_logging, render, AirportOption, AirportSearch, Config, FlowSession, SearchForm,
    SkyScrapperClient,
};

/// Extra time allowed for an airport lookup beyond the debounce window.
const LOOKUP_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Airports(cmd) => handle_airports(&config, &cmd).await,
        Command::Search(cmd) => handle_search(&config, &cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

async fn handle_airports(config: &Config, cmd: &AirportsCommand) -> anyhow::Result<()> {
    let client = SkyScrapperClient::from_config(config)?;
    let options = client.search_airports(&cmd.query).await?;

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&options)?),
        OutputFormat::Plain if options.is_empty() => println!("No airports found"),
        OutputFormat::Plain => {
            for option in &options {
                println!("{:<40} {}", option.label, option.token);
            }
        }
    }
    Ok(())
}

async fn handle_search(config: &Config, cmd: &SearchCommand) -> anyhow::Result<()> {
    let client = Arc::new(SkyScrapperClient::from_config(config)?);
    let today = chrono::Local::now().date_naive();
    let mut form = SearchForm::new(today, config.form.max_passengers)
        .with_lookups(Arc::clone(&client), config.debounce());
    let wait = config.debounce() + LOOKUP_GRACE;

    // Tokens are picked directly; only free text goes to the lookups.
    let origin_picked = form.enter_origin(&cmd.from);
    let destination_picked = form.enter_destination(&cmd.to);
    if !origin_picked {
        let origin = resolve_airport(form.origin(), "origin", wait).await?;
        form.select_origin(Some(origin));
    }
    if !destination_picked {
        let destination = resolve_airport(form.destination(), "destination", wait).await?;
        form.select_destination(Some(destination));
    }

    if let Some(depart) = cmd.depart {
        form.set_departure_date(Some(depart))?;
    }
    if cmd.one_way {
        form.set_return_date(None)?;
    } else if let Some(return_date) = cmd.return_date {
        form.set_return_date(Some(return_date))?;
    }
    form.set_passenger_count(cmd.adults)?;
    let criteria = form.submit()?;

    let mut session = FlowSession::new(client);

    let state = session.submit(criteria).await;
    show(cmd.format, &render::result_list(state));
    let Some(index) = choose(state, cmd.outbound, "outbound").await? else {
        return Ok(());
    };
    session.select_outbound(index)?;

    if session.flow().can_advance() {
        let state = session.advance().await?;
        show(cmd.format, &render::result_list(state));
        let Some(index) = choose(state, cmd.inbound, "return").await? else {
            return Ok(());
        };
        session.select_return(index)?;
    }

    let trip = session.finalize()?;
    match cmd.format {
        OutputFormat::Plain => print!("{}", render::trip_summary(&trip)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&trip)?),
    }
    Ok(())
}

/// Pick from the field's lookup results for the text typed into it.
async fn resolve_airport(
    field: &AirportField,
    label: &str,
    wait: Duration,
) -> anyhow::Result<AirportOption> {
    let input = field.query();
    let mut options = await_options(field, wait).await;
    match options.len() {
        0 => bail!("no airports found for {label} \"{input}\""),
        1 => Ok(options.remove(0)),
        len => {
            eprintln!("Airports matching \"{input}\":");
            for (i, option) in options.iter().enumerate() {
                eprintln!("  [{}] {option}", i + 1);
            }
            let index = prompt_index(&format!("Choose {label}"), len).await?;
            Ok(options.swap_remove(index))
        }
    }
}

/// Wait for the field's lookup to publish options.
async fn await_options(field: &AirportField, wait: Duration) -> Vec<AirportOption> {
    let Some(lookup) = field.lookup() else {
        return Vec::new();
    };
    let mut rx = lookup.subscribe();
    match tokio::time::timeout(wait, rx.changed()).await {
        Ok(Ok(())) => rx.borrow_and_update().clone(),
        // Failed lookups publish nothing; the warning is already logged.
        _ => Vec::new(),
    }
}

/// Pick an index into the displayed list, from a 1-based flag or a prompt.
/// `None` when there is nothing to pick.
async fn choose(
    state: &FlowState,
    flag: Option<usize>,
    leg: &str,
) -> anyhow::Result<Option<usize>> {
    let len = state.displayed().len();
    if len == 0 {
        return Ok(None);
    }
    match flag {
        Some(number) => flag_index(number, len, leg).map(Some),
        None => prompt_index(&format!("Choose {leg} flight"), len)
            .await
            .map(Some),
    }
}

/// Turn a 1-based `--outbound`/`--inbound` number into a list index.
fn flag_index(number: usize, len: usize, leg: &str) -> anyhow::Result<usize> {
    match number {
        0 => bail!("{leg} flights are numbered from 1"),
        n if n > len => bail!("there are only {len} {leg} flights, cannot pick number {n}"),
        n => Ok(n - 1),
    }
}

async fn prompt_index(prompt: &str, len: usize) -> anyhow::Result<usize> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{prompt} [1-{len}]: ");
        let line = lines
            .next_line()
            .await
            .context("failed to read selection")?
            .context("no selection made")?;
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => return Ok(n - 1),
            _ => eprintln!("Enter a number between 1 and {len}."),
        }
    }
}

fn show(format: OutputFormat, text: &str) {
    match format {
        OutputFormat::Plain => print!("{text}"),
        // Keep stdout clean for the JSON summary.
        OutputFormat::Json => eprint!("{text}"),
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let shown = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[API]");
                println!(
                    "  Key:                {}",
                    shown.api.key.as_deref().unwrap_or("(not set)")
                );
                println!("  Host:               {}", shown.api.host);
                println!("  Flights URL:        {}", shown.api.flights_url);
                println!("  Airports URL:       {}", shown.api.airports_url);
                println!(
                    "  Timeout (secs):     {}",
                    match shown.api.request_timeout_secs {
                        0 => "none".to_string(),
                        secs => secs.to_string(),
                    }
                );
                println!();
                println!("[Search]");
                println!("  Cabin class:        {}", shown.search.cabin_class);
                println!("  Sort by:            {}", shown.search.sort_by);
                println!("  Currency:           {}", shown.search.currency);
                println!("  Market:             {}", shown.search.market);
                println!("  Country code:       {}", shown.search.country_code);
                println!("  Locale:             {}", shown.search.locale);
                println!();
                println!("[Form]");
                println!("  Debounce (ms):      {}", shown.form.debounce_ms);
                println!("  Max passengers:     {}", shown.form.max_passengers);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
