//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

/// Airport lookup arguments.
#[derive(Debug, Args)]
pub struct AirportsCommand {
    /// Free text to search for (city, airport name or code)
    pub query: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Flight search arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Origin: search text, or a token such as "95565050, LOND"
    #[arg(long, value_name = "AIRPORT")]
    pub from: String,

    /// Destination: search text, or a token such as "95673372, NYCA"
    #[arg(long, value_name = "AIRPORT")]
    pub to: String,

    /// Departure date (YYYY-MM-DD), defaults to today
    #[arg(long, value_name = "DATE")]
    pub depart: Option<NaiveDate>,

    /// Return date (YYYY-MM-DD), defaults to the day after departure
    #[arg(long = "return", value_name = "DATE", conflicts_with = "one_way")]
    pub return_date: Option<NaiveDate>,

    /// Search the outbound leg only
    #[arg(long)]
    pub one_way: bool,

    /// Number of adult passengers
    #[arg(short, long, default_value = "1")]
    pub adults: u8,

    /// Pick this outbound flight (1-based) instead of prompting
    #[arg(long, value_name = "N")]
    pub outbound: Option<usize>,

    /// Pick this return flight (1-based) instead of prompting
    #[arg(long, value_name = "N")]
    pub inbound: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}
