// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::constants::DEFAULT_POLL_INTERVAL;
use crate::config::EndpointArgs;

/// Watch a contract for ERC-20 transfers and AMM swaps.
#[derive(Debug, Parser)]
#[command(name = "swapscan", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub endpoints: EndpointArgs,

    /// Diagnostic log format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Also append every report to this file
    #[arg(long, global = true)]
    pub report_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll for new events until interrupted
    Monitor {
        /// Contract whose logs are watched
        #[arg(long)]
        contract_address: String,

        /// Seconds between poll cycles
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: u64,

        /// Watermark file; defaults to `.swapscan/watermark-<address>.json`
        #[arg(long)]
        watermark_file: Option<PathBuf>,
    },

    /// Report events in a historical block range, then exit
    Scan {
        /// Contract whose logs are scanned
        #[arg(long)]
        contract_address: String,

        /// First block; defaults to 1000 blocks before `--to-block`
        #[arg(long)]
        from_block: Option<u64>,

        /// Last block; defaults to the chain head
        #[arg(long)]
        to_block: Option<u64>,
    },
}

impl Command {
    /// Raw `--contract-address` value.
    pub fn contract_address(&self) -> &str {
        match self {
            Self::Monitor {
                contract_address, ..
            }
            | Self::Scan {
                contract_address, ..
            } => contract_address,
        }
    }
}

/// Format of diagnostic logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}
