use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Parser)]
#[command(name = "dongfeng")]
#[command(about = "Eastmoney daily quote collection and reconciliation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and reconcile daily data for a list of security codes
    Fetch {
        /// Comma-separated bare security codes (e.g. 001317,600519)
        #[arg(short, long)]
        codes: String,

        /// Lookback window: a day count or a named period (5d, 1mo, 3mo, 6mo, 1y, 2y)
        #[arg(short, long, default_value = "90")]
        lookback: String,
    },
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch { codes, lookback } => {
            commands::fetch::run(codes, lookback).await;
        }
    }
}
