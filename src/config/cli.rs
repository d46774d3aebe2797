use crate::core::FormAction;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "shipment-desk")]
#[command(about = "Shipping rates, labels and tracking for ERP shipments")]
pub struct CliConfig {
    #[arg(long, default_value = "shipment-desk.toml")]
    pub config: PathBuf,

    /// Name of the Shipment document, e.g. SHIPMENT-00012
    #[arg(long)]
    pub shipment: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the actions the form offers for this shipment
    Actions,
    /// Fetch shipping rates and create the shipment from one of them
    Rates {
        /// Row to select instead of asking interactively
        #[arg(long)]
        select: Option<usize>,
    },
    /// Print the shipping label
    Label,
    /// Open the carrier tracking page
    Track,
}

impl Command {
    pub fn action(&self) -> Option<FormAction> {
        match self {
            Command::Actions => None,
            Command::Rates { .. } => Some(FormAction::FetchShippingRates),
            Command::Label => Some(FormAction::PrintShippingLabel),
            Command::Track => Some(FormAction::TrackStatus),
        }
    }

    pub fn preselected_row(&self) -> Option<usize> {
        match self {
            Command::Rates { select } => *select,
            _ => None,
        }
    }
}
