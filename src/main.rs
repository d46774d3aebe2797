use clap::Parser;
use shipment_desk::config::Command;
use shipment_desk::core::ShippingRpc;
use shipment_desk::utils::error::ErrorSeverity;
use shipment_desk::utils::{logger, validation::Validate};
use shipment_desk::{
    CliConfig, ConsoleHost, DeskConfig, HttpShippingRpc, LocalStorage, ShipmentError,
    ShipmentForm,
};

async fn run(cli: &CliConfig) -> Result<(), ShipmentError> {
    let config = DeskConfig::from_file(&cli.config)?;
    config.validate()?;
    tracing::debug!("Server: {}", config.server.base_url);

    let rpc = HttpShippingRpc::from_config(&config)?;
    let doc = rpc.get_shipment(&cli.shipment).await?;
    tracing::info!("Loaded {} (docstatus {})", doc.name, doc.docstatus);

    let storage = LocalStorage::new(config.label.output_path.clone());
    let host = ConsoleHost::new(storage).with_selection(cli.command.preselected_row());
    let mut form = ShipmentForm::new(rpc, host, doc)
        .with_tracking(config.tracking_link())
        .with_currency(config.currency_format());

    match cli.command.action() {
        None => {
            let actions = form.refresh();
            if actions.is_empty() {
                println!("No actions available for {}", form.doc().name);
            }
            for action in actions {
                println!("• {}", action);
            }
            Ok(())
        }
        Some(action) => form.trigger(action).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting shipment-desk for {}", cli.shipment);
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
            match cli.command {
                Command::Actions => "actions",
                Command::Rates { .. } => "rates",
                Command::Label => "label",
                Command::Track => "track",
            },
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        // Form actions have already shown their failure as a notice.
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,      // 前置條件不符
            ErrorSeverity::Medium => 2,   // 遠端錯誤，可重試
            ErrorSeverity::High => 1,     // 回應無法處理
            ErrorSeverity::Critical => 3, // 配置或系統錯誤
        };
        std::process::exit(exit_code);
    }
}
