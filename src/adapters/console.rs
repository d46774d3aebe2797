use crate::core::{FormHost, Indicator, Notice, QuoteTable, Storage, WindowFeatures};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Terminal stand-in for the form UI. Notices go to stdout, windows are
/// printed as URLs and PDF labels are written through `storage`.
pub struct ConsoleHost<S: Storage> {
    storage: S,
    preselected: Option<usize>,
}

impl<S: Storage> ConsoleHost<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            preselected: None,
        }
    }

    /// Answer the quote dialog with `row` instead of prompting.
    pub fn with_selection(mut self, row: Option<usize>) -> Self {
        self.preselected = row;
        self
    }
}

fn marker(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::Blue => "ℹ️",
        Indicator::Green => "✅",
        Indicator::Orange => "⚠️",
        Indicator::Red => "❌",
    }
}

/// Parses a typed row number. Blank input dismisses the dialog.
pub fn parse_row(input: &str, rows: usize) -> Option<usize> {
    let row = input.trim().parse::<usize>().ok()?;
    (row < rows).then_some(row)
}

#[async_trait]
impl<S: Storage> FormHost for ConsoleHost<S> {
    async fn notify(&self, notice: Notice) {
        match notice.indicator {
            Indicator::Red => eprintln!("{} {}: {}", marker(notice.indicator), notice.title, notice.message),
            _ => println!("{} {}: {}", marker(notice.indicator), notice.title, notice.message),
        }
    }

    async fn choose_quote(&self, table: &QuoteTable) -> Option<usize> {
        println!("{}", table);
        if let Some(row) = self.preselected {
            tracing::info!("Using preselected row {}", row);
            return Some(row);
        }

        println!("Row to select (empty to cancel):");
        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut line).await {
            Ok(_) => {
                let row = parse_row(&line, table.rows.len());
                if row.is_none() && !line.trim().is_empty() {
                    println!("No row '{}'; nothing selected", line.trim());
                }
                row
            }
            Err(e) => {
                tracing::warn!("Could not read selection: {}", e);
                None
            }
        }
    }

    async fn open_url(&self, url: &str, window: Option<&WindowFeatures>) -> Result<()> {
        match window {
            Some(features) => println!("🔗 Open in {} ({}): {}", features.target, features, url),
            None => println!("🔗 Open: {}", url),
        }
        Ok(())
    }

    async fn open_pdf(&self, file_name: &str, data: &[u8]) -> Result<()> {
        let path = self.storage.write_file(file_name, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), path);
        println!("📁 Label saved to: {}", path);
        Ok(())
    }
}
