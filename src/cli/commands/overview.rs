use anyhow::Context;
use clap::Subcommand;

use crate::cli::OutputFormat;
use crate::config;
use crate::query::{HttpOverviewSource, OverviewSource};

#[derive(Subcommand)]
pub enum OverviewCommands {
    #[command(about = "Fetch the overview from a running server")]
    Fetch {
        #[arg(long, default_value = "http://localhost:3000", help = "Server base URL")]
        url: String,
        #[arg(long, env = "DASH_TOKEN", help = "Auth token sent as the auth cookie")]
        token: Option<String>,
    },
}

pub async fn handle(cmd: OverviewCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        OverviewCommands::Fetch { url, token } => {
            url::Url::parse(&url).with_context(|| format!("invalid server URL: {}", url))?;

            let mut source = HttpOverviewSource::new(url);
            if let Some(token) = token {
                source = source.with_token(config::config().security.auth_cookie_name.clone(), token);
            }
            let overview = source.get_overview().await.context("failed to fetch overview")?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&overview)?),
                OutputFormat::Text => {
                    println!("income:       {}", overview.total_income);
                    println!("expense:      {}", overview.total_expense);
                    println!("balance:      {}", overview.balance);
                    println!("transactions: {}", overview.transaction_count);
                    println!("categories:   {}", overview.category_count);
                    for totals in &overview.by_category {
                        println!("  {:<20} +{} -{}", totals.category, totals.income, totals.expense);
                    }
                }
            }
            Ok(())
        }
    }
}
