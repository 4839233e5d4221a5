use anyhow::Result;
use atelier_client::prelude::*;
use clap::Parser;
use cli::{Cli, Commands::*};
use colored::Colorize;
use serde::Serialize;

mod cli;
mod ui;

fn preprocess(level: cli::LogLevel) {
    // grant access to .env
    dotenv::dotenv().ok();

    // initialise logger; RUST_LOG wins over --log
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_filter()))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    preprocess(cli.log);
    log::info!("Command line input recorded: {cli:#?}");

    let mut config = Config::from_env()?;
    if let Some(url) = &cli.api {
        config.api_url = url.clone();
    }
    log::debug!("Using backend at {}", config.api_url);
    let api = Api::from_config(&config)?;

    // cli framework:
    // "> atelier <COMMAND>"
    match &cli.command {
        // "> atelier events"
        Events => {
            let mut page = EventDashboard::new();
            let pb = ui::spinner("Fetching events")?;
            page.load(&api).await;
            pb.finish_and_clear();
            ui::events(page.events());
        }

        // "> atelier event <ID>"
        // the three event charts, fetched side by side
        Event { id } => {
            let mut page = EventDashboard::new();
            let pb = ui::spinner(format!("Fetching event {id}"))?;
            page.load(&api).await;
            page.select(&api, *id).await;
            pb.finish_and_clear();
            print_charts(&page.charts(), cli.compact)?;
        }

        // "> atelier tickers"
        Tickers => {
            let mut page = StockDashboard::new();
            let pb = ui::spinner("Fetching tickers")?;
            page.load(&api).await;
            pb.finish_and_clear();
            ui::tickers(page.tickers());
        }

        // "> atelier stock <TICKER>"
        Stock { ticker } => {
            let mut page = StockDashboard::new();
            let pb = ui::spinner(format!("Fetching [{ticker}]"))?;
            page.select(&api, ticker).await;
            pb.finish_and_clear();
            print_charts(&page.charts(), cli.compact)?;
        }

        // "> atelier invest [--hover TICKER]..."
        // replay hovers through the brand cache; repeats never refetch
        Invest { hovers } => {
            let mut page = InvestDashboard::from_api(&api);
            let pb = ui::spinner("Fetching investment options")?;
            page.load(&api).await;
            pb.finish_and_clear();
            ui::recommendations(&page.rows());

            for ticker in hovers {
                println!();
                match page.hover(ticker) {
                    Activation::Dispatched(handle) => {
                        let pb = ui::spinner(format!("Fetching brands for [{ticker}]"))?;
                        handle.await?;
                        pb.finish_and_clear();
                    }
                    Activation::Cached => log::debug!("[{ticker}] brands served from cache"),
                    Activation::InFlight => log::debug!("[{ticker}] brands already in flight"),
                }
                match page.brands_for_display() {
                    Some((ticker, brands)) => ui::brands(&ticker, &brands),
                    None => println!("{} {}", "No brands for".dimmed(), ticker.cyan()),
                }
                page.leave();
            }

            if !hovers.is_empty() {
                log::info!("{} tickers held in the brand cache", page.brands().len());
            }
        }
    }

    Ok(())
}

fn print_charts<T: Serialize>(charts: &[T], compact: bool) -> Result<()> {
    if charts.is_empty() {
        eprintln!("{}", "Nothing to chart".dimmed());
        return Ok(());
    }
    let json = if compact {
        serde_json::to_string(charts)?
    } else {
        serde_json::to_string_pretty(charts)?
    };
    println!("{json}");
    Ok(())
}
