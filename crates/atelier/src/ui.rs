use anyhow::Result;
use atelier_client::dashboard::invest::RecommendationRow;
use atelier_common::schema::{BrandRecord, EventName, Ticker};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Ticking spinner for an outstanding request.
pub fn spinner(msg: impl Into<String>) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]")?);
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

pub fn events(events: &[EventName]) {
    if events.is_empty() {
        println!("{}", "No events available".dimmed());
        return;
    }
    for event in events {
        println!("{:>6}  {}", event.id.to_string().bold(), event.description);
    }
}

pub fn tickers(tickers: &[Ticker]) {
    if tickers.is_empty() {
        println!("{}", "No tickers available".dimmed());
        return;
    }
    for ticker in tickers {
        println!(
            "{:<10} {}",
            ticker.stock_symbol.cyan().bold(),
            ticker.company_name
        );
    }
}

pub fn recommendations(rows: &[RecommendationRow]) {
    println!("{}", "Best Investment Options".bold().underline());
    if rows.is_empty() {
        println!("{}", "No recommendations available".dimmed());
        return;
    }
    for row in rows {
        println!("{}", row.ticker.cyan().bold());
        println!("    Average Return:       {}%", row.avg_return_pct);
        println!("    Volatility:           {}", row.volatility);
        println!("    Cumulative Return:    {}%", row.cumulative_return_pct);
        println!("    Sentiment Trend:      {}", row.sentiment_trend);
        println!("    Average Event Impact: {}", row.avg_event_impact);
    }
}

pub fn brands(ticker: &str, brands: &[BrandRecord]) {
    println!("{} {}", "Brands:".bold(), ticker.cyan());
    for brand in brands {
        println!(
            "    {:<28} {}",
            brand.brand_name,
            format!("images/{}", brand.image_name()).dimmed()
        );
    }
}
