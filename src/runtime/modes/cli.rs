//! CLI mode
//!
//! One-off lookup from the command line: resolves an IP into a fresh
//! in-memory session and prints the resulting location record.

use colored::Colorize;

use crate::config::StaticConfig;
use crate::errors::Result;
use crate::services::{LocationResolver, Resolution};
use crate::session::{LocationRecord, MemorySession};

/// Run a single lookup
pub async fn run_lookup(config: &StaticConfig, ip: &str, json: bool) -> Result<()> {
    let resolver = LocationResolver::from_config(&config.geoip);
    let mut session = MemorySession::new();

    let resolution = resolver.resolve_for_ip(&mut session, ip).await?;
    let record = LocationRecord::read(&session);

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    match resolution {
        Resolution::Resolved { source, .. } => {
            println!("{} {:?}", "Source:".bold(), source);
        }
        Resolution::Skipped(reason) => {
            println!("{} {:?}", "Skipped:".yellow().bold(), reason);
        }
    }
    print_field("IP", record.ip.as_deref());
    print_field("Country", record.country.as_deref());
    print_field("Region", record.region.as_deref());
    print_field("City", record.city.as_deref());

    Ok(())
}

fn print_field(label: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {:<8} {}", label.cyan(), v.green()),
        None => println!("  {:<8} {}", label.cyan(), "-".dimmed()),
    }
}
