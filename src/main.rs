use clap::{Parser, Subcommand};
use tracing::debug;

use geosession::config::{StaticConfig, init_config};
use geosession::runtime::modes::{run_lookup, run_server};
use geosession::system::init_logging;

#[derive(Parser, Debug)]
#[command(name = "geosession", version, about = "Visitor geolocation cached per session")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Resolve a single IP address and print the session record
    Lookup {
        ip: String,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a sample configuration file
    Config,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(Command::Config) = cli.command {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    let config = init_config(cli.config.as_deref());
    let guard = init_logging(&config.logging)?;
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Some(Command::Lookup { ip, json }) => {
            if let Err(e) = run_lookup(&config, &ip, json).await {
                eprintln!("{}", e.format_colored());
                drop(guard);
                std::process::exit(1);
            }
        }
        _ => run_server(&config).await?,
    }

    drop(guard);
    Ok(())
}
