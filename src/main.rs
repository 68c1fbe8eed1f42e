//! Matchday CLI
//!
//! Serves the prediction API and runs one-off form lookups and predictions.

use clap::{Parser, Subcommand};
use matchday::{Config, Result};

#[derive(Parser)]
#[command(name = "matchday")]
#[command(about = "Match predictions from recent form and a hosted language model", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Override bind host
        #[arg(long)]
        host: Option<String>,
        /// Override bind port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show a team's recent form from the match history
    Form {
        /// Team name
        team: String,
        /// Override the number of recent matches
        #[arg(long)]
        window: Option<usize>,
        /// Compare team names case-sensitively
        #[arg(long)]
        exact: bool,
    },
    /// Predict a single fixture
    Predict {
        /// Home team name
        home: String,
        /// Away team name
        away: String,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Write a default config file
    Init,
    /// Validate config and required secrets
    Check,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Secrets may live in a local .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let mut config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };
    if let Err(e) = config.apply_env() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Serve { host, port } => commands::serve(config, host, port).await,
        Commands::Form {
            team,
            window,
            exact,
        } => {
            if let Some(w) = window {
                config.form.window = w;
            }
            if exact {
                config.form.matching = matchday::features::TeamMatching::Exact;
            }
            commands::form(&config, &team).await
        }
        Commands::Predict { home, away, format } => {
            commands::predict(&config, &home, &away, format).await
        }
        Commands::Init => commands::init(&cli.config),
        Commands::Check => commands::check(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use matchday::data::HistorySource;
    use matchday::features::FormAggregator;
    use matchday::llm::build_client;
    use matchday::predict::{format_prediction, Predictor};
    use matchday::server::Server;
    use std::time::Duration;

    fn http_client(config: &Config) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent(concat!("matchday/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(config.data.timeout_secs))
            .build()?)
    }

    fn predictor(config: &Config) -> Result<Predictor> {
        config.validate()?;
        let http = http_client(config)?;
        let llm = build_client(&config.llm, config.api_key()?, http.clone())?;
        Ok(Predictor::new(config, http, llm))
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        println!("Created data/ directory");

        println!("\nNext steps:");
        println!("  1. Edit {} to choose a model provider", config_path);
        println!("  2. Put the API key in .env as {}", config.llm.api_key_env);
        println!("  3. Place match history at {}", config.data.history);
        println!("  4. Run 'matchday serve'");

        Ok(())
    }

    pub fn check(config: &Config) -> Result<()> {
        config.validate()?;
        println!("Configuration OK");
        println!("  Provider:  {}", config.llm.provider);
        println!("  Model:     {}", config.llm.model);
        println!("  History:   {}", config.data.history);
        println!(
            "  Form:      last {} matches, {:?} matching",
            config.form.window, config.form.matching
        );
        Ok(())
    }

    pub async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
        if let Some(h) = host {
            config.server.host = h;
        }
        if let Some(p) = port {
            config.server.port = p;
        }
        config.validate()?;

        let http = http_client(&config)?;
        let llm = build_client(&config.llm, config.api_key()?, http.clone())?;
        let server = Server::new(&config, http, llm)?;

        let addr = format!("{}:{}", config.server.host, config.server.port);
        server.run(&addr).await
    }

    pub async fn form(config: &Config, team: &str) -> Result<()> {
        if config.form.window == 0 {
            return Err(matchday::MatchdayError::Config(
                "window must be at least 1".to_string(),
            ));
        }
        let http = http_client(config)?;
        let timeout = Duration::from_secs(config.data.timeout_secs);
        let history = HistorySource::parse(&config.data.history)
            .load(&http, timeout)
            .await?;
        let aggregator = FormAggregator::from(&config.form);

        match aggregator.compute(&history, team) {
            Some(form) => {
                println!("{}: last {} matches", team, form.matches_considered);
                println!("───────────────────────────────");
                println!("  Wins:           {}", form.wins);
                println!("  Goals for:      {}", form.goals_for);
                println!("  Goals against:  {}", form.goals_against);
                println!("  Rating:         {:.2}", form.rating);
            }
            None => println!("No recorded matches for {}", team),
        }

        Ok(())
    }

    pub async fn predict(
        config: &Config,
        home: &str,
        away: &str,
        format: OutputFormat,
    ) -> Result<()> {
        let predictor = predictor(config)?;
        let prediction = predictor.predict(home, away).await?;

        match format {
            OutputFormat::Table => print!("{}", format_prediction(&prediction)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&prediction)?),
        }

        Ok(())
    }
}
