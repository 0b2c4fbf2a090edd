use clap::{Parser, Subcommand};

/// Switchboard — a multi-agent orchestration gateway.
#[derive(Debug, Parser)]
#[command(name = "switchboard", version, about)]
pub struct Cli {
    /// Host to bind to.
    #[arg(long, default_value = "localhost")]
    pub host: Option<String>,
    /// Port to bind to.
    #[arg(long)]
    pub port: Option<u16>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

/// Loads configuration from the path named by `SWITCHBOARD_CONFIG` (or
/// `config.toml` by default), falling back to defaults when absent.
pub fn load_config() -> anyhow::Result<(sb_domain::Config, String)> {
    let config_path = std::env::var("SWITCHBOARD_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        sb_domain::Config::default()
    };

    Ok((config, config_path))
}

pub fn validate(config: &sb_domain::Config, config_path: &str) -> bool {
    let issues = config.validate();
    if issues.is_empty() {
        println!("{config_path}: configuration OK");
        return true;
    }
    for issue in &issues {
        println!("{issue}");
    }
    !issues
        .iter()
        .any(|i| i.severity == sb_domain::config::ConfigSeverity::Error)
}

pub fn show(config: &sb_domain::Config) {
    match toml::to_string_pretty(config) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("failed to serialize config: {e}"),
    }
}
