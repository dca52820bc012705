use clap::Subcommand;
use lapwatch_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting (e.g. "timer.tick_interval_ms", "voice.enabled")
    Get { key: String },
    /// Change one setting; prints the value as stored (goals are clamped)
    Set {
        key: String,
        #[arg(allow_negative_numbers = true)]
        value: String,
    },
    /// Print the whole configuration
    List {
        /// JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
    /// Restore defaults, for one key or for everything
    Reset { key: Option<String> },
    /// Print the location of config.toml
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load_or_default()
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{}", assignment(&config, &key));
        }
        ConfigAction::List { json } => {
            let config = Config::load_or_default();
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigAction::Reset { key: None } => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Reset { key: Some(key) } => {
            let mut config = Config::load()?;
            reset_key(&mut config, &key)?;
            config.save()?;
            println!("{}", assignment(&config, &key));
        }
        ConfigAction::Path => println!("{}", Config::path()?.display()),
    }
    Ok(())
}

/// Put one key back to its default value without touching the others.
fn reset_key(config: &mut Config, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let default = Config::default()
        .get(key)
        .ok_or_else(|| format!("unknown key: {key}"))?;
    config.apply(key, &default)?;
    Ok(())
}

fn assignment(config: &Config, key: &str) -> String {
    format!("{key} = {}", config.get(key).unwrap_or_default())
}
