use std::path::PathBuf;

use clap::Subcommand;
use lapwatch_core::storage::Database;
use lapwatch_core::{PersistedSnapshot, SnapshotStore, ThresholdConfig};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Set the goal in minutes (values below 1 become 1)
    Goal {
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Set the title shown above the timer
    Message { text: String },
    /// Set the background color (any CSS color)
    Color { color: String },
    /// Set or clear the background image
    Image {
        /// Image file to embed
        #[arg(required_unless_present = "clear", conflicts_with = "clear")]
        path: Option<PathBuf>,
        #[arg(long)]
        clear: bool,
    },
    /// Print the current settings as JSON
    Show,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut snapshot = PersistedSnapshot::load_or_default(&db);

    match action {
        SettingsAction::Goal { minutes } => {
            let goal = ThresholdConfig::new(minutes);
            snapshot.threshold_minutes = i64::from(goal.goal_minutes());
            println!("goal set to {} min", goal.goal_minutes());
        }
        SettingsAction::Message { text } => {
            snapshot.settings.custom_message = text;
            println!("ok");
        }
        SettingsAction::Color { color } => {
            snapshot.settings.bg_color = color;
            println!("ok");
        }
        SettingsAction::Image { path, clear } => {
            if clear {
                snapshot.settings.bg_image = None;
            } else if let Some(path) = path {
                snapshot.settings.set_bg_image_from_file(&path)?;
            }
            println!("ok");
        }
        SettingsAction::Show => {
            let mut json = serde_json::to_value(&snapshot.settings)?;
            json["thresholdMinutes"] = snapshot.threshold_minutes.into();
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }
    }

    db.save(&snapshot.encode()?)?;
    Ok(())
}
