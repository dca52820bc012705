use clap::Subcommand;
use lapwatch_core::storage::Database;
use lapwatch_core::timer::LapBook;
use lapwatch_core::{format_time, PersistedSnapshot, SnapshotStore, ThresholdConfig};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print elapsed time, goal and lap summary
    Status {
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List laps, newest first
    Laps {
        #[arg(long)]
        json: bool,
    },
    /// Clear elapsed time and laps, and delete the stored record
    Reset,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let snapshot = PersistedSnapshot::load_or_default(&db);

    match action {
        TimerAction::Status { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", render_status(&snapshot));
            }
        }
        TimerAction::Laps { json } => {
            if json {
                let value = serde_json::to_value(&snapshot)?;
                println!("{}", serde_json::to_string_pretty(&value["laps"])?);
            } else {
                print!("{}", render_laps(&snapshot));
            }
        }
        TimerAction::Reset => {
            db.clear()?;
            println!("{{\"type\": \"timer_reset\"}}");
        }
    }
    Ok(())
}

fn render_status(snapshot: &PersistedSnapshot) -> String {
    let goal = ThresholdConfig::new(snapshot.threshold_minutes);
    let mut out = format!(
        "{}\nelapsed  {}\ngoal     {} min\nlaps     {}\n",
        snapshot.settings.custom_message,
        format_time(snapshot.elapsed_ms),
        goal.goal_minutes(),
        snapshot.laps.len(),
    );
    let book = LapBook::from_parts(snapshot.laps.clone(), snapshot.previous_total_ms);
    if let Some(analysis) = book.analysis() {
        out.push_str(&format!(
            "best     {}\nworst    {}\n",
            format_time(analysis.best_ms),
            format_time(analysis.worst_ms)
        ));
    }
    out
}

pub(crate) fn render_laps(snapshot: &PersistedSnapshot) -> String {
    if snapshot.laps.is_empty() {
        return "No laps recorded\n".to_string();
    }
    let book = LapBook::from_parts(snapshot.laps.clone(), snapshot.previous_total_ms);
    let analysis = book.analysis();
    let mut out = String::new();
    for (index, lap) in book.laps().iter().enumerate() {
        let marker = match analysis {
            Some(a) if a.is_best(lap.duration_ms) => "  best",
            Some(a) if a.is_worst(lap.duration_ms) => "  worst",
            _ => "",
        };
        out.push_str(&format!(
            "Lap {:<3} {}  {}{marker}\n",
            book.number_at(index),
            format_time(lap.duration_ms),
            format_time(lap.total_ms),
        ));
    }
    out
}
