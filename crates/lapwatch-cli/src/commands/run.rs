use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use clap::Args;
use lapwatch_core::session::Palette;
use lapwatch_core::storage::bg_image_data_uri;
use lapwatch_core::{
    format_time, AlertStatus, Backdrop, Config, CosmeticSettings, Database, Event, FeedbackKind, Frame,
    Notifier, Session, SessionCommand, SessionHandle, SessionObserver, SessionOptions, TokioClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  s, start        start
  x, stop         stop
  t, toggle       start or stop
  l, lap          record a lap
  r, reset        clear time and laps
  say <phrase>    voice transcript (e.g. \"say go\")
  goal <minutes>  change the goal
  msg <text>      change the title
  color <css>     change the background color
  image <path>    set the background image
  image clear     remove the background image
  ?, help         this text
  q, quit         save and exit";

#[derive(Args)]
pub struct RunArgs {
    /// Seed for the background color sequence
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let result = runtime.block_on(session(args));
    // Stdin reads run on a blocking thread that may still be parked.
    runtime.shutdown_background();
    result
}

async fn session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let options = SessionOptions::from(&config);
    let feedback = options.feedback_enabled;

    let (session, handle) = Session::new(TokioClock::new(), db, options);
    let mut session = session.with_observer(TerminalObserver::new(std::io::stdout().is_terminal()));
    if feedback {
        session = session.with_notifier(BellNotifier);
    }
    if let Some(seed) = args.seed {
        session = session.with_palette(Palette::seeded(seed));
    }

    if std::io::stdin().is_terminal() {
        eprintln!("{HELP}");
    }

    let (snapshot, pumped) = tokio::join!(session.run(), pump(handle));
    pumped?;

    println!();
    println!("elapsed {}", format_time(snapshot.elapsed_ms));
    if !snapshot.laps.is_empty() {
        print!("{}", super::timer::render_laps(&snapshot));
    }
    Ok(())
}

#[derive(Debug)]
enum Input {
    Command(SessionCommand),
    /// Image file to embed; read by the pump so errors reach the user.
    Image(PathBuf),
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let command = match word.to_lowercase().as_str() {
        "s" | "start" => SessionCommand::Start,
        "x" | "stop" => SessionCommand::Stop,
        "t" | "toggle" => SessionCommand::Toggle,
        "l" | "lap" => SessionCommand::Lap,
        "r" | "reset" => SessionCommand::Reset,
        "say" if !rest.is_empty() => SessionCommand::Voice(rest.to_string()),
        "goal" => SessionCommand::SetGoal(rest.parse().ok()?),
        "msg" if !rest.is_empty() => SessionCommand::SetMessage(rest.to_string()),
        "color" if !rest.is_empty() => SessionCommand::SetColor(rest.to_string()),
        "image" if rest.eq_ignore_ascii_case("clear") => SessionCommand::SetImage(None),
        "image" if !rest.is_empty() => return Some(Input::Image(PathBuf::from(rest))),
        "?" | "help" => return Some(Input::Help),
        "q" | "quit" | "exit" => return Some(Input::Quit),
        _ => return None,
    };
    Some(Input::Command(command))
}

async fn pump(handle: SessionHandle) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Some(Input::Command(command)) => {
                if !handle.send(command) {
                    return Ok(());
                }
            }
            Some(Input::Image(path)) => match bg_image_data_uri(&path) {
                Ok(uri) => {
                    if !handle.send(SessionCommand::SetImage(Some(uri))) {
                        return Ok(());
                    }
                }
                Err(e) => eprintln!("error: {e}"),
            },
            Some(Input::Help) => eprintln!("{HELP}"),
            Some(Input::Quit) => break,
            None if line.trim().is_empty() => {}
            None => eprintln!("unknown command: {} (try \"help\")", line.trim()),
        }
    }
    handle.shutdown();
    Ok(())
}

/// Prints one status line, redrawn in place on a terminal.
struct TerminalObserver {
    interactive: bool,
    title: String,
}

impl TerminalObserver {
    fn new(interactive: bool) -> Self {
        Self {
            interactive,
            title: CosmeticSettings::default().custom_message,
        }
    }
}

impl SessionObserver for TerminalObserver {
    fn on_frame(&mut self, frame: &Frame) {
        if !self.interactive {
            return;
        }
        let mut out = std::io::stdout();
        let _ = write!(out, "\r{}", status_line(&self.title, frame));
        let _ = out.flush();
    }

    fn on_event(&mut self, event: &Event) {
        if self.interactive {
            println!();
        }
        match serde_json::to_string(event) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "failed to encode event"),
        }
    }

    fn on_backdrop(&mut self, backdrop: &Backdrop) {
        tracing::debug!(color = %backdrop.css(), "backdrop");
    }

    fn on_settings(&mut self, settings: &CosmeticSettings) {
        self.title = settings.custom_message.clone();
    }

    fn on_status(&mut self, message: &str) {
        eprintln!("\nwarning: {message}");
    }
}

fn status_line(title: &str, frame: &Frame) -> String {
    let marker = match frame.alert {
        AlertStatus::None => "",
        AlertStatus::Warning => "  [goal soon]",
        AlertStatus::Hit => "  [GOAL]",
    };
    let state = if frame.running { ">" } else { "||" };
    format!("{title}  {state} {}{marker}   ", format_time(frame.elapsed_ms))
}

/// Terminal bell in place of vibration.
struct BellNotifier;

impl Notifier for BellNotifier {
    fn notify(&mut self, kind: FeedbackKind) {
        let rings = match kind {
            FeedbackKind::Generic => 0,
            FeedbackKind::ShortPulse => 1,
            FeedbackKind::TriplePulse => 3,
        };
        let mut err = std::io::stderr();
        for _ in 0..rings {
            let _ = write!(err, "\x07");
        }
        let _ = err.flush();
    }
}
