//! Voice command surface.
//!
//! A speech recognizer hands over transcripts; this module maps them to the
//! three actions voice is allowed to trigger and applies the guards:
//! "start" only when stopped, "stop" and "lap" only when running.

use serde::{Deserialize, Serialize};

const START_WORDS: &[&str] = &["start", "go", "begin", "resume"];
const STOP_WORDS: &[&str] = &["stop", "pause", "halt"];
const LAP_WORDS: &[&str] = &["lap", "split", "mark"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceCommand {
    Start,
    Stop,
    Lap,
}

impl VoiceCommand {
    /// Find a command in a transcript. Recognizers tend to emit growing
    /// partial transcripts, so the last keyword spoken wins.
    pub fn from_transcript(transcript: &str) -> Option<Self> {
        transcript
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter_map(Self::from_word)
            .last()
    }

    fn from_word(word: &str) -> Option<Self> {
        if START_WORDS.contains(&word) {
            Some(VoiceCommand::Start)
        } else if STOP_WORDS.contains(&word) {
            Some(VoiceCommand::Stop)
        } else if LAP_WORDS.contains(&word) {
            Some(VoiceCommand::Lap)
        } else {
            None
        }
    }

    /// Whether the command may act on an engine in this running state.
    pub fn is_allowed(self, running: bool) -> bool {
        match self {
            VoiceCommand::Start => !running,
            VoiceCommand::Stop | VoiceCommand::Lap => running,
        }
    }

    /// The command in `transcript`, if its guard holds for an engine in
    /// this running state. This is the only path voice input takes.
    pub fn recognize(transcript: &str, running: bool) -> Option<Self> {
        let command = Self::from_transcript(transcript)?;
        if !command.is_allowed(running) {
            tracing::debug!(?command, running, "voice command ignored");
            return None;
        }
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keywords() {
        assert_eq!(VoiceCommand::from_transcript("Start"), Some(VoiceCommand::Start));
        assert_eq!(VoiceCommand::from_transcript("okay, STOP!"), Some(VoiceCommand::Stop));
        assert_eq!(VoiceCommand::from_transcript("lap please"), Some(VoiceCommand::Lap));
        assert_eq!(VoiceCommand::from_transcript("what time is it"), None);
        assert_eq!(VoiceCommand::from_transcript(""), None);
    }

    #[test]
    fn keywords_must_be_whole_words() {
        assert_eq!(VoiceCommand::from_transcript("collapse"), None);
        assert_eq!(VoiceCommand::from_transcript("restarted"), None);
    }

    #[test]
    fn last_keyword_wins() {
        assert_eq!(
            VoiceCommand::from_transcript("start start stop"),
            Some(VoiceCommand::Stop)
        );
    }

    #[test]
    fn start_only_when_stopped() {
        assert_eq!(VoiceCommand::recognize("go", false), Some(VoiceCommand::Start));
        assert_eq!(VoiceCommand::recognize("go", true), None);
    }

    #[test]
    fn stop_and_lap_only_when_running() {
        assert_eq!(VoiceCommand::recognize("lap", false), None);
        assert_eq!(VoiceCommand::recognize("stop", false), None);
        assert_eq!(VoiceCommand::recognize("split", true), Some(VoiceCommand::Lap));
        assert_eq!(VoiceCommand::recognize("pause", true), Some(VoiceCommand::Stop));
    }

    #[test]
    fn guard_applies_to_the_winning_keyword() {
        // "stop" wins over "start", then fails its guard while stopped.
        assert_eq!(VoiceCommand::recognize("start then stop", false), None);
        assert_eq!(VoiceCommand::recognize("nothing here", true), None);
    }
}
