//! Speech bridge state machine
//!
//! A voice conversation walks `Listening → Thinking → Speaking → Done`. A failure in any
//! stage moves the bridge to that stage's terminal failure state and ends the run.

use crate::error::{VoiceError, VoiceResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeState {
    /// Waiting for the transcript
    Listening,
    /// Transcript in hand, querying the model
    Thinking,
    /// Reply in hand, synthesizing audio
    Speaking,
    Done,
    TranscriptionFailed,
    QueryFailed,
    SynthesisFailed,
}

impl BridgeState {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            BridgeState::Listening | BridgeState::Thinking | BridgeState::Speaking
        )
    }

    /// Stage that runs in (or ended) this state.
    pub fn stage(&self) -> Stage {
        match self {
            BridgeState::Listening | BridgeState::TranscriptionFailed => Stage::SpeechToText,
            BridgeState::Thinking | BridgeState::QueryFailed => Stage::LlmProcessing,
            BridgeState::Speaking | BridgeState::Done | BridgeState::SynthesisFailed => {
                Stage::TextToSpeech
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SpeechToText,
    LlmProcessing,
    TextToSpeech,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::SpeechToText => "speech_to_text",
            Stage::LlmProcessing => "llm_processing",
            Stage::TextToSpeech => "text_to_speech",
        }
    }

    fn failed_state(&self) -> BridgeState {
        match self {
            Stage::SpeechToText => BridgeState::TranscriptionFailed,
            Stage::LlmProcessing => BridgeState::QueryFailed,
            Stage::TextToSpeech => BridgeState::SynthesisFailed,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report for a conversation that stopped in `stage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub state: BridgeState,
    pub error: String,
    /// Every state the bridge passed through, ending with `state`.
    pub trail: Vec<BridgeState>,
}

#[derive(Debug, Clone)]
pub struct SpeechBridge {
    state: BridgeState,
    trail: Vec<BridgeState>,
}

impl SpeechBridge {
    pub fn new() -> Self {
        Self {
            state: BridgeState::Listening,
            trail: vec![BridgeState::Listening],
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn trail(&self) -> &[BridgeState] {
        &self.trail
    }

    /// Move to the next state. Terminal states cannot advance.
    pub fn advance(&mut self) -> VoiceResult<BridgeState> {
        let next = match self.state {
            BridgeState::Listening => BridgeState::Thinking,
            BridgeState::Thinking => BridgeState::Speaking,
            BridgeState::Speaking => BridgeState::Done,
            from => return Err(VoiceError::InvalidTransition { from }),
        };
        self.enter(next);
        Ok(next)
    }

    /// End the run in the current stage's failure state. Failing a finished bridge leaves
    /// its state unchanged.
    pub fn fail(&mut self, error: impl Into<String>) -> StageFailure {
        let stage = self.state.stage();
        if !self.state.is_terminal() {
            self.enter(stage.failed_state());
        }
        StageFailure {
            stage,
            state: self.state,
            error: error.into(),
            trail: self.trail.clone(),
        }
    }

    fn enter(&mut self, next: BridgeState) {
        debug!(from = ?self.state, to = ?next, "bridge transition");
        self.state = next;
        self.trail.push(next);
    }
}

impl Default for SpeechBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_visits_every_state() {
        let mut bridge = SpeechBridge::new();
        assert_eq!(bridge.advance().unwrap(), BridgeState::Thinking);
        assert_eq!(bridge.advance().unwrap(), BridgeState::Speaking);
        assert_eq!(bridge.advance().unwrap(), BridgeState::Done);
        assert_eq!(
            bridge.trail(),
            &[
                BridgeState::Listening,
                BridgeState::Thinking,
                BridgeState::Speaking,
                BridgeState::Done
            ]
        );
        assert!(matches!(
            bridge.advance(),
            Err(VoiceError::InvalidTransition {
                from: BridgeState::Done
            })
        ));
    }

    #[test]
    fn test_failure_names_the_stage() {
        let mut bridge = SpeechBridge::new();
        bridge.advance().unwrap();
        let failure = bridge.fail("model timed out");
        assert_eq!(failure.stage, Stage::LlmProcessing);
        assert_eq!(failure.state, BridgeState::QueryFailed);
        assert_eq!(
            failure.trail,
            vec![
                BridgeState::Listening,
                BridgeState::Thinking,
                BridgeState::QueryFailed
            ]
        );
        assert!(bridge.advance().is_err());
    }

    #[test]
    fn test_transcription_failure_is_first_stage() {
        let mut bridge = SpeechBridge::new();
        let failure = bridge.fail("no audio");
        assert_eq!(failure.stage.as_str(), "speech_to_text");
        assert_eq!(failure.state, BridgeState::TranscriptionFailed);
    }
}
