//! Speech backends resolved once at startup.

use crate::error::{VoiceError, VoiceResult};
use crate::stt::{OpenAiStt, SttBackend};
use crate::tts::{OpenAiTts, TtsBackend};
use std::sync::Arc;
use tracing::{info, warn};

/// Which speech backends this process can use. A missing backend turns the matching
/// assistant operation into a `CapabilityUnavailable` error instead of a panic or a retry.
#[derive(Clone, Default)]
pub struct SpeechCapabilities {
    stt: Option<Arc<dyn SttBackend>>,
    tts: Option<Arc<dyn TtsBackend>>,
}

impl SpeechCapabilities {
    pub fn new(stt: Option<Arc<dyn SttBackend>>, tts: Option<Arc<dyn TtsBackend>>) -> Self {
        Self { stt, tts }
    }

    /// Text-only operation.
    pub fn none() -> Self {
        Self::default()
    }

    /// OpenAI-compatible backends for whichever credentials the environment provides.
    pub fn from_env() -> Self {
        let stt: Option<Arc<dyn SttBackend>> = match OpenAiStt::from_env() {
            Ok(stt) => {
                info!(url = %stt.base_url, model = %stt.model, "speech-to-text enabled");
                Some(Arc::new(stt))
            }
            Err(e) => {
                warn!(error = %e, "speech-to-text disabled");
                None
            }
        };
        let tts: Option<Arc<dyn TtsBackend>> = match OpenAiTts::from_env() {
            Ok(tts) => {
                info!(url = %tts.base_url, model = %tts.model, "text-to-speech enabled");
                Some(Arc::new(tts))
            }
            Err(e) => {
                warn!(error = %e, "text-to-speech disabled");
                None
            }
        };
        Self { stt, tts }
    }

    pub fn with_stt(mut self, stt: Arc<dyn SttBackend>) -> Self {
        self.stt = Some(stt);
        self
    }

    pub fn with_tts(mut self, tts: Arc<dyn TtsBackend>) -> Self {
        self.tts = Some(tts);
        self
    }

    pub fn stt(&self) -> VoiceResult<&Arc<dyn SttBackend>> {
        self.stt
            .as_ref()
            .ok_or(VoiceError::CapabilityUnavailable("speech-to-text"))
    }

    pub fn tts(&self) -> VoiceResult<&Arc<dyn TtsBackend>> {
        self.tts
            .as_ref()
            .ok_or(VoiceError::CapabilityUnavailable("text-to-speech"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::PlaceholderStt;

    #[test]
    fn test_missing_backends_are_reported() {
        let caps = SpeechCapabilities::none().with_stt(Arc::new(PlaceholderStt::new()));
        assert!(caps.stt().is_ok());
        assert!(matches!(
            caps.tts(),
            Err(VoiceError::CapabilityUnavailable("text-to-speech"))
        ));
    }
}
