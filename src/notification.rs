use serde::{Deserialize, Serialize};
use tracing::warn;

/// LaMetric icon shown next to the status text.
pub const DEFAULT_ICON: &str = "i24240";

const EMPTY_PAYLOAD: &[u8] = br#"{"frames":[]}"#;

/// Polling-app response understood by the LaMetric clock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub text: String,
    pub icon: String,
    pub index: usize,
}

impl Notification {
    pub fn single(text: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            frames: vec![Frame {
                text: text.into(),
                icon: icon.into(),
                index: 0,
            }],
        }
    }

    /// JSON body; falls back to an empty frame list if encoding fails.
    pub fn to_json_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|err| {
            warn!("failed to encode notification: {err}");
            EMPTY_PAYLOAD.to_vec()
        })
    }
}
