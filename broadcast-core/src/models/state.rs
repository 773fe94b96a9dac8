use serde::Serialize;

/// Lifecycle of the broadcast session owned by a `SessionController`.
///
/// State transitions:
/// ```text
/// uninitialized → initializing → ready → connecting → connected → disconnected
///        ↑               │         ↑_______________________________│
///        └───(failure)───┘
/// any ─────────────── deinitiate ──────────────────→ torn-down (terminal)
/// ```
///
/// `Connecting`, `Connected` and `Disconnected` are only ever entered from
/// engine state callbacks, never by the controller itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    Connecting,
    Connected,
    Disconnected,
    TornDown,
}

impl SessionLifecycleState {
    /// Whether an engine session exists in this state.
    pub fn has_session(&self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Connecting | Self::Connected | Self::Disconnected
        )
    }

    pub fn is_torn_down(&self) -> bool {
        matches!(self, Self::TornDown)
    }

    /// Lifecycle state implied by an engine state callback, if any.
    ///
    /// `Invalid` and `Error` carry no lifecycle meaning on their own; a fatal
    /// error is followed by an engine-driven `Disconnected`.
    pub fn from_engine(state: EngineState) -> Option<Self> {
        match state {
            EngineState::Connecting => Some(Self::Connecting),
            EngineState::Connected => Some(Self::Connected),
            EngineState::Disconnected => Some(Self::Disconnected),
            EngineState::Invalid | EngineState::Error => None,
        }
    }
}

/// Connection state reported by the broadcast engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineState {
    Invalid,
    Disconnected,
    Connecting,
    Connected,
    Error,
}
