use super::TransportError;

/// Why a dispatch produced no reply.
///
/// The display text is what gets shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Network failure or undecodable success body. Never retried.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The endpoint rejected a request that carried no snapshot.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The endpoint rejected both the primary and the inlined request.
    /// `payload` is the serialized body of the second rejection.
    #[error("{payload}")]
    FallbackRejected { status: u16, payload: String },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DispatchError {
    /// Status code of the rejecting response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::FallbackRejected { status, .. } => Some(*status),
            Self::Transport(_) | Self::Encode(_) => None,
        }
    }
}
