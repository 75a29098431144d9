/// Shared error type used across all clubbot crates.
///
/// The user-visible kinds (everything but `Io`/`Json`/`Config`) are the ones
/// named in the engine's error contract: each renders a short,
/// language-agnostic explanation and returns the sender to the root menu.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("invalid member id: {0} (expected E.164 digits, no leading '+')")]
    InvalidId(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("a round is already in progress")]
    RoundInProgress,

    #[error("no pending offer")]
    NoPendingOffer,

    #[error("no candidate available for role {0}")]
    NoCandidateAvailable(String),

    #[error("member is busy with a pending or accepted role")]
    MemberBusy,

    #[error("corrupt state for club {club_id}: {message}")]
    CorruptState { club_id: String, message: String },

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
