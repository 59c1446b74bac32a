use thiserror::Error;

/// Setup and restore failures. Anything that goes wrong mid-race is either
/// a bug (panic) or a defined no-op.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RaceError {
    #[error("unknown character index {0}")]
    UnknownCharacter(usize),

    #[error("track layout has no segments")]
    EmptyLayout,

    #[error("invalid race config: {0}")]
    InvalidConfig(&'static str),

    #[error("inconsistent race session: {0}")]
    CorruptSession(&'static str),
}
