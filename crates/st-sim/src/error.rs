use st_core::{CoreError, StreetId};
use st_network::NetworkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("traffic load length {got} does not match street count {expected}")]
    LoadLengthMismatch {
        expected: usize,
        got:      usize,
    },

    #[error("traffic load on street {0} exceeds u32::MAX")]
    LoadOverflow(StreetId),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("street network error: {0}")]
    Network(#[from] NetworkError),
}

pub type SimResult<T> = Result<T, SimError>;
