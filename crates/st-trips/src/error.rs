use thiserror::Error;

#[derive(Debug, Error)]
pub enum TripError {
    #[error("no candidate {0} nodes to draw trips from")]
    NoCandidates(&'static str),
}

pub type TripResult<T> = Result<T, TripError>;
