use rmfs_core::{BotId, CoreError, PodId, WaypointId};
use rmfs_entities::EntityError;
use rmfs_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match configured count {expected}")]
    CountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("no bot with id {0}")]
    UnknownBot(BotId),

    #[error("{0} is busy")]
    BotBusy(BotId),

    #[error("bundle received but the warehouse has no input station")]
    NoInputStation,

    #[error("expected {pod} on slot {slot}, found none")]
    PodMissing { pod: PodId, slot: WaypointId },

    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("entity error: {0}")]
    Entity(#[from] EntityError),
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Config(msg) => SimError::Config(msg),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
