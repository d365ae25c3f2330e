//! Channel error types

use contracts::ContractError;
use dispatcher::DispatcherError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    /// `turn_on` called on a running channel
    #[error("channel '{name}' is already on")]
    AlreadyOn { name: String },

    /// Channels are single-use; build a new one to restart
    #[error("channel '{name}' was turned off and cannot be turned on again")]
    Retired { name: String },

    #[error(transparent)]
    Dispatcher(#[from] DispatcherError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}
