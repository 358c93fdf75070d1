pub mod booking;
pub mod clock;
pub mod events;
pub mod notification;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Unknown equipment type: {0}")]
    UnknownEquipment(String),
    #[error("Unknown job status: {0}")]
    UnknownStatus(String),
}
