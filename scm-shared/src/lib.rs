pub mod models;
pub mod pii;

pub use models::booking::{BookingDraft, BookingForm, BookingId, BookingRequest, EquipmentType, JobStatus};
pub use models::events::{ChangeEvent, RecordChange};
pub use models::notification::{Correlation, Notification};
pub use models::ModelError;
pub use pii::Masked;
