// clinic-api: Async Rust client for the clinic management REST API
//
// Transport adapter with JWT bearer credentials and a single
// refresh-and-retry on 401, plus one access function per backend
// capability (see `resources/`).

mod auth;
pub mod client;
pub mod error;
pub mod models;
mod resources;
pub mod session;
pub mod transport;

pub use client::{ApiClient, ApiRequest, FormPart, RequestBody};
pub use error::Error;
pub use models::{
    AppointmentFilter, Attachment, DashboardStatistics, DateFilter, ListParams, NewLabResult,
    Paginated, PasswordChange, PrescriptionMedication, ProfileForm, Record, RecordId,
};
pub use resources::prescriptions::PRESCRIPTION_PAGE_SIZE;
pub use resources::reports::REPORT_APPOINTMENTS_PAGE_SIZE;
pub use session::{MemoryTokenStore, Session, TokenPair, TokenStore};
pub use transport::{TlsMode, TransportConfig};
