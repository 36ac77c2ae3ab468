// Resource access functions
//
// One inherent `ApiClient` method per backend capability, grouped by
// feature. Each returns the decoded response body; entities pass through
// as `Record` (opaque JSON) so schema drift on the server never breaks
// decoding.

mod account;
mod appointments;
mod doctors;
mod lab_results;
mod medical_records;
mod medications;
mod patients;
pub(crate) mod prescriptions;
pub(crate) mod reports;
mod specializations;
