// ── Feature view-models ──
//
// One unit per feature. Queries derive their cache key from their
// parameters; mutations invalidate whatever the dependency table says
// the written entity affects.

mod account;
mod appointments;
mod doctors;
mod lab_results;
mod medical_records;
mod medications;
mod patients;
mod prescriptions;
mod reports;
mod specializations;
mod stats;

use std::future::Future;
use std::sync::Arc;

use clinic_api::ApiClient;

use crate::invalidation::{DependencyTable, Entity};
use crate::mutation::Mutation;
use crate::query::{Query, QueryCache, QueryKey};

pub use account::AccountViewModel;
pub use appointments::AppointmentsViewModel;
pub use doctors::DoctorsViewModel;
pub use lab_results::LabResultsViewModel;
pub use medical_records::MedicalRecordsViewModel;
pub use medications::MedicationsViewModel;
pub use patients::PatientsViewModel;
pub use prescriptions::PrescriptionsViewModel;
pub use reports::ReportsViewModel;
pub use specializations::SpecializationsViewModel;
pub use stats::{
    DASHBOARD_STALE_TIME, DashboardObserver, DashboardQueries, DashboardState, DashboardStats,
    StatsViewModel,
};

/// Shared plumbing handed to every view-model.
#[derive(Clone)]
pub(crate) struct Context {
    pub api: ApiClient,
    pub cache: QueryCache,
    pub deps: Arc<DependencyTable>,
}

impl Context {
    /// Build a query whose fetcher receives a clone of the API client.
    pub fn query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Query<T>
    where
        T: Send + Sync + 'static,
        F: Fn(ApiClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, clinic_api::Error>> + Send + 'static,
    {
        let api = self.api.clone();
        Query::new(&self.cache, key, move || fetch(api.clone()))
    }

    /// Build a mutation that invalidates `entity`'s dependents on success.
    pub fn mutation<I, O, F, Fut>(&self, entity: Entity, run: F) -> Mutation<I, O>
    where
        I: Send + 'static,
        O: Send + 'static,
        F: Fn(ApiClient, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, clinic_api::Error>> + Send + 'static,
    {
        let api = self.api.clone();
        Mutation::new(&self.cache, self.deps.affected(entity), move |input| {
            run(api.clone(), input)
        })
    }
}
