// ── Clinic facade ──
//
// Owns the API client, the query cache and the dependency table, and
// vends one view-model per feature. Cheaply cloneable via `Arc`.

use std::sync::Arc;

use clinic_api::{ApiClient, Session, TokenPair};
use secrecy::SecretString;
use tracing::info;

use crate::config::ClinicConfig;
use crate::invalidation::DependencyTable;
use crate::query::{CacheConfig, QueryCache};
use crate::viewmodel::{
    AccountViewModel, AppointmentsViewModel, Context, DoctorsViewModel, LabResultsViewModel,
    MedicalRecordsViewModel, MedicationsViewModel, PatientsViewModel, PrescriptionsViewModel,
    ReportsViewModel, SpecializationsViewModel, StatsViewModel,
};

/// The main entry point for consumers.
#[derive(Clone)]
pub struct Clinic {
    inner: Arc<Context>,
}

impl std::fmt::Debug for Clinic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clinic")
            .field("api", &self.inner.api)
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}

impl Clinic {
    /// Build a client for `config`, reading and writing credentials
    /// through `session`.
    pub fn new(config: &ClinicConfig, session: Session) -> Result<Self, clinic_api::Error> {
        let api = ApiClient::new(config.url.as_str(), &config.transport(), session)?;
        Ok(Self::from_parts(
            api,
            QueryCache::new(config.cache()),
            DependencyTable::default(),
        ))
    }

    /// Assemble from an existing client and cache settings.
    pub fn with_api(api: ApiClient, cache: CacheConfig) -> Self {
        Self::from_parts(api, QueryCache::new(cache), DependencyTable::default())
    }

    pub fn from_parts(api: ApiClient, cache: QueryCache, deps: DependencyTable) -> Self {
        Self {
            inner: Arc::new(Context {
                api,
                cache,
                deps: Arc::new(deps),
            }),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    pub fn dependencies(&self) -> &DependencyTable {
        &self.inner.deps
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Log in and start from an empty cache so no data from a previous
    /// user survives.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<TokenPair, clinic_api::Error> {
        let pair = self.inner.api.login(email, password).await?;
        self.inner.cache.clear();
        Ok(pair)
    }

    /// Drop credentials and every cached query.
    pub fn logout(&self) {
        self.inner.api.logout();
        self.inner.cache.clear();
        info!("logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.api.is_authenticated()
    }

    // ── View-models ──────────────────────────────────────────────────

    fn ctx(&self) -> Context {
        Context::clone(&self.inner)
    }

    pub fn patients(&self) -> PatientsViewModel {
        PatientsViewModel::new(self.ctx())
    }

    pub fn appointments(&self) -> AppointmentsViewModel {
        AppointmentsViewModel::new(self.ctx())
    }

    pub fn doctors(&self) -> DoctorsViewModel {
        DoctorsViewModel::new(self.ctx())
    }

    pub fn specializations(&self) -> SpecializationsViewModel {
        SpecializationsViewModel::new(self.ctx())
    }

    pub fn medications(&self) -> MedicationsViewModel {
        MedicationsViewModel::new(self.ctx())
    }

    pub fn medical_records(&self) -> MedicalRecordsViewModel {
        MedicalRecordsViewModel::new(self.ctx())
    }

    pub fn prescriptions(&self) -> PrescriptionsViewModel {
        PrescriptionsViewModel::new(self.ctx())
    }

    pub fn lab_results(&self) -> LabResultsViewModel {
        LabResultsViewModel::new(self.ctx())
    }

    pub fn reports(&self) -> ReportsViewModel {
        ReportsViewModel::new(self.ctx())
    }

    pub fn account(&self) -> AccountViewModel {
        AccountViewModel::new(self.ctx())
    }

    pub fn stats(&self) -> StatsViewModel {
        StatsViewModel::new(self.ctx())
    }
}
