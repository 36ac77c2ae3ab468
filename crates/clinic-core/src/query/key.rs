// ── Query keys ──
//
// A key names one cache slot: the resource plus the parameters that
// distinguish one result set from another. Parameters are kept in a
// sorted map so equal parameter sets always produce equal keys.

use std::collections::BTreeMap;
use std::fmt;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Backend resource a cached query reads from.
///
/// Invalidation works at this granularity: a mutation names the
/// resources it affects and every key under them is marked stale.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Patients,
    Patient,
    DeactivatedPatients,
    DashboardStatistics,
    Appointments,
    Appointment,
    Doctors,
    Specializations,
    Medications,
    Medication,
    MedicalRecords,
    MedicalRecord,
    LatestMedicalRecord,
    Prescriptions,
    LabResults,
    AppointmentMetrics,
    PatientAnalysis,
    DoctorPerformance,
    AvailableDoctors,
    CurrentUser,
}

/// Identity of one cache slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub resource: Resource,
    pub params: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter. Values are stringified so `1` and `"1"` collide.
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.to_owned(), value.to_string());
        self
    }

    /// Add a parameter only when present.
    pub fn with_opt(self, name: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }

    /// Add every pair from a wire-level query list.
    pub fn with_pairs<'a>(
        mut self,
        pairs: impl IntoIterator<Item = &'a (&'static str, String)>,
    ) -> Self {
        for (name, value) in pairs {
            self.params.insert((*name).to_owned(), value.clone());
        }
        self
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource)?;
        let mut sep = '?';
        for (name, value) in &self.params {
            write!(f, "{sep}{name}={value}")?;
            sep = '&';
        }
        Ok(())
    }
}

/// Selects which keys an invalidation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFilter {
    /// Every key in the cache.
    All,
    /// Every key for one resource, whatever its parameters.
    Resource(Resource),
    /// One exact key.
    Exact(QueryKey),
}

impl KeyFilter {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Self::All => true,
            Self::Resource(resource) => key.resource == *resource,
            Self::Exact(exact) => key == exact,
        }
    }
}

impl From<Resource> for KeyFilter {
    fn from(resource: Resource) -> Self {
        Self::Resource(resource)
    }
}

impl From<QueryKey> for KeyFilter {
    fn from(key: QueryKey) -> Self {
        Self::Exact(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_order_does_not_matter() {
        let a = QueryKey::new(Resource::Patients)
            .with("page", 1)
            .with("search", "ann");
        let b = QueryKey::new(Resource::Patients)
            .with("search", "ann")
            .with("page", "1");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "patients?page=1&search=ann");
    }

    #[test]
    fn filters_select_by_resource_or_exact_key() {
        let page1 = QueryKey::new(Resource::Patients).with("page", 1);
        let page2 = QueryKey::new(Resource::Patients).with("page", 2);
        let meds = QueryKey::new(Resource::Medications);

        let by_resource = KeyFilter::from(Resource::Patients);
        assert!(by_resource.matches(&page1));
        assert!(by_resource.matches(&page2));
        assert!(!by_resource.matches(&meds));

        let exact = KeyFilter::from(page1.clone());
        assert!(exact.matches(&page1));
        assert!(!exact.matches(&page2));

        assert!(KeyFilter::All.matches(&meds));
    }

    #[test]
    fn resource_names_are_snake_case() {
        assert_eq!(Resource::DeactivatedPatients.to_string(), "deactivated_patients");
        assert_eq!(
            "lab_results".parse::<Resource>().ok(),
            Some(Resource::LabResults)
        );
    }
}
