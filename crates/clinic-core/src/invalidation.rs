// ── Invalidation dependency table ──
//
// Maps each mutated entity to every cached resource whose contents can
// change as a result. Mutations consult this table on success; nothing
// else decides what goes stale.

use std::collections::HashMap;

use strum::{Display, EnumIter};

use crate::query::Resource;

/// Kind of backend entity a mutation writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Entity {
    Patient,
    Appointment,
    Doctor,
    Specialization,
    Medication,
    MedicalRecord,
    Prescription,
    LabResult,
    Account,
}

/// Mutated entity ⇒ affected resources.
#[derive(Debug, Clone)]
pub struct DependencyTable {
    affects: HashMap<Entity, Vec<Resource>>,
}

impl Default for DependencyTable {
    /// The standard table:
    ///
    /// | entity | invalidates |
    /// |---|---|
    /// | patient | patients, patient, deactivated patients, dashboard statistics, patient analysis |
    /// | appointment | appointments, appointment, dashboard statistics, appointment metrics, doctor performance, available doctors |
    /// | doctor | doctors, available doctors, doctor performance |
    /// | specialization | specializations, doctors |
    /// | medication | medications, medication |
    /// | medical record | medical records, medical record, latest medical record |
    /// | prescription | prescriptions, latest medical record |
    /// | lab result | lab results |
    /// | account | current user, doctors |
    fn default() -> Self {
        use Resource as R;

        let affects = HashMap::from([
            (
                Entity::Patient,
                vec![
                    R::Patients,
                    R::Patient,
                    R::DeactivatedPatients,
                    R::DashboardStatistics,
                    R::PatientAnalysis,
                ],
            ),
            (
                Entity::Appointment,
                vec![
                    R::Appointments,
                    R::Appointment,
                    R::DashboardStatistics,
                    R::AppointmentMetrics,
                    R::DoctorPerformance,
                    R::AvailableDoctors,
                ],
            ),
            (
                Entity::Doctor,
                vec![R::Doctors, R::AvailableDoctors, R::DoctorPerformance],
            ),
            (Entity::Specialization, vec![R::Specializations, R::Doctors]),
            (Entity::Medication, vec![R::Medications, R::Medication]),
            (
                Entity::MedicalRecord,
                vec![R::MedicalRecords, R::MedicalRecord, R::LatestMedicalRecord],
            ),
            (
                Entity::Prescription,
                vec![R::Prescriptions, R::LatestMedicalRecord],
            ),
            (Entity::LabResult, vec![R::LabResults]),
            (Entity::Account, vec![R::CurrentUser, R::Doctors]),
        ]);

        Self { affects }
    }
}

impl DependencyTable {
    /// A table with no dependencies; mutations invalidate nothing.
    pub fn empty() -> Self {
        Self {
            affects: HashMap::new(),
        }
    }

    /// Replace the affected set for one entity.
    pub fn with(mut self, entity: Entity, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.affects
            .insert(entity, resources.into_iter().collect());
        self
    }

    pub fn affected(&self, entity: Entity) -> &[Resource] {
        self.affects
            .get(&entity)
            .map_or(&[][..], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_entity_invalidates_its_own_lists() {
        let table = DependencyTable::default();
        for entity in Entity::iter() {
            assert!(
                !table.affected(entity).is_empty(),
                "{entity} has no dependents"
            );
        }
        assert!(table.affected(Entity::Medication).contains(&Resource::Medications));
        assert!(
            table
                .affected(Entity::Appointment)
                .contains(&Resource::DashboardStatistics)
        );
    }

    #[test]
    fn overrides_replace_one_entry() {
        let table = DependencyTable::default().with(Entity::LabResult, [Resource::Patients]);
        assert_eq!(table.affected(Entity::LabResult), &[Resource::Patients]);
        assert!(DependencyTable::empty().affected(Entity::Patient).is_empty());
    }
}
