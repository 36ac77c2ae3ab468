// ── Dashboard statistics ──
//
// A derived view over four independent queries: today's appointments,
// today's queued appointments, the doctor roster, and the backend's own
// counters. Loading is the OR of the four; the error is the first one
// present in that declaration order.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clinic_api::{AppointmentFilter, DashboardStatistics, Paginated, Record};
use serde::Serialize;
use serde_json::Value;

use super::Context;
use crate::query::{Query, QueryError, QueryKey, QueryObserver, QueryState, Resource};

/// Staleness window of every dashboard query.
pub const DASHBOARD_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Appointment status of patients waiting to be seen.
const IN_QUEUE: &str = "in_queue";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub today_check_ins: u64,
    pub waiting_patients: u64,
    pub available_doctors: u64,
    pub new_registrations: u64,
}

/// `{stats, is_loading, error}` for the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub stats: DashboardStats,
    pub is_loading: bool,
    pub error: Option<QueryError>,
}

impl DashboardState {
    /// Combine the four constituent states.
    pub fn aggregate(
        today: &QueryState<Paginated<Record>>,
        in_queue: &QueryState<Paginated<Record>>,
        doctors: &QueryState<Paginated<Record>>,
        statistics: &QueryState<DashboardStatistics>,
    ) -> Self {
        let today_page = today.data.as_deref();
        let doctors_seen = distinct_ids(today_page, "doctor");
        let patients_seen = distinct_ids(today_page, "patient");

        let roster = doctors.data.as_ref().map_or(0, |d| d.count);
        let new_registrations = statistics
            .data
            .as_ref()
            .and_then(|s| s.new_registrations)
            .unwrap_or(patients_seen);

        let stats = DashboardStats {
            today_check_ins: today_page.map_or(0, |p| p.count),
            waiting_patients: in_queue.data.as_ref().map_or(0, |p| p.count),
            available_doctors: roster.saturating_sub(doctors_seen),
            new_registrations,
        };

        let error = [
            &today.error,
            &in_queue.error,
            &doctors.error,
            &statistics.error,
        ]
        .into_iter()
        .find_map(Clone::clone);

        Self {
            stats,
            is_loading: today.is_loading
                || in_queue.is_loading
                || doctors.is_loading
                || statistics.is_loading,
            error,
        }
    }
}

/// Number of distinct ids referenced by `field` (an object with `id`
/// or a bare id) across the page.
fn distinct_ids(page: Option<&Paginated<Record>>, field: &str) -> u64 {
    let Some(page) = page else {
        return 0;
    };
    let ids: HashSet<u64> = page
        .results
        .iter()
        .filter_map(|item| {
            let value = item.get(field)?;
            value
                .get("id")
                .and_then(Value::as_u64)
                .or_else(|| value.as_u64())
        })
        .collect();
    u64::try_from(ids.len()).unwrap_or(u64::MAX)
}

// ── View-model ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct StatsViewModel {
    ctx: Context,
}

impl StatsViewModel {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn dashboard(&self) -> DashboardQueries {
        self.dashboard_on(Local::now().date_naive())
    }

    pub fn dashboard_on(&self, today: NaiveDate) -> DashboardQueries {
        let all = AppointmentFilter {
            date: Some(today),
            ..AppointmentFilter::default()
        };
        let queued = AppointmentFilter {
            status: Some(IN_QUEUE.to_owned()),
            ..all.clone()
        };

        DashboardQueries {
            today: self.appointments(all, today),
            in_queue: self.appointments(queued, today),
            doctors: self
                .ctx
                .query(QueryKey::new(Resource::Doctors), |api| async move {
                    api.list_doctors(None).await
                })
                .stale_time(DASHBOARD_STALE_TIME),
            statistics: self
                .ctx
                .query(QueryKey::new(Resource::DashboardStatistics), |api| async move {
                    api.dashboard_statistics().await
                })
                .stale_time(DASHBOARD_STALE_TIME),
        }
    }

    fn appointments(
        &self,
        filter: AppointmentFilter,
        today: NaiveDate,
    ) -> Query<Paginated<Record>> {
        let key = QueryKey::new(Resource::Appointments).with_pairs(&filter.to_query(today));
        self.ctx
            .query(key, move |api| {
                let filter = filter.clone();
                async move { api.list_appointments_on(&filter, today).await }
            })
            .stale_time(DASHBOARD_STALE_TIME)
    }
}

/// The four constituent queries, in aggregation order.
#[derive(Debug, Clone)]
pub struct DashboardQueries {
    pub today: Query<Paginated<Record>>,
    pub in_queue: Query<Paginated<Record>>,
    pub doctors: Query<Paginated<Record>>,
    pub statistics: Query<DashboardStatistics>,
}

impl DashboardQueries {
    /// Resolve all four concurrently and aggregate their outcomes.
    pub async fn fetch(&self) -> DashboardState {
        let (today, in_queue, doctors, statistics) = tokio::join!(
            self.today.fetch(),
            self.in_queue.fetch(),
            self.doctors.fetch(),
            self.statistics.fetch(),
        );
        DashboardState::aggregate(
            &resolved(&self.today, today),
            &resolved(&self.in_queue, in_queue),
            &resolved(&self.doctors, doctors),
            &resolved(&self.statistics, statistics),
        )
    }

    pub fn observe(self) -> DashboardObserver {
        DashboardObserver {
            today: self.today.observe(),
            in_queue: self.in_queue.observe(),
            doctors: self.doctors.observe(),
            statistics: self.statistics.observe(),
        }
    }
}

/// Settled state for one finished fetch. A failure keeps whatever data
/// the slot still holds.
fn resolved<T: Send + Sync + 'static>(
    query: &Query<T>,
    outcome: Result<Arc<T>, QueryError>,
) -> QueryState<T> {
    match outcome {
        Ok(data) => QueryState {
            data: Some(data),
            is_loading: false,
            ..QueryState::default()
        },
        Err(error) => QueryState {
            data: query.peek().and_then(|s| s.data),
            error: Some(error),
            is_loading: false,
            ..QueryState::default()
        },
    }
}

/// Live dashboard: follows all four queries.
#[derive(Debug)]
pub struct DashboardObserver {
    today: QueryObserver<Paginated<Record>>,
    in_queue: QueryObserver<Paginated<Record>>,
    doctors: QueryObserver<Paginated<Record>>,
    statistics: QueryObserver<DashboardStatistics>,
}

impl DashboardObserver {
    pub fn state(&self) -> DashboardState {
        DashboardState::aggregate(
            &self.today.state(),
            &self.in_queue.state(),
            &self.doctors.state(),
            &self.statistics.state(),
        )
    }

    /// Wait for any constituent to change.
    pub async fn changed(&mut self) -> Option<DashboardState> {
        let changed = tokio::select! {
            s = self.today.changed() => s.is_some(),
            s = self.in_queue.changed() => s.is_some(),
            s = self.doctors.changed() => s.is_some(),
            s = self.statistics.changed() => s.is_some(),
        };
        changed.then(|| self.state())
    }

    /// Wait until none of the four is fetching.
    pub async fn settled(&mut self) -> DashboardState {
        let (today, in_queue, doctors, statistics) = tokio::join!(
            self.today.settled(),
            self.in_queue.settled(),
            self.doctors.settled(),
            self.statistics.settled(),
        );
        DashboardState::aggregate(&today, &in_queue, &doctors, &statistics)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn loaded<T>(value: T) -> QueryState<T> {
        QueryState {
            data: Some(Arc::new(value)),
            error: None,
            is_loading: false,
            is_fetching: false,
            updated_at: None,
        }
    }

    fn loading<T>() -> QueryState<T> {
        QueryState {
            data: None,
            error: None,
            is_loading: true,
            is_fetching: true,
            updated_at: None,
        }
    }

    fn failed<T>(status: u16) -> QueryState<T> {
        QueryState {
            data: None,
            error: Some(Arc::new(clinic_api::Error::Http {
                status,
                body: json!(null),
            })),
            is_loading: false,
            is_fetching: false,
            updated_at: None,
        }
    }

    fn page(items: Vec<Record>, count: u64) -> Paginated<Record> {
        Paginated {
            results: items,
            count,
            ..Paginated::default()
        }
    }

    #[test]
    fn derives_counts_from_todays_appointments() {
        let today = page(
            vec![
                json!({ "doctor": { "id": 1 }, "patient": { "id": 10 } }),
                json!({ "doctor": { "id": 1 }, "patient": { "id": 11 } }),
                json!({ "doctor": 2, "patient": 11 }),
            ],
            3,
        );
        let state = DashboardState::aggregate(
            &loaded(today),
            &loaded(page(vec![], 2)),
            &loaded(page(vec![], 6)),
            &loaded(DashboardStatistics::default()),
        );

        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(
            state.stats,
            DashboardStats {
                today_check_ins: 3,
                waiting_patients: 2,
                available_doctors: 4,
                new_registrations: 2,
            }
        );
    }

    #[test]
    fn backend_registrations_take_precedence() {
        let statistics = DashboardStatistics {
            new_registrations: Some(9),
            ..DashboardStatistics::default()
        };
        let state = DashboardState::aggregate(
            &loaded(page(vec![], 0)),
            &loaded(page(vec![], 0)),
            &loaded(page(vec![], 0)),
            &loaded(statistics),
        );
        assert_eq!(state.stats.new_registrations, 9);
        assert_eq!(state.stats.available_doctors, 0);
    }

    #[test]
    fn loading_if_any_constituent_is_loading() {
        let state = DashboardState::aggregate(
            &loaded(page(vec![], 1)),
            &loaded(page(vec![], 0)),
            &loading(),
            &loaded(DashboardStatistics::default()),
        );
        assert!(state.is_loading);
        assert_eq!(state.stats.today_check_ins, 1);
    }

    #[test]
    fn first_error_in_declaration_order_wins() {
        let state = DashboardState::aggregate(
            &loaded(page(vec![], 0)),
            &failed(500),
            &loaded(page(vec![], 0)),
            &failed(403),
        );
        assert_eq!(state.error.unwrap().status(), Some(500));

        let state =
            DashboardState::aggregate(&failed(404), &failed(500), &failed(502), &failed(503));
        assert_eq!(state.error.unwrap().status(), Some(404));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_reports_outcomes_of_all_four_queries() {
        let cache = crate::query::QueryCache::default();
        let slow_page = |count: u64| {
            move || async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, clinic_api::Error>(page(vec![json!({ "doctor": 1, "patient": 7 })], count))
            }
        };
        let queries = DashboardQueries {
            today: Query::new(&cache, QueryKey::new(Resource::Appointments), slow_page(4)),
            in_queue: Query::new(
                &cache,
                QueryKey::new(Resource::Appointments).with("status", IN_QUEUE),
                slow_page(1),
            ),
            doctors: Query::new(&cache, QueryKey::new(Resource::Doctors), slow_page(3)),
            statistics: Query::new(&cache, QueryKey::new(Resource::DashboardStatistics), || async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err::<DashboardStatistics, _>(clinic_api::Error::Http {
                    status: 503,
                    body: json!(null),
                })
            }),
        };

        let state = queries.fetch().await;
        assert!(!state.is_loading);
        assert_eq!(state.error.unwrap().status(), Some(503));
        assert_eq!(
            state.stats,
            DashboardStats {
                today_check_ins: 4,
                waiting_patients: 1,
                available_doctors: 2,
                new_registrations: 1,
            }
        );
    }
}
