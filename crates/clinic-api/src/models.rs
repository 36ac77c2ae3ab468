// Wire models shared by the resource endpoints.
//
// Backend entities are opaque JSON records; only the envelopes, filter
// parameters, and a handful of request bodies are typed here.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::client::FormPart;

/// An opaque backend entity.
pub type Record = serde_json::Value;

/// Backend primary key.
pub type RecordId = u64;

// ── Pagination envelope ─────────────────────────────────────────────

/// A page of results: `{ results, count, next, previous }`.
///
/// Decoding also accepts a bare JSON array (unpaginated endpoints), which
/// is normalised to a single page with `count = results.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub results: Vec<T>,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

impl<T> Paginated<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            count: 0,
            next: None,
            previous: None,
            total_pages: None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Paginated<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<U> {
            Envelope {
                results: Vec<U>,
                #[serde(default)]
                count: Option<u64>,
                #[serde(default)]
                next: Option<String>,
                #[serde(default)]
                previous: Option<String>,
                #[serde(default)]
                total_pages: Option<u64>,
            },
            Bare(Vec<U>),
        }

        Ok(match Repr::<T>::deserialize(deserializer)? {
            Repr::Envelope {
                results,
                count,
                next,
                previous,
                total_pages,
            } => {
                let len = results.len() as u64;
                Self {
                    count: count.map_or(len, |c| c.max(len)),
                    results,
                    next,
                    previous,
                    total_pages,
                }
            }
            Repr::Bare(results) => Self {
                count: results.len() as u64,
                results,
                ..Self::default()
            },
        })
    }
}

// ── Query parameters ────────────────────────────────────────────────

/// Generic collection parameters: `?page=&page_size=&search=&ordering=`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl ListParams {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = Some(ordering.into());
        self
    }

    /// Query pairs, omitting unset and empty values.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(page) = self.page {
            q.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            q.push(("page_size", size.to_string()));
        }
        push_non_empty(&mut q, "search", self.search.as_deref());
        push_non_empty(&mut q, "ordering", self.ordering.as_deref());
        q
    }
}

/// Relative date windows understood by the appointment report filter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DateFilter {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
}

impl DateFilter {
    /// Inclusive `(start, end)` date range relative to `today`.
    ///
    /// Weeks run Sunday through Saturday.
    pub fn range(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let since_sunday = u64::from(today.weekday().num_days_from_sunday());
        let week_start = today - Days::new(since_sunday);
        let month_start = today.with_day(1).unwrap_or(today);
        match self {
            Self::Today => (today, today),
            Self::Yesterday => {
                let d = today - Days::new(1);
                (d, d)
            }
            Self::ThisWeek => (week_start, week_start + Days::new(6)),
            Self::LastWeek => (week_start - Days::new(7), week_start - Days::new(1)),
            Self::ThisMonth => {
                let next_month = month_start + Months::new(1);
                (month_start, next_month - Days::new(1))
            }
            Self::LastMonth => (month_start - Months::new(1), month_start - Days::new(1)),
        }
    }
}

/// Filters accepted by `GET /appointments/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AppointmentFilter {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub doctor: Option<RecordId>,
    pub patient: Option<RecordId>,
    pub status: Option<String>,
    /// Exact appointment date.
    pub date: Option<NaiveDate>,
    /// Relative window, expanded to `appointment_date_after/before`.
    pub date_filter: Option<DateFilter>,
}

impl AppointmentFilter {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    /// Query pairs; `today` anchors any relative date filter.
    pub fn to_query(&self, today: NaiveDate) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(page) = self.page {
            q.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            q.push(("page_size", size.to_string()));
        }
        push_non_empty(&mut q, "search", self.search.as_deref());
        if let Some(doctor) = self.doctor {
            q.push(("doctor", doctor.to_string()));
        }
        if let Some(patient) = self.patient {
            q.push(("patient", patient.to_string()));
        }
        push_non_empty(&mut q, "status", self.status.as_deref());
        if let Some(date) = self.date {
            q.push(("appointment_date", date.to_string()));
        }
        if let Some(filter) = self.date_filter {
            let (start, end) = filter.range(today);
            q.push(("appointment_date_after", start.to_string()));
            q.push(("appointment_date_before", end.to_string()));
        }
        q
    }
}

fn push_non_empty(q: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        q.push((key, v.to_owned()));
    }
}

// ── Auth payloads ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
}

// ── Request bodies ──────────────────────────────────────────────────

/// One medication line on a prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionMedication {
    pub medication_id: RecordId,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddMedicationsRequest<'a> {
    pub prescription_id: RecordId,
    pub medications: &'a [PrescriptionMedication],
}

/// Body for `POST /lab-results/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLabResult {
    pub patient_id: RecordId,
    pub test_name: String,
    /// `YYYY-MM-DD`
    pub test_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub results: String,
}

/// Body for `POST /auth/users/set_password/`.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

// ── Multipart uploads ───────────────────────────────────────────────

/// A file sent as one part of a `multipart/form-data` body.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    /// `None` leaves the part untyped.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Image types are recognised by file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        let content_type = match extension.as_deref() {
            Some("png") => Some("image/png"),
            Some("jpg" | "jpeg") => Some("image/jpeg"),
            Some("gif") => Some("image/gif"),
            Some("webp") => Some("image/webp"),
            _ => None,
        };
        Self {
            file_name,
            content_type: content_type.map(str::to_owned),
            bytes,
        }
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A profile update for `PUT /auth/users/me/` or `PUT /doctors/me/`,
/// sent as `multipart/form-data`.
///
/// Each field becomes a text part. `null` fields are left out, strings are
/// sent verbatim and any other value as its JSON text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub files: Vec<(String, Attachment)>,
}

impl ProfileForm {
    pub fn new(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields,
            files: Vec::new(),
        }
    }

    #[must_use]
    pub fn attach(mut self, field: impl Into<String>, file: Attachment) -> Self {
        self.files.push((field.into(), file));
        self
    }

    /// The multipart body: text fields first, then files.
    pub fn parts(&self) -> Vec<FormPart> {
        let text = self.fields.iter().filter_map(|(name, value)| {
            let value = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(FormPart::Text {
                name: name.clone(),
                value,
            })
        });
        let files = self.files.iter().map(|(name, file)| FormPart::File {
            name: name.clone(),
            file: file.clone(),
        });
        text.chain(files).collect()
    }
}

// ── Statistics ──────────────────────────────────────────────────────

/// `GET /patients/patients/statistics/`
///
/// Doctors receive a subset of the fields, so every count is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStatistics {
    #[serde(default)]
    pub patients_today: Option<u64>,
    #[serde(default)]
    pub active_patients: Option<u64>,
    #[serde(default)]
    pub appointments_today: Option<u64>,
    #[serde(default)]
    pub available_doctors: Option<u64>,
    #[serde(default)]
    pub new_registrations: Option<u64>,
    #[serde(default)]
    pub waiting_patients: Option<u64>,
}
