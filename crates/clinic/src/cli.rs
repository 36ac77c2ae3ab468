//! Clap derive structures for the `clinic` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clinic_api::{DateFilter, RecordId};
use strum::IntoEnumIterator;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// clinic -- command-line client for the clinic management backend
#[derive(Debug, Parser)]
#[command(
    name = "clinic",
    version,
    about = "Manage patients, appointments and clinic records from the command line",
    long_about = "A command-line client for the clinic management REST API.\n\n\
        Signs in with JWT credentials, refreshes them transparently, and\n\
        renders patients, appointments, doctors, records and reports.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "CLINIC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 's', env = "CLINIC_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CLINIC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CLINIC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "CLINIC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
    /// Comma-separated values with a header row
    Csv,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store session credentials
    Login(LoginArgs),

    /// Sign out and forget session credentials
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage patients
    #[command(alias = "pt")]
    Patients(PatientsArgs),

    /// Manage appointments
    #[command(alias = "appt")]
    Appointments(AppointmentsArgs),

    /// Manage doctors
    #[command(alias = "dr")]
    Doctors(DoctorsArgs),

    /// Manage doctor specializations
    Specializations(SpecializationsArgs),

    /// Manage the medication catalogue
    #[command(alias = "meds")]
    Medications(MedicationsArgs),

    /// Manage medical records
    #[command(alias = "rec")]
    Records(RecordsArgs),

    /// Manage prescriptions
    #[command(alias = "rx")]
    Prescriptions(PrescriptionsArgs),

    /// Manage lab results
    LabResults(LabResultsArgs),

    /// Clinic reports
    Reports(ReportsArgs),

    /// Dashboard statistics
    Stats(StatsArgs),

    /// Manage the signed-in account
    Account(AccountArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Shared pagination and search arguments for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Free-text search
    #[arg(long, short = 'S')]
    pub search: Option<String>,
}

/// A JSON request body read from disk.
#[derive(Debug, Args)]
pub struct PayloadArgs {
    /// Path to a JSON file with the request body
    #[arg(long, short = 'F', value_name = "PATH")]
    pub from_file: PathBuf,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (defaults to the profile's email)
    #[arg(long, short = 'e', env = "CLINIC_EMAIL")]
    pub email: Option<String>,

    /// Store the password in the system keyring after a successful login
    #[arg(long)]
    pub remember: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PATIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PatientsArgs {
    #[command(subcommand)]
    pub command: PatientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PatientsCommand {
    /// List active patients
    #[command(alias = "ls")]
    List(ListArgs),

    /// List deactivated patients
    Deactivated(ListArgs),

    /// Get patient details
    Get {
        /// Patient ID
        id: RecordId,
    },

    /// Register a new patient
    Create(PayloadArgs),

    /// Replace a patient's details
    Update {
        /// Patient ID
        id: RecordId,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a patient
    Delete {
        /// Patient ID
        id: RecordId,
    },

    /// Reactivate a deactivated patient
    Activate {
        /// Patient ID
        id: RecordId,
    },

    /// Deactivate a patient
    Deactivate {
        /// Patient ID
        id: RecordId,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  APPOINTMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AppointmentsArgs {
    #[command(subcommand)]
    pub command: AppointmentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AppointmentsCommand {
    /// List appointments
    #[command(alias = "ls")]
    List(AppointmentListArgs),

    /// Get appointment details
    Get {
        /// Appointment ID
        id: RecordId,
    },

    /// Book an appointment
    Create(PayloadArgs),

    /// Replace an appointment
    Update {
        /// Appointment ID
        id: RecordId,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete an appointment
    Delete {
        /// Appointment ID
        id: RecordId,
    },

    /// Cancel an appointment
    Cancel {
        /// Appointment ID
        id: RecordId,
    },

    /// Mark an appointment completed
    Complete {
        /// Appointment ID
        id: RecordId,
    },

    /// Move a checked-in patient into the waiting queue
    Queue {
        /// Appointment ID
        id: RecordId,
    },
}

#[derive(Debug, Args)]
pub struct AppointmentListArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Only this doctor's appointments
    #[arg(long)]
    pub doctor: Option<RecordId>,

    /// Only this patient's appointments
    #[arg(long)]
    pub patient: Option<RecordId>,

    /// Appointment status (scheduled, in_queue, completed, cancelled)
    #[arg(long)]
    pub status: Option<String>,

    /// Exact appointment date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "when")]
    pub date: Option<NaiveDate>,

    /// Relative date window
    #[arg(long, value_parser = parse_date_filter)]
    pub when: Option<DateFilter>,
}

fn parse_date_filter(s: &str) -> Result<DateFilter, String> {
    s.parse().map_err(|_| {
        let expected: Vec<&'static str> = DateFilter::iter().map(Into::into).collect();
        format!("unknown date filter '{s}' (expected one of: {})", expected.join(", "))
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DOCTORS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DoctorsArgs {
    #[command(subcommand)]
    pub command: DoctorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DoctorsCommand {
    /// List doctors
    #[command(alias = "ls")]
    List {
        /// Free-text search
        #[arg(long, short = 'S')]
        search: Option<String>,
    },

    /// Add a doctor
    Create(PayloadArgs),

    /// Update a doctor's profile
    Update {
        /// Doctor ID
        id: RecordId,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Remove a doctor
    Delete {
        /// Doctor ID
        id: RecordId,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SPECIALIZATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SpecializationsArgs {
    #[command(subcommand)]
    pub command: SpecializationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SpecializationsCommand {
    /// List specializations
    #[command(alias = "ls")]
    List,

    /// Add a specialization
    Create {
        /// Specialization name
        name: String,
    },

    /// Remove a specialization
    Delete {
        /// Specialization ID
        id: RecordId,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MEDICATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MedicationsArgs {
    #[command(subcommand)]
    pub command: MedicationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum MedicationsCommand {
    /// List medications
    #[command(alias = "ls")]
    List(ListArgs),

    /// Get medication details
    Get {
        /// Medication ID
        id: RecordId,
    },

    /// Add a medication to the catalogue
    Create(PayloadArgs),

    /// Replace a medication
    Update {
        /// Medication ID
        id: RecordId,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Remove a medication
    Delete {
        /// Medication ID
        id: RecordId,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MEDICAL RECORDS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RecordsArgs {
    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    /// List medical records
    #[command(alias = "ls")]
    List {
        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,

        /// Only this patient's records
        #[arg(long)]
        patient: Option<RecordId>,
    },

    /// Get a medical record
    Get {
        /// Record ID
        id: RecordId,
    },

    /// Show a patient's most recent record
    Latest {
        /// Patient ID
        patient: RecordId,
    },

    /// Create a medical record
    Create(PayloadArgs),

    /// Replace a medical record
    Update {
        /// Record ID
        id: RecordId,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a medical record
    Delete {
        /// Record ID
        id: RecordId,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PRESCRIPTIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PrescriptionsArgs {
    #[command(subcommand)]
    pub command: PrescriptionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PrescriptionsCommand {
    /// List a patient's prescriptions
    #[command(alias = "ls")]
    List {
        /// Patient ID
        patient: RecordId,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Open a prescription on a medical record
    Create {
        /// Medical record ID
        medical_record: RecordId,
    },

    /// Add medication lines to a prescription
    ///
    /// The file holds a JSON array of
    /// `{medication_id, dosage, frequency, duration, instructions}`.
    AddMedications {
        /// Prescription ID
        prescription: RecordId,

        #[command(flatten)]
        payload: PayloadArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LAB RESULTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LabResultsArgs {
    #[command(subcommand)]
    pub command: LabResultsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LabResultsCommand {
    /// List a patient's lab results
    #[command(alias = "ls")]
    List {
        /// Patient ID
        patient: RecordId,
    },

    /// Record a lab result
    Add {
        /// Patient ID
        patient: RecordId,

        /// Test name
        #[arg(long)]
        test_name: String,

        /// Test date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        test_date: Option<NaiveDate>,

        /// Result text
        #[arg(long, default_value = "")]
        results: String,

        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPORTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// Appointment volume and status breakdown
    Metrics,

    /// Patient demographics
    Patients {
        /// Write the demographics as CSV to PATH
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },

    /// Per-doctor performance
    Doctors {
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Doctor availability
    AvailableDoctors,

    /// Appointments report
    Appointments {
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Relative date window
        #[arg(long, value_parser = parse_date_filter)]
        when: Option<DateFilter>,

        /// Write the page as CSV to PATH
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Keep running and refresh every N seconds
    #[arg(long, short = 'w', value_name = "SECONDS")]
    pub watch: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Show account details
    Show,

    /// Set availability status (available, busy, off_duty, ...)
    Status {
        /// New status
        status: String,
    },

    /// Replace account profile fields
    Update(ProfileArgs),

    /// Replace the doctor profile of the signed-in doctor
    UpdateDoctor(ProfileArgs),

    /// Upload a new profile picture
    UploadAvatar {
        /// Image file
        path: PathBuf,
    },

    /// Change the account password
    SetPassword,

    /// Permanently delete the account
    Delete,
}

/// A profile update sent as a multipart form.
#[derive(Debug, Args)]
#[group(required = true, multiple = true)]
pub struct ProfileArgs {
    /// Path to a JSON object with the profile fields
    #[arg(long, short = 'F', value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    /// Attach a file as a form field (repeatable)
    #[arg(long, value_name = "FIELD=PATH", value_parser = parse_attachment)]
    pub attach: Vec<(String, PathBuf)>,
}

fn parse_attachment(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((field, path)) if !field.is_empty() && !path.is_empty() => {
            Ok((field.to_owned(), PathBuf::from(path)))
        }
        _ => Err(format!("expected FIELD=PATH, got '{s}'")),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Config key (server, email, insecure, timeout, stale_time, ca_cert, token_store)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
