use crate::config::BackendKind;
use crate::list::SortDirection;
use crate::model::MemorizationStatus;
use crate::report::ReportFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tahfidz")]
#[command(
    author,
    version,
    about = "Administration of a Quran memorization (tahfidz) program from the terminal"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write JSON logs to this file (rotated daily)
    #[arg(long, global = true, env = "TAHFIDZ_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new tahfidz project in the current directory
    Init {
        /// Where records are stored
        #[arg(long, value_enum, default_value = "local")]
        backend: BackendArg,

        /// Base URL of the hosted backend (rest backend only)
        #[arg(long)]
        url: Option<String>,

        /// Data directory, relative to the project root
        #[arg(long)]
        data_path: Option<String>,
    },

    /// Sign in to the hosted backend
    Login {
        /// Account email
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "TAHFIDZ_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Remove the stored session
    Logout,

    /// Show the signed-in account
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage students
    #[command(visible_alias = "santri")]
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Manage memorization entries
    #[command(visible_alias = "hafalan")]
    Memorization {
        #[command(subcommand)]
        action: MemorizationAction,
    },

    /// Manage review sessions
    #[command(visible_alias = "murajaah")]
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },

    /// List students with their latest memorization and review
    Overview(ListArgs),

    /// Manage teachers
    #[command(visible_alias = "guru")]
    Teacher {
        #[command(subcommand)]
        action: TeacherAction,
    },

    /// Write a report of every record matching the filters
    Export {
        /// Which records to report on
        #[arg(value_enum)]
        resource: ResourceArg,

        /// Filter as KEY=VALUE (repeatable)
        #[arg(short, long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,

        /// Directory to write the report into (defaults to the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// View and change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

/// Search, sort and paging options shared by every `list` command.
#[derive(Args, Clone, Default)]
pub struct ListArgs {
    /// Filter as KEY=VALUE (repeatable); an empty value clears the filter
    #[arg(short, long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Page number (clamped to the available pages)
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Sort direction (defaults per resource)
    #[arg(short, long, value_enum)]
    pub sort: Option<SortArg>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum StudentAction {
    /// List students
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Add a student
    Add {
        /// Full name
        name: String,

        /// Class or cohort label, e.g. pagi
        #[arg(short, long)]
        class: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a student
    Edit {
        /// Student ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// New class label (empty to clear)
        #[arg(long)]
        class: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a student
    #[command(visible_alias = "rm")]
    Delete {
        /// Student ID
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a student's profile and progress
    Show {
        /// Student ID
        id: String,

        /// History page
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum MemorizationAction {
    /// List memorization entries
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Record a memorization entry
    Add {
        /// Student ID
        #[arg(long)]
        student: String,

        /// Chapter (surah) name
        #[arg(long)]
        chapter: String,

        /// First verse
        #[arg(long)]
        start: u32,

        /// Last verse
        #[arg(long)]
        end: u32,

        #[arg(long, value_enum, default_value = "submitted")]
        status: StatusArg,

        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a memorization entry
    Edit {
        /// Entry ID
        id: String,

        #[arg(long)]
        student: Option<String>,

        #[arg(long)]
        chapter: Option<String>,

        #[arg(long)]
        start: Option<u32>,

        #[arg(long)]
        end: Option<u32>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        #[arg(long)]
        date: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a memorization entry
    #[command(visible_alias = "rm")]
    Delete {
        /// Entry ID
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one memorization entry
    Show {
        /// Entry ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ReviewAction {
    /// List review sessions
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Record a review session
    Add {
        /// Student ID
        #[arg(long)]
        student: String,

        /// Teacher ID
        #[arg(long)]
        teacher: String,

        /// Chapter (surah) name
        #[arg(long)]
        chapter: String,

        #[arg(long)]
        start: Option<u32>,

        #[arg(long)]
        end: Option<u32>,

        /// Quality label, e.g. baik
        #[arg(long)]
        quality: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a review session
    Edit {
        /// Review ID
        id: String,

        #[arg(long)]
        student: Option<String>,

        #[arg(long)]
        teacher: Option<String>,

        #[arg(long)]
        chapter: Option<String>,

        #[arg(long)]
        start: Option<u32>,

        #[arg(long)]
        end: Option<u32>,

        /// New quality label (empty to clear)
        #[arg(long)]
        quality: Option<String>,

        /// New notes (empty to clear)
        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        date: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a review session
    #[command(visible_alias = "rm")]
    Delete {
        /// Review ID
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one review session
    Show {
        /// Review ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum TeacherAction {
    /// List teachers
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Add a teacher
    Add {
        /// Full name
        name: String,

        /// Date joined as YYYY-MM-DD
        #[arg(long)]
        joined: Option<String>,

        /// Phone or email
        #[arg(long)]
        contact: Option<String>,

        #[arg(long)]
        address: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a teacher
    Edit {
        /// Teacher ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// Date joined as YYYY-MM-DD (empty to clear)
        #[arg(long)]
        joined: Option<String>,

        /// New contact (empty to clear)
        #[arg(long)]
        contact: Option<String>,

        /// New address (empty to clear)
        #[arg(long)]
        address: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a teacher
    #[command(visible_alias = "rm")]
    Delete {
        /// Teacher ID
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one teacher
    Show {
        /// Teacher ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print all settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one setting, e.g. `tahfidz.items_per_page`
    Get { key: String },

    /// Change one setting, e.g. `display.theme dark`
    Set { key: String, value: String },

    /// Restore defaults (the gateway connection is kept)
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Write settings as JSON
    Export {
        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load settings from a JSON export
    Import { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    Local,
    Rest,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Local => BackendKind::Local,
            BackendArg::Rest => BackendKind::Rest,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ResourceArg {
    #[value(alias = "santri")]
    Students,
    #[value(alias = "hafalan")]
    Memorization,
    #[value(alias = "murajaah")]
    Reviews,
    #[value(alias = "guru")]
    Teachers,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortDirection {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Asc => SortDirection::Ascending,
            SortArg::Desc => SortDirection::Descending,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    #[value(alias = "setor")]
    Submitted,
    #[value(alias = "hafal")]
    Memorized,
    Pending,
}

impl From<StatusArg> for MemorizationStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Submitted => MemorizationStatus::Submitted,
            StatusArg::Memorized => MemorizationStatus::Memorized,
            StatusArg::Pending => MemorizationStatus::Pending,
        }
    }
}
