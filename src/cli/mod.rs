pub mod commands;
pub mod handlers;

pub use commands::{
    BackendArg, Cli, Commands, FormatArg, ListArgs, MemorizationAction, ResourceArg, ReviewAction,
    SettingsAction, SortArg, StatusArg, StudentAction, TeacherAction,
};
