//! Typed errors at module boundaries and the exit-code taxonomy of spec §6/§7.
//!
//! Library code never panics on malformed *input*; it returns one of these.
//! The only place a `downward-sas` process actually calls `std::process::exit`
//! is the funnel in `src/bin/planner.rs`, which maps every error variant (and
//! every [`ExitCode`] a successful run can still produce, e.g. `Unsolvable`)
//! to the documented process exit status.

use std::fmt;

/// Stable process exit codes, matching spec §6 verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ExitCode {
    Success = 0,
    SearchUnsolvable = 11,
    SearchUnsolvedIncomplete = 12,
    SearchOutOfMemory = 22,
    SearchOutOfTime = 23,
    SearchCriticalError = 32,
    SearchInputError = 33,
    SearchUnsupported = 34,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Errors raised while reading and validating the SAS³ task format (spec §6.1).
#[derive(Debug, thiserror::Error)]
pub enum TaskParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("unsupported SAS protocol version {found}, expected {expected}")]
    UnsupportedVersion { found: i32, expected: i32 },
    #[error("fact ({var}, {value}) is out of range for variable {var} with domain size {domain_size}")]
    FactOutOfRange {
        var: usize,
        value: i32,
        domain_size: usize,
    },
    #[error("mutex group contains duplicate fact ({var}, {value})")]
    DuplicateMutexFact { var: usize, value: i32 },
    #[error("goal must be non-empty")]
    EmptyGoal,
    #[error("mutex group must contain at least one fact")]
    EmptyMutexGroup,
    #[error("operator '{name}' has conflicting simultaneous effects on variable {var}")]
    ConflictingEffects { name: String, var: usize },
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: String },
}

/// Errors raised while parsing a `--search` configuration expression.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not parse search configuration: {0}")]
    Syntax(String),
    #[error("unknown component '{0}'")]
    UnknownComponent(String),
    #[error("component '{component}' requires argument '{argument}'")]
    MissingArgument {
        component: String,
        argument: String,
    },
}

/// A heuristic or pruning method that does not support some feature of the
/// task it was asked to run on (spec §4.5, §4.7: axioms / conditional
/// effects unsupported by LM-cut and the stubborn-set family).
#[derive(Debug, thiserror::Error)]
#[error("{component} does not support {feature} but the task contains it")]
pub struct UnsupportedFeatureError {
    pub component: &'static str,
    pub feature: &'static str,
}

/// Top-level error funnelled to an [`ExitCode`] by the binary entry point.
#[derive(Debug, thiserror::Error)]
pub enum DownwardError {
    #[error(transparent)]
    TaskParse(#[from] TaskParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedFeatureError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownwardError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            DownwardError::TaskParse(_) => ExitCode::SearchInputError,
            DownwardError::Config(_) => ExitCode::SearchInputError,
            DownwardError::Unsupported(_) => ExitCode::SearchUnsupported,
            DownwardError::Io(_) => ExitCode::SearchInputError,
        }
    }
}

impl fmt::Debug for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", *self as i32, self)
    }
}
