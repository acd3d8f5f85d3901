// config.rs — Run-time configuration and its defaults.
//
// Defaults can be overridden through the environment (TZIP_NBWORKERS,
// TZIP_QUEUE_CAPACITY) and then by command-line flags.

use crate::displaylevel;
use crate::error::ConfigError;

pub const MB: usize = 1 << 20;

/// Name of the archive written when no output path is given.
pub const ARCHIVE_NAME_DEFAULT: &str = "text.tzip";

/// Suffix a file name must end with to be archived (case-sensitive).
pub const TEXT_SUFFIX: &str = ".txt";

/// Largest file accepted by a worker, in bytes. Files above it are rejected.
pub const MAX_FILE_SIZE_DEFAULT: usize = MB;

/// Record length fields are `u32`, so no buffer may exceed this.
pub const MAX_FILE_SIZE_LIMIT: usize = u32::MAX as usize;

/// Queue slots between the dispatcher and the workers.
pub const QUEUE_CAPACITY_DEFAULT: usize = 64;

/// Maximum number of worker threads selectable at runtime.
pub const NB_WORKERS_MAX: usize = 200;

/// zlib compression level; 9 is maximum effort.
pub const LEVEL_MAX: u32 = 9;
pub const LEVEL_DEFAULT: u32 = LEVEL_MAX;

const ENV_NBWORKERS: &str = "TZIP_NBWORKERS";
const ENV_QUEUE_CAPACITY: &str = "TZIP_QUEUE_CAPACITY";

/// What the writer does when it reaches a slot whose task failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Write no record for the task, log it and keep going.
    #[default]
    Skip,
    /// Stop every worker, discard the partial archive and fail the run.
    Abort,
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub nb_workers: usize,
    pub queue_capacity: usize,
    pub max_file_size: usize,
    pub level: u32,
    pub failure_policy: FailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            nb_workers: default_nb_workers(),
            queue_capacity: QUEUE_CAPACITY_DEFAULT,
            max_file_size: MAX_FILE_SIZE_DEFAULT,
            level: LEVEL_DEFAULT,
            failure_policy: FailurePolicy::Skip,
        }
    }
}

impl Config {
    /// Defaults with the `TZIP_*` environment overrides applied.
    pub fn from_env() -> Self {
        Config {
            nb_workers: init_nb_workers(),
            queue_capacity: init_queue_capacity(),
            ..Config::default()
        }
    }

    pub fn with_nb_workers(mut self, nb_workers: usize) -> Self {
        self.nb_workers = nb_workers;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Checks every field against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nb_workers == 0 || self.nb_workers > NB_WORKERS_MAX {
            return Err(ConfigError::NbWorkers {
                got: self.nb_workers,
                max: NB_WORKERS_MAX,
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::QueueCapacity);
        }
        if self.max_file_size == 0 || self.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(ConfigError::MaxFileSize {
                got: self.max_file_size,
                max: MAX_FILE_SIZE_LIMIT,
            });
        }
        if self.level > LEVEL_MAX {
            return Err(ConfigError::Level {
                got: self.level,
                max: LEVEL_MAX,
            });
        }
        Ok(())
    }
}

/// Default worker count: physical cores minus a small reserve, at least 1.
pub fn default_nb_workers() -> usize {
    let nb_cores = num_cpus::get_physical();
    let spared = 1 + (nb_cores >> 3);
    if nb_cores <= spared {
        1
    } else {
        (nb_cores - spared).min(NB_WORKERS_MAX)
    }
}

/// Read the worker count from `TZIP_NBWORKERS`, falling back to
/// [`default_nb_workers`].
pub fn init_nb_workers() -> usize {
    init_nb_workers_from(std::env::var(ENV_NBWORKERS).ok().as_deref())
}

/// Testable core of [`init_nb_workers`].
///
/// Values above [`NB_WORKERS_MAX`] are clamped, matching the range the
/// `-T` flag accepts.
pub fn init_nb_workers_from(env_val: Option<&str>) -> usize {
    match parse_env_count(ENV_NBWORKERS, env_val) {
        Some(n) if n > NB_WORKERS_MAX => {
            displaylevel!(
                2,
                "Requested {} workers via {}, using the maximum of {} \n",
                n,
                ENV_NBWORKERS,
                NB_WORKERS_MAX
            );
            NB_WORKERS_MAX
        }
        Some(n) => n,
        None => default_nb_workers(),
    }
}

/// Read the queue capacity from `TZIP_QUEUE_CAPACITY`, falling back to
/// [`QUEUE_CAPACITY_DEFAULT`].
pub fn init_queue_capacity() -> usize {
    init_queue_capacity_from(std::env::var(ENV_QUEUE_CAPACITY).ok().as_deref())
}

/// Testable core of [`init_queue_capacity`].
pub fn init_queue_capacity_from(env_val: Option<&str>) -> usize {
    parse_env_count(ENV_QUEUE_CAPACITY, env_val).unwrap_or(QUEUE_CAPACITY_DEFAULT)
}

// Zero and non-numeric values are ignored with a warning.
fn parse_env_count(name: &str, env_val: Option<&str>) -> Option<usize> {
    let env = env_val?;
    match env.trim().parse::<usize>() {
        Ok(val) if val > 0 => Some(val),
        _ => {
            displaylevel!(
                2,
                "Ignore environment variable setting {}={}: not a valid positive value \n",
                name,
                env
            );
            None
        }
    }
}
