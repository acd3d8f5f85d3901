// display.rs — Display level global and stderr notification macros.
//
// All diagnostics go to stderr so that stdout stays reserved for command
// output (the ratio line, `list` rows).
//
// 0 = no output; 1 = errors only; 2 = normal; 3 = progress; 4 = verbose

use std::sync::atomic::{AtomicU32, Ordering};

/// Default display level used by the binary.
pub const DISPLAY_LEVEL_DEFAULT: u32 = 2;

/// Highest meaningful display level.
pub const DISPLAY_LEVEL_MAX: u32 = 4;

pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(DISPLAY_LEVEL_DEFAULT);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level, clamped to [`DISPLAY_LEVEL_MAX`].
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level.min(DISPLAY_LEVEL_MAX), Ordering::Relaxed);
}

/// Derive the display level from the number of `-v` and `-q` flags seen on
/// the command line, starting from [`DISPLAY_LEVEL_DEFAULT`].
pub fn level_from_flags(verbose: u8, quiet: u8) -> u32 {
    let level = DISPLAY_LEVEL_DEFAULT as i64 + verbose as i64 - quiet as i64;
    level.clamp(0, DISPLAY_LEVEL_MAX as i64) as u32
}

/// Print to stderr when the display level is at or above `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::display::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}
