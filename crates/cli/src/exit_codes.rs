//! CLI Exit Code Registry
//!
//! Every exit code `keepsake` can return. Scripts rely on these.
//!
//! | Code | Meaning                                               |
//! |------|-------------------------------------------------------|
//! | 0    | Success                                               |
//! | 1    | General error (unspecified)                           |
//! | 2    | Usage error (bad arguments, invalid parameter)        |
//! | 3    | I/O failure (preference file or tree file)            |
//! | 4    | Malformed input (bad XML, JSON or stored value)       |
//! | 5    | Key not found (`get`)                                 |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, blank file name or prefix.
pub const EXIT_USAGE: u8 = 2;

/// Reading or writing a file failed.
pub const EXIT_IO: u8 = 3;

/// Input could not be parsed: layout JSON, properties XML, stored sizes.
pub const EXIT_MALFORMED: u8 = 4;

/// `get` asked for a key no layer defines.
pub const EXIT_KEY_NOT_FOUND: u8 = 5;
