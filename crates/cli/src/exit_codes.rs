//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `dora` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error (bad arguments, unknown level)               |
//! | 3    | Project config cannot be parsed or is invalid            |
//! | 4    | Runtime failure: unreadable file, bad GeoJSON or mapping |
//! | 5    | `validate` found error-severity diagnostics              |
//! | 6    | `map --strict` left one-sided links in the mapping       |

use dora_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, level not declared in the project.
pub const EXIT_USAGE: u8 = 2;

/// Project config is not valid TOML or fails validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// I/O failure or malformed GeoJSON / mapping input.
pub const EXIT_RUNTIME: u8 = 4;

/// Validation found at least one error-severity diagnostic.
pub const EXIT_VALIDATION_ERRORS: u8 = 5;

/// Mapping still has added/removed units and `--strict` was given.
pub const EXIT_UNRESOLVED: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::UnknownLevel(_) => EXIT_INVALID_CONFIG,
        ReconError::GeoJsonParse { .. } | ReconError::MappingParse(_) => EXIT_RUNTIME,
    }
}
