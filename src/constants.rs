// src/constants.rs

/// The name of the marker directory that identifies a project root.
pub const REPO_DIR: &str = ".prm";

/// Directory (inside `.prm/`) holding the command template files.
pub const COMMAND_DIR: &str = "commands";

/// Directory (inside `.prm/`) holding one settings file per registered context.
pub const CONTEXT_DIR: &str = "contexts";

/// The append-only context registry (`<path>\t<fileId>` per line).
pub const CONTEXTLIST_FILE: &str = "CONTEXTLIST";

/// The append-only execution log (one JSON object per line).
pub const LOG_FILE: &str = "LOG";

/// The project-wide settings file at the root of the settings chain.
pub const SETTINGS_FILE: &str = "SETTINGS";

/// Suffix of command template files in the command directory.
pub const COMMAND_SPEC_SUFFIX: &str = ".yaml";

/// Suffix of generated context settings files.
pub const CONTEXT_FILE_SUFFIX: &str = ".yaml";

/// Opening marker of a variable reference inside a VAR component.
pub const VAR_OPEN: &str = "[[";

/// Closing marker of a variable reference inside a VAR component.
pub const VAR_CLOSE: &str = "]]";

/// Settings key holding the client command line that receives SQL statements.
pub const SQL_CLIENT_KEY: &str = "sql.client";
