// Project-wide constants
//
// Centralised here so defaults have one source of truth.

/// Model used when neither the config file nor the CLI names one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// System prompt used when the caller supplies none.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Output token cap for generation calls (candidates and plan-search stages).
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Per-request HTTP timeout for completion services.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Directory under `$HOME` holding the config file.
pub const CONFIG_DIR: &str = ".ponder";

/// Config file name inside `CONFIG_DIR`.
pub const CONFIG_FILE: &str = "config.toml";
