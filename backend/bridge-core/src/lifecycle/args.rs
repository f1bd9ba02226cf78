//! Command-line arguments for the native process.
//!
//! Layout: base flags, `--url=<url>`, one `--window-<kebab-key>=<value>` per
//! window option, then the `processArgs` passthrough tokens. Window options come
//! from a `BTreeMap`, so the output is the same for every insertion order.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use log::warn;
use regex::{Captures, Regex};
use serde_json::Value;

pub const BASE_FLAGS: [&str; 4] = [
    "--load-dir-res",
    "--path=.",
    "--export-auth-info",
    "--neu-dev-extension",
];

/// Window option that is passed through instead of becoming a flag.
pub const PROCESS_ARGS_KEY: &str = "processArgs";

/// Window option that makes the host exit along with the native process.
pub const EXIT_PROCESS_ON_CLOSE_KEY: &str = "exitProcessOnClose";

const URL_FLAG: &str = "--url";
const WINDOW_FLAG_PREFIX: &str = "--window";
const KEY_BOUNDARY_PATTERN: &str = r"[A-Z]|^[a-z]";

static KEY_BOUNDARY_REGEX: OnceLock<Regex> = OnceLock::new();

fn key_boundary_regex() -> &'static Regex {
    KEY_BOUNDARY_REGEX.get_or_init(|| Regex::new(KEY_BOUNDARY_PATTERN).expect("valid regex pattern"))
}

/// `titleBarStyle` -> `--window-title-bar-style`.
pub fn option_flag_name(key: &str) -> String {
    let kebab = key_boundary_regex().replace_all(key, |caps: &Captures| {
        format!("-{}", caps[0].to_lowercase())
    });
    format!("{WINDOW_FLAG_PREFIX}{kebab}")
}

/// Render an option value as flag text.
///
/// Strings are trimmed and double-quoted when they contain whitespace. Other
/// values use their JSON text (`true`, `800`).
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.chars().any(char::is_whitespace) {
                format!("\"{trimmed}\"")
            } else {
                trimmed.to_string()
            }
        }
        other => other.to_string(),
    }
}

fn url_flag(url: &str) -> String {
    format!("{URL_FLAG}={}", normalize_value(&Value::String(url.to_string())))
}

/// One flag per window option, `processArgs` excluded.
pub fn window_flags(options: &BTreeMap<String, Value>) -> Vec<String> {
    options
        .iter()
        .filter(|(key, _)| key.as_str() != PROCESS_ARGS_KEY)
        .map(|(key, value)| format!("{}={}", option_flag_name(key), normalize_value(value)))
        .collect()
}

/// The raw `processArgs` text, if any.
fn process_args_text(options: &BTreeMap<String, Value>) -> Option<String> {
    match options.get(PROCESS_ARGS_KEY)? {
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Null | Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}

/// Split `processArgs` into argv tokens the way a shell would.
pub fn process_args(options: &BTreeMap<String, Value>) -> Vec<String> {
    let Some(text) = process_args_text(options) else {
        return Vec::new();
    };

    shlex::split(&text).unwrap_or_else(|| {
        warn!("processArgs has unbalanced quoting, splitting on whitespace");
        text.split_whitespace().map(str::to_string).collect()
    })
}

/// Full argument vector for launching the native process.
pub fn launch_args(url: &str, options: &BTreeMap<String, Value>) -> Vec<String> {
    let mut args: Vec<String> = BASE_FLAGS.iter().map(|flag| flag.to_string()).collect();
    args.push(url_flag(url));
    args.extend(window_flags(options));
    args.extend(process_args(options));
    args
}

/// Command line handed to `os.execCommand` to open a child window.
///
/// Child windows never restore saved window state, so `useSavedState=false`
/// is forced. `processArgs` is appended as written.
pub fn window_command(url: &str, options: &BTreeMap<String, Value>) -> String {
    let mut options = options.clone();
    options.insert("useSavedState".to_string(), Value::Bool(false));

    let mut parts = vec![url_flag(url)];
    parts.extend(window_flags(&options));
    if let Some(text) = process_args_text(&options) {
        parts.push(text);
    }
    parts.join(" ")
}
