//! HTML shell with the fallback configuration tags.
//!
//! DESIGN
//! ======
//! The client's last configuration source is a set of `<meta>` tags in the
//! page head. The shell is the build's `index.html` with those tags injected
//! before `</head>`, rendered once at startup. Keys without a value get no
//! tag, so the client reports them as missing rather than reading blanks.

use std::fmt::Write;
use std::path::Path;

use schema::{AppConfig, ConfigKey};

use crate::error::ServerError;

/// Used when the static directory has no `index.html` (API-only runs and
/// tests).
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>EvalHub</title>
</head>
<body></body>
</html>
"#;

/// `<meta>` tags for every non-empty key.
#[must_use]
pub fn meta_tags(config: &AppConfig) -> String {
    let mut out = String::new();
    for key in ConfigKey::ALL {
        let value = config.get(key);
        if value.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            r#"<meta name="{}" content="{}">"#,
            key.meta_name(),
            html_escape::encode_double_quoted_attribute(value)
        );
    }
    out
}

/// Inject the tags before the first `</head>`, or at the top when the
/// template has no head.
#[must_use]
pub fn render(template: &str, config: &AppConfig) -> String {
    let tags = meta_tags(config);
    match template.to_ascii_lowercase().find("</head>") {
        Some(at) => format!("{}{tags}{}", &template[..at], &template[at..]),
        None => format!("{tags}{template}"),
    }
}

/// Read `index.html` from the static directory, if there is one.
///
/// # Errors
///
/// [`ServerError::Template`] when the file exists but cannot be read.
pub fn load_template(static_dir: &Path) -> Result<Option<String>, ServerError> {
    let path = static_dir.join("index.html");
    match std::fs::read_to_string(&path) {
        Ok(template) => Ok(Some(template)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ServerError::Template { path: path.display().to_string(), source }),
    }
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
