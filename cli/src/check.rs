//! Deployment configuration check.
//!
//! Fetches the configuration document a deployed client would read first and
//! reports which connection keys it lacks. The client can still fall back to
//! its metadata tags, so a missing document is reported but the shell is
//! inspected too.

use schema::config::CONFIG_DOCUMENT_PATH;
use schema::{AppConfig, ConfigKey};

/// Outcome for one deployment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Keys missing from `/config.json` (all of them when it did not load).
    pub document_missing: Vec<ConfigKey>,
    /// Keys with no `<meta>` tag in the shell.
    pub shell_missing: Vec<ConfigKey>,
    /// `/config.json` was served with a cacheable policy.
    pub cacheable: bool,
}

impl Report {
    /// Usable when every key is available from at least one source.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.document_missing.iter().all(|k| !self.shell_missing.contains(k))
    }
}

/// Missing keys of a configuration document body.
#[must_use]
pub fn document_gaps(body: &str) -> Vec<ConfigKey> {
    match serde_json::from_str::<AppConfig>(body) {
        Ok(config) => config.missing_keys(),
        Err(_) => ConfigKey::ALL.to_vec(),
    }
}

/// Keys with no non-empty `<meta name=... content=...>` tag in `html`.
#[must_use]
pub fn shell_gaps(html: &str) -> Vec<ConfigKey> {
    ConfigKey::ALL
        .into_iter()
        .filter(|key| !has_meta(html, key.meta_name()))
        .collect()
}

fn has_meta(html: &str, name: &str) -> bool {
    let needle = format!(r#"name="{name}""#);
    html.match_indices(&needle).any(|(at, _)| {
        let rest = &html[at..];
        let tag = &rest[..rest.find('>').unwrap_or(rest.len())];
        tag.split_once(r#"content=""#)
            .is_some_and(|(_, content)| !content.starts_with('"'))
    })
}

/// Fetch the document and shell of `base_url` and build the report.
///
/// # Errors
///
/// Transport failures reaching the deployment.
pub async fn run(base_url: &str) -> Result<Report, reqwest::Error> {
    let base = base_url.trim_end_matches('/');
    let http = reqwest::Client::new();

    let response = http.get(format!("{base}{CONFIG_DOCUMENT_PATH}")).send().await?;
    let cacheable = response
        .headers()
        .get(reqwest::header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .is_none_or(|v| !v.contains("no-store"));
    let document_missing = if response.status().is_success() {
        document_gaps(&response.text().await?)
    } else {
        ConfigKey::ALL.to_vec()
    };

    let shell = http.get(format!("{base}/")).send().await?.text().await?;
    Ok(Report { document_missing, shell_missing: shell_gaps(&shell), cacheable })
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
