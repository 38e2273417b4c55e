//! Navigation-failure classification.
//!
//! Raw failures from the host's navigation stack (numeric platform code, an
//! `ERR_`-style description, the attempted URL) become user-facing payloads:
//! a friendly title, an optional subtitle, and a technical detail string for
//! a collapsible affordance. Classification is a pure function built from an
//! ordered chain of strategies; the first one that produces a result wins
//! and the final tier always produces one.

use serde::{Deserialize, Serialize};

/// A navigation failure as reported by the host, or synthesized locally
/// (stall timeout, client-side URL validation).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFailure {
    pub code: Option<i64>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub message: Option<String>,
}

impl RawFailure {
    /// The synthetic failure raised when the host never reports back within
    /// the stall window. Classified identically to a network timeout.
    pub fn local_timeout(url: Option<String>, window_secs: u64) -> Self {
        Self {
            code: None,
            description: Some("timeout".into()),
            url,
            message: Some(format!(
                "no initialization report from the view host within {window_secs}s"
            )),
        }
    }

    /// The synthetic failure for a URL rejected before any host traffic.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            code: None,
            description: Some("invalid-url".into()),
            message: Some(format!("unsupported or malformed URL: {url}")),
            url: Some(url),
        }
    }
}

/// User-facing classification of a navigation failure. Only ever produced by
/// [`classify`], never constructed ad hoc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedError {
    pub friendly_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Intermediate result of one classification strategy.
struct Classification {
    title: &'static str,
    subtitle: Option<&'static str>,
    /// Extra technical detail contributed by the rich categorizer.
    detail: Option<String>,
}

struct TableEntry {
    codes: &'static [i64],
    descriptions: &'static [&'static str],
    title: &'static str,
    subtitle: &'static str,
}

/// Static lookup table for the failures users actually hit. Descriptions are
/// matched after uppercasing and trimming.
const CLASSIFICATIONS: &[TableEntry] = &[
    TableEntry {
        codes: &[-105, -137],
        descriptions: &["ERR_NAME_NOT_RESOLVED", "ERR_NAME_RESOLUTION_FAILED"],
        title: "We couldn't find that site",
        subtitle: "Check the address for typos, or try again later.",
    },
    TableEntry {
        codes: &[-106],
        descriptions: &["ERR_INTERNET_DISCONNECTED"],
        title: "You appear to be offline",
        subtitle: "Reconnect to the internet and retry.",
    },
    TableEntry {
        codes: &[-102],
        descriptions: &["ERR_CONNECTION_REFUSED"],
        title: "The site refused the connection",
        subtitle: "The server may be down or blocking requests.",
    },
    TableEntry {
        codes: &[-7, -118],
        descriptions: &["ERR_TIMED_OUT", "ERR_CONNECTION_TIMED_OUT", "TIMEOUT"],
        title: "The site took too long to respond",
        subtitle: "Retry now, or once your connection improves.",
    },
    TableEntry {
        codes: &[-300],
        descriptions: &["ERR_INVALID_URL", "INVALID-URL"],
        title: "That address doesn't look right",
        subtitle: "Edit the link and try again.",
    },
];

/// Classify a raw navigation failure into a user-facing error.
///
/// Pure: same input always yields a structurally identical result.
pub fn classify(failure: &RawFailure) -> ClassifiedError {
    let classification = categorize_rich(failure)
        .or_else(|| lookup_table(failure))
        .unwrap_or_else(generic);

    ClassifiedError {
        friendly_title: classification.title.to_string(),
        friendly_subtitle: classification.subtitle.map(str::to_string),
        technical_message: technical_message(failure, classification.detail.as_deref()),
        code: failure.code,
        description: failure.description.clone(),
        url: failure.url.clone(),
    }
}

/// Tier 1: rich categorizer. Needs the full (code, description, url) triple;
/// buckets platform code ranges and contributes a technical detail line.
fn categorize_rich(failure: &RawFailure) -> Option<Classification> {
    let code = failure.code?;
    let description = failure.description.as_deref()?;
    let url = failure.url.as_deref()?;

    let (title, subtitle) = match entry_for_code(code) {
        Some(entry) => (entry.title, Some(entry.subtitle)),
        None => match code {
            -199..=-100 => (
                "We couldn't reach that site",
                Some("There may be a network problem between you and the server."),
            ),
            -299..=-200 => (
                "That site's security certificate has a problem",
                Some("The connection isn't safe to continue."),
            ),
            -399..=-300 => (
                "The site sent back an invalid response",
                Some("The page may be broken, or it may have moved."),
            ),
            _ => return None,
        },
    };

    Some(Classification {
        title,
        subtitle,
        detail: Some(format!("net::{description} ({code}) while loading {url}")),
    })
}

/// Tier 2: static table, keyed by numeric code, then normalized description,
/// then the raw description string.
fn lookup_table(failure: &RawFailure) -> Option<Classification> {
    let by_code = failure.code.and_then(entry_for_code);

    let by_description = || {
        let raw = failure.description.as_deref()?;
        let normalized = raw.trim().to_uppercase();
        entry_for_description(&normalized).or_else(|| entry_for_description(raw))
    };

    by_code.or_else(by_description).map(|entry| Classification {
        title: entry.title,
        subtitle: Some(entry.subtitle),
        detail: None,
    })
}

/// Tier 3: the default that always succeeds.
fn generic() -> Classification {
    Classification {
        title: "This content couldn't be loaded",
        subtitle: Some("Retry, or open the link in your browser."),
        detail: None,
    }
}

fn entry_for_code(code: i64) -> Option<&'static TableEntry> {
    CLASSIFICATIONS.iter().find(|e| e.codes.contains(&code))
}

fn entry_for_description(description: &str) -> Option<&'static TableEntry> {
    CLASSIFICATIONS
        .iter()
        .find(|e| e.descriptions.contains(&description))
}

/// Newline-joined technical detail, in order: raw message, description,
/// categorizer detail, numeric code, URL. `None` when nothing is available.
fn technical_message(failure: &RawFailure, detail: Option<&str>) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();
    if let Some(message) = &failure.message {
        lines.push(message.clone());
    }
    if let Some(description) = &failure.description {
        lines.push(description.clone());
    }
    if let Some(detail) = detail {
        lines.push(detail.to_string());
    }
    if let Some(code) = failure.code {
        lines.push(format!("Error code: {code}"));
    }
    if let Some(url) = &failure.url {
        lines.push(format!("URL: {url}"));
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
