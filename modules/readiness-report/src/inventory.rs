//! Certificate inventory aggregation: per-algorithm counts and expiry hygiene.

use crate::fields::{lookup, text_at};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

pub const UNKNOWN_ALGORITHM: &str = "Unknown";
pub const EXPIRY_WINDOW_DAYS: i64 = 30;

/// Header metadata read verbatim from the inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostInfo {
    pub generated_at: String,
    pub computer_name: String,
    pub os_caption: String,
    pub os_version: String,
}

impl HostInfo {
    pub fn from_inventory(doc: &Value) -> Self {
        HostInfo {
            generated_at: text_at(doc, &["generatedAtUtc"]),
            computer_name: text_at(doc, &["host", "computerName"]),
            os_caption: text_at(doc, &["host", "osCaption"]),
            os_version: text_at(doc, &["host", "osVersion"]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Expired,
    ExpiringSoon,
    Valid,
}

impl Expiry {
    /// Expired if strictly before `now`, otherwise expiring if fewer than
    /// `EXPIRY_WINDOW_DAYS + 1` whole days remain.
    pub fn classify(not_after: OffsetDateTime, now: OffsetDateTime) -> Self {
        if not_after < now {
            Expiry::Expired
        } else if (not_after - now).whole_days() <= EXPIRY_WINDOW_DAYS {
            Expiry::ExpiringSoon
        } else {
            Expiry::Valid
        }
    }
}

/// Outcome of reading one certificate's `NotAfter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotAfter {
    Parsed(OffsetDateTime),
    Missing,
    Unparseable,
}

impl NotAfter {
    pub fn read(cert: &Value) -> Self {
        match lookup(cert, &["NotAfter"]) {
            None => NotAfter::Missing,
            Some(Value::String(s)) if s.trim().is_empty() => NotAfter::Missing,
            Some(Value::String(s)) => parse_timestamp(s).map_or(NotAfter::Unparseable, NotAfter::Parsed),
            Some(_) => NotAfter::Unparseable,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateSummary {
    /// Algorithm name and count, in first-seen order.
    pub by_algorithm: Vec<(String, usize)>,
    pub total: usize,
    pub expired: usize,
    pub expiring: usize,
    /// Certificates whose `NotAfter` was absent or unparseable.
    pub undated: usize,
}

impl CertificateSummary {
    fn tally(&mut self, algorithm: String) {
        match self.by_algorithm.iter_mut().find(|(name, _)| *name == algorithm) {
            Some((_, n)) => *n += 1,
            None => self.by_algorithm.push((algorithm, 1)),
        }
    }
}

/// The inventory's certificate records. A lone object stands for a one-element list, which
/// is how PowerShell serialises single-item arrays.
pub fn certificate_records(doc: &Value) -> Vec<&Value> {
    match lookup(doc, &["artifacts", "certificates"]) {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        Some(other) => {
            tracing::warn!(kind = json_kind(other), "artifacts.certificates is not a list; ignoring it");
            Vec::new()
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn summarize_certificates(doc: &Value, now: OffsetDateTime) -> CertificateSummary {
    let mut summary = CertificateSummary::default();
    for (index, cert) in certificate_records(doc).into_iter().enumerate() {
        summary.total += 1;
        let algorithm = match lookup(cert, &["PublicKeyAlgorithm"]) {
            Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
            _ => UNKNOWN_ALGORITHM.to_string(),
        };
        summary.tally(algorithm);

        match NotAfter::read(cert) {
            NotAfter::Parsed(not_after) => match Expiry::classify(not_after, now) {
                Expiry::Expired => summary.expired += 1,
                Expiry::ExpiringSoon => summary.expiring += 1,
                Expiry::Valid => {}
            },
            reading => {
                tracing::debug!(index, ?reading, "certificate NotAfter not usable");
                summary.undated += 1;
            }
        }
    }
    summary
}

/// Best-effort ISO-8601 parsing. Timestamps without an offset are taken as UTC.
///
/// Also accepts the `/Date(<ms>)/` form emitted by Windows PowerShell's `ConvertTo-Json`.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let s = raw.trim();
    if let Ok(t) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(t);
    }
    for fmt in [
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory][offset_minute]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]"),
    ] {
        if let Ok(t) = OffsetDateTime::parse(s, fmt) {
            return Some(t);
        }
    }
    for fmt in [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ] {
        if let Ok(t) = PrimitiveDateTime::parse(s, fmt) {
            return Some(t.assume_utc());
        }
    }
    if let Ok(d) = Date::parse(s, format_description!("[year]-[month]-[day]")) {
        return Some(d.midnight().assume_utc());
    }
    parse_ms_date(s)
}

fn parse_ms_date(s: &str) -> Option<OffsetDateTime> {
    let inner = s.strip_prefix("/Date(")?.strip_suffix(")/")?;
    // An optional "+hhmm" suffix only describes the producer's zone; the millis are UTC.
    let digits_end = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map_or(inner.len(), |(i, _)| i);
    let ms: i64 = inner[..digits_end].parse().ok()?;
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).ok()
}
