use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};

use super::domain::{Offer, SKILL_SLOTS};
use super::raw::{RawEmploymentType, RawOffer};

/// Flattens an API record into a fixed-width row.
///
/// Returns `None` only when the publication timestamp is missing or unreadable.
pub(crate) fn normalize_raw(raw: RawOffer) -> Option<Offer> {
    let Some(published_at) = raw.published_at.as_deref().and_then(parse_published_at) else {
        warn!(
            title = raw.title.as_deref().unwrap_or_default(),
            published_at = raw.published_at.as_deref().unwrap_or_default(),
            "dropping offer without a readable publication date"
        );
        return None;
    };

    let employment_type = raw
        .employment_types
        .first()
        .and_then(|entry| entry.kind.as_deref())
        .map(clean_label)
        .unwrap_or_default();
    let (salary_from, salary_to, salary_currency) = salary_bounds(&raw.employment_types);
    let skills = skill_slots(raw.skills, raw.title.as_deref());

    Some(Offer {
        title: label_or_empty(raw.title),
        city: label_or_empty(raw.city),
        category: label_or_empty(raw.marker_icon),
        workplace_type: label_or_empty(raw.workplace_type),
        employment_type,
        experience_level: label_or_empty(raw.experience_level),
        latitude: clean_coordinate(raw.latitude),
        longitude: clean_coordinate(raw.longitude),
        published_at,
        salary_from,
        salary_to,
        salary_currency,
        skills,
        remote_interview: raw.remote_interview.unwrap_or(false),
        display_offer: raw.display_offer.unwrap_or(false),
    })
}

/// First `SKILL_SLOTS` names in source order, padded with empty strings.
pub(crate) fn skill_slots<I>(names: I, title: Option<&str>) -> [String; SKILL_SLOTS]
where
    I: IntoIterator<Item = String>,
{
    let mut slots: [String; SKILL_SLOTS] = Default::default();
    let mut dropped = 0usize;
    for (index, name) in names.into_iter().enumerate() {
        match slots.get_mut(index) {
            Some(slot) => *slot = clean_label(&name),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(
            title = title.unwrap_or_default(),
            dropped, "skill list truncated to the first {SKILL_SLOTS} entries"
        );
    }
    slots
}

/// Salary range of the first employment type that carries one.
///
/// Both bounds come from the same entry, so a `from` never pairs with another contract's `to`.
pub(crate) fn salary_bounds(
    entries: &[RawEmploymentType],
) -> (Option<f64>, Option<f64>, Option<String>) {
    entries
        .iter()
        .map(RawEmploymentType::bounds)
        .map(|(from, to, currency)| (clean_amount(from), clean_amount(to), currency))
        .find(|(from, to, _)| from.is_some() || to.is_some())
        .map(|(from, to, currency)| {
            let currency = currency
                .map(|code| code.trim().to_ascii_uppercase())
                .filter(|code| !code.is_empty());
            (from, to, currency)
        })
        .unwrap_or((None, None, None))
}

/// Negative or non-finite amounts are treated as absent.
pub(crate) fn clean_amount(amount: Option<f64>) -> Option<f64> {
    amount.filter(|value| value.is_finite() && *value >= 0.0)
}

pub(crate) fn clean_coordinate(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

pub(crate) fn clean_label(value: &str) -> String {
    value.trim().to_string()
}

pub(crate) fn label_or_empty(value: Option<String>) -> String {
    value.as_deref().map(clean_label).unwrap_or_default()
}

/// Accepts RFC 3339, pandas-style `YYYY-MM-DD HH:MM:SS[.f][+hh:mm]`, and bare dates.
/// Timestamps without an offset are read as UTC.
pub(crate) fn parse_published_at(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
