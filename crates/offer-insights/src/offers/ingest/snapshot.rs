use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

use super::NormalizedBatch;
use crate::offers::domain::Offer;
use crate::offers::normalizer::{
    clean_amount, clean_coordinate, label_or_empty, parse_published_at, skill_slots,
};
use crate::offers::raw::parse_flag;

/// Reads a flat offer snapshot. Rows that fail to decode or lack a readable
/// `published_at` are skipped and counted; I/O failures abort the read.
pub(crate) fn read_offers<R: Read>(reader: R) -> Result<NormalizedBatch, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut batch = NormalizedBatch::default();

    for (index, record) in csv_reader.deserialize::<OfferRow>().enumerate() {
        batch.records_seen += 1;
        let row = match record {
            Ok(row) => row,
            Err(err) if err.is_io_error() => return Err(err),
            Err(err) => {
                warn!(row = index + 1, error = %err, "skipping undecodable snapshot row");
                batch.records_skipped += 1;
                continue;
            }
        };

        match row.into_offer() {
            Some(offer) => batch.offers.push(offer),
            None => batch.records_skipped += 1,
        }
    }

    Ok(batch)
}

#[derive(Debug, Deserialize)]
struct OfferRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    title: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    marker_icon: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    workplace_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    employment_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    experience_level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    latitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    longitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    published_at: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    salary_from: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    salary_to: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    skills_one: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    skill_one: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    skills_two: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    skill_two: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    skills_three: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    skill_three: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    remote_interview: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    display_offer: Option<String>,
}

impl OfferRow {
    fn into_offer(self) -> Option<Offer> {
        let Some(published_at) = self.published_at.as_deref().and_then(parse_published_at) else {
            warn!(
                title = self.title.as_deref().unwrap_or_default(),
                published_at = self.published_at.as_deref().unwrap_or_default(),
                "dropping snapshot row without a readable publication date"
            );
            return None;
        };

        // Both export variants may be present; the pandas column names win.
        let skills = [
            self.skills_one.or(self.skill_one),
            self.skills_two.or(self.skill_two),
            self.skills_three.or(self.skill_three),
        ]
        .into_iter()
        .map(Option::unwrap_or_default);

        Some(Offer {
            skills: skill_slots(skills, self.title.as_deref()),
            title: label_or_empty(self.title),
            city: label_or_empty(self.city),
            category: label_or_empty(self.marker_icon.or(self.category)),
            workplace_type: label_or_empty(self.workplace_type),
            employment_type: label_or_empty(self.employment_type),
            experience_level: label_or_empty(self.experience_level),
            latitude: clean_coordinate(parse_number(self.latitude.as_deref())),
            longitude: clean_coordinate(parse_number(self.longitude.as_deref())),
            published_at,
            salary_from: clean_amount(parse_number(self.salary_from.as_deref())),
            salary_to: clean_amount(parse_number(self.salary_to.as_deref())),
            salary_currency: None,
            remote_interview: self
                .remote_interview
                .as_deref()
                .and_then(parse_flag)
                .unwrap_or(false),
            display_offer: self
                .display_offer
                .as_deref()
                .and_then(parse_flag)
                .unwrap_or(false),
        })
    }
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value.and_then(|text| text.parse::<f64>().ok())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
