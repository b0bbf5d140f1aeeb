use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::window::DateBounds;

/// Number of positional skill slots kept per offer.
pub const SKILL_SLOTS: usize = 3;

/// Currency assumed when the source does not name one.
pub const DEFAULT_CURRENCY: &str = "PLN";

/// One normalized job offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub title: String,
    pub city: String,
    /// Coarse job category, published by the source as `marker_icon`.
    pub category: String,
    pub workplace_type: String,
    pub employment_type: String,
    pub experience_level: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub published_at: DateTime<Utc>,
    pub salary_from: Option<f64>,
    pub salary_to: Option<f64>,
    pub salary_currency: Option<String>,
    /// Skill slots in source order; an unused slot holds an empty string.
    pub skills: [String; SKILL_SLOTS],
    pub remote_interview: bool,
    pub display_offer: bool,
}

impl Offer {
    pub fn published_on(&self) -> NaiveDate {
        self.published_at.date_naive()
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn skill_one(&self) -> &str {
        &self.skills[0]
    }

    pub fn skill_two(&self) -> &str {
        &self.skills[1]
    }

    pub fn skill_three(&self) -> &str {
        &self.skills[2]
    }

    /// Filled skill slots, skipping empty ones.
    pub fn named_skills(&self) -> impl Iterator<Item = &str> {
        self.skills
            .iter()
            .map(String::as_str)
            .filter(|skill| !skill.is_empty())
    }

    pub fn currency(&self) -> &str {
        self.salary_currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}

/// Immutable table of normalized offers, built once per ingestion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferTable {
    offers: Vec<Offer>,
}

impl OfferTable {
    pub fn new(offers: Vec<Offer>) -> Self {
        Self { offers }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Unfiltered view over every row.
    pub fn view(&self) -> OfferView<'_> {
        OfferView {
            rows: self.offers.iter().collect(),
        }
    }

    /// Earliest and latest publication dates, `None` for an empty table.
    pub fn date_bounds(&self) -> Option<DateBounds> {
        DateBounds::of(self.offers.iter())
    }
}

impl FromIterator<Offer> for OfferTable {
    fn from_iter<I: IntoIterator<Item = Offer>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Derived subset of an [`OfferTable`]. Views borrow rows and never mutate the table.
#[derive(Debug, Clone, Default)]
pub struct OfferView<'a> {
    rows: Vec<&'a Offer>,
}

impl<'a> OfferView<'a> {
    pub(crate) fn from_rows(rows: Vec<&'a Offer>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[&'a Offer] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Offer> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keeps the rows accepted by `predicate`, preserving order.
    pub fn retain_where<F>(&self, mut predicate: F) -> OfferView<'a>
    where
        F: FnMut(&Offer) -> bool,
    {
        OfferView::from_rows(
            self.rows
                .iter()
                .copied()
                .filter(|offer| predicate(offer))
                .collect(),
        )
    }
}
