use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::domain::{Offer, OfferTable, OfferView};
use super::window::DateBounds;

/// Multi-select value set. An empty selection matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeSet<String>);

impl Selection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// User-chosen predicates, combined as a conjunction.
///
/// `city` and `category` are single selects: `Some` requires an exact match and
/// `None` leaves the column unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferFilter {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub employment_types: Selection,
    #[serde(default)]
    pub workplace_types: Selection,
    #[serde(default)]
    pub experience_levels: Selection,
}

impl OfferFilter {
    pub fn matches(&self, offer: &Offer) -> bool {
        single_select(self.city.as_deref(), &offer.city)
            && single_select(self.category.as_deref(), &offer.category)
            && self.employment_types.contains(&offer.employment_type)
            && self.workplace_types.contains(&offer.workplace_type)
            && self.experience_levels.contains(&offer.experience_level)
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

fn single_select(selected: Option<&str>, value: &str) -> bool {
    selected.map_or(true, |selected| selected == value)
}

impl<'a> OfferView<'a> {
    pub fn filter(&self, filter: &OfferFilter) -> OfferView<'a> {
        self.retain_where(|offer| filter.matches(offer))
    }
}

impl OfferTable {
    pub fn filter(&self, filter: &OfferFilter) -> OfferView<'_> {
        self.view().filter(filter)
    }
}

/// Observed values of every filterable column, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub cities: Vec<String>,
    pub categories: Vec<String>,
    pub employment_types: Vec<String>,
    pub workplace_types: Vec<String>,
    pub experience_levels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_bounds: Option<DateBounds>,
}

impl FilterOptions {
    pub fn from_table(table: &OfferTable) -> Self {
        let offers = table.offers();
        Self {
            cities: distinct(offers, |offer| &offer.city),
            categories: distinct(offers, |offer| &offer.category),
            employment_types: distinct(offers, |offer| &offer.employment_type),
            workplace_types: distinct(offers, |offer| &offer.workplace_type),
            experience_levels: distinct(offers, |offer| &offer.experience_level),
            date_bounds: table.date_bounds(),
        }
    }

    /// Every multi-select defaulted to all observed values.
    pub fn select_all(&self, city: Option<String>, category: Option<String>) -> OfferFilter {
        OfferFilter {
            city,
            category,
            employment_types: self.employment_types.iter().cloned().collect(),
            workplace_types: self.workplace_types.iter().cloned().collect(),
            experience_levels: self.experience_levels.iter().cloned().collect(),
        }
    }

    /// What a fresh dashboard shows: first city, first category, everything else selected.
    pub fn initial_filter(&self) -> OfferFilter {
        self.select_all(self.cities.first().cloned(), self.categories.first().cloned())
    }
}

fn distinct<F>(offers: &[Offer], column: F) -> Vec<String>
where
    F: Fn(&Offer) -> &String,
{
    let mut seen = HashSet::new();
    offers
        .iter()
        .map(column)
        .filter(|value| seen.insert(value.as_str()))
        .cloned()
        .collect()
}
