use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::domain::{Offer, OfferView, DEFAULT_CURRENCY};

/// Size of every top-N chart on the dashboard.
pub const TOP_N: usize = 10;

/// Label shown when an average has nothing to average.
pub const NO_DATA: &str = "no data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
}

impl GroupCount {
    pub fn new(key: impl Into<String>, count: usize) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Groups rows by `key`, counts them, and keeps the `n` largest groups.
///
/// Ordered by count descending, then by key ascending.
pub fn top_n_by<'a, I, F>(rows: I, n: usize, key: F) -> Vec<GroupCount>
where
    I: IntoIterator<Item = &'a Offer>,
    F: Fn(&'a Offer) -> &'a str,
{
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    for offer in rows {
        *counts.entry(key(offer)).or_default() += 1;
    }
    rank(counts, n)
}

pub fn top_cities(view: &OfferView<'_>, n: usize) -> Vec<GroupCount> {
    top_n_by(view.iter(), n, |offer| offer.city.as_str())
}

pub fn top_categories(view: &OfferView<'_>, n: usize) -> Vec<GroupCount> {
    top_n_by(view.iter(), n, |offer| offer.category.as_str())
}

/// Pools all three skill slots into one multiset; empty slots are not skills.
pub fn top_skills(view: &OfferView<'_>, n: usize) -> Vec<GroupCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for skill in view.iter().flat_map(Offer::named_skills) {
        *counts.entry(skill).or_default() += 1;
    }
    rank(counts, n)
}

fn rank(counts: HashMap<&str, usize>, n: usize) -> Vec<GroupCount> {
    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|(key, count)| GroupCount::new(key, count))
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    groups.truncate(n);
    groups
}

/// Mean of each salary bound over the rows that carry it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryAverage {
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub from_samples: usize,
    pub to_samples: usize,
    pub currency: String,
}

impl SalaryAverage {
    pub fn has_data(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// `"12000.00 - 18000.00 PLN"`, or [`NO_DATA`] when neither bound has values.
    pub fn label(&self) -> String {
        if !self.has_data() {
            return NO_DATA.to_string();
        }
        format!(
            "{} - {} {}",
            format_amount(self.from),
            format_amount(self.to),
            self.currency
        )
    }
}

impl fmt::Display for SalaryAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn format_amount(amount: Option<f64>) -> String {
    match amount {
        Some(value) => format!("{value:.2}"),
        None => "n/a".to_string(),
    }
}

pub fn average_salary(view: &OfferView<'_>) -> SalaryAverage {
    let (from, from_samples) = mean(view.iter().filter_map(|offer| offer.salary_from));
    let (to, to_samples) = mean(view.iter().filter_map(|offer| offer.salary_to));

    let salaried = view
        .iter()
        .filter(|offer| offer.salary_from.is_some() || offer.salary_to.is_some());
    let currency = top_n_by(salaried, 1, Offer::currency)
        .into_iter()
        .next()
        .map(|group| group.key)
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    SalaryAverage {
        from,
        to,
        from_samples,
        to_samples,
        currency,
    }
}

fn mean<I: Iterator<Item = f64>>(values: I) -> (Option<f64>, usize) {
    let (sum, samples) = values.fold((0.0, 0usize), |(sum, samples), value| {
        (sum + value, samples + 1)
    });
    if samples == 0 {
        (None, 0)
    } else {
        (Some(sum / samples as f64), samples)
    }
}
