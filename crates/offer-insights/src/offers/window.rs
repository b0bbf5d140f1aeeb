use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Offer, OfferView};

/// Publication date range of a dataset; bounds the date slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl DateBounds {
    pub fn of<'a, I>(offers: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Offer>,
    {
        offers.into_iter().fold(None, |bounds, offer| {
            let day = offer.published_on();
            Some(match bounds {
                None => DateBounds {
                    earliest: day,
                    latest: day,
                },
                Some(DateBounds { earliest, latest }) => DateBounds {
                    earliest: earliest.min(day),
                    latest: latest.max(day),
                },
            })
        })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.earliest <= day && day <= self.latest
    }

    /// Slider default: the earliest date.
    pub fn default_cutoff(&self) -> NaiveDate {
        self.earliest
    }
}

impl<'a> OfferView<'a> {
    /// Rows published on or before `cutoff` (inclusive, by UTC calendar day).
    pub fn published_through(&self, cutoff: NaiveDate) -> OfferView<'a> {
        self.retain_where(|offer| offer.published_on() <= cutoff)
    }
}
