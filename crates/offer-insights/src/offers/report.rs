use chrono::NaiveDate;
use serde::Serialize;

use super::aggregate::{
    average_salary, top_categories, top_cities, top_skills, GroupCount, SalaryAverage, TOP_N,
};
use super::domain::{Offer, OfferTable, OfferView, SKILL_SLOTS};
use super::filter::OfferFilter;
use super::window::DateBounds;

/// Map framing used by the density map: centred on Warsaw, showing all of Poland.
pub const MAP_CENTER: MapViewport = MapViewport {
    latitude: 52.237049,
    longitude: 21.017532,
    zoom: 5,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapViewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryView {
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub currency: String,
    pub has_data: bool,
    pub label: String,
}

impl From<SalaryAverage> for SalaryView {
    fn from(average: SalaryAverage) -> Self {
        Self {
            has_data: average.has_data(),
            label: average.label(),
            from: average.from,
            to: average.to,
            currency: average.currency,
        }
    }
}

/// Hover payload of one offer on the density map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub city: String,
    pub category: String,
    pub salary_from: Option<f64>,
    pub salary_to: Option<f64>,
    pub skills: [String; SKILL_SLOTS],
}

impl MapPoint {
    fn from_offer(offer: &Offer) -> Option<Self> {
        let (latitude, longitude) = offer.coordinates()?;
        Some(Self {
            latitude,
            longitude,
            title: offer.title.clone(),
            city: offer.city.clone(),
            category: offer.category.clone(),
            salary_from: offer.salary_from,
            salary_to: offer.salary_to,
            skills: offer.skills.clone(),
        })
    }
}

/// Point on the skills page map, coloured by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub title: String,
    pub skills: [String; SKILL_SLOTS],
}

impl CategoryPoint {
    fn from_offer(offer: &Offer) -> Option<Self> {
        let (latitude, longitude) = offer.coordinates()?;
        Some(Self {
            latitude,
            longitude,
            category: offer.category.clone(),
            title: offer.title.clone(),
            skills: offer.skills.clone(),
        })
    }
}

/// Summary tiles, top-cities bar chart, and density map for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewReport {
    pub total_offers: usize,
    pub filtered_offers: usize,
    pub average_salary: SalaryView,
    pub top_cities: Vec<GroupCount>,
    pub top_categories: Vec<GroupCount>,
    pub map_center: MapViewport,
    pub map_points: Vec<MapPoint>,
}

impl OverviewReport {
    pub fn build(table: &OfferTable, filter: &OfferFilter) -> Self {
        let selection = table.filter(filter);
        Self::from_view(table.len(), &selection)
    }

    fn from_view(total_offers: usize, selection: &OfferView<'_>) -> Self {
        Self {
            total_offers,
            filtered_offers: selection.len(),
            average_salary: average_salary(selection).into(),
            top_cities: top_cities(selection, TOP_N),
            top_categories: top_categories(selection, TOP_N),
            map_center: MAP_CENTER,
            map_points: selection.iter().filter_map(MapPoint::from_offer).collect(),
        }
    }
}

/// Offers published up to a cutoff date: skill ranking and category map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillsReport {
    pub cutoff: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_bounds: Option<DateBounds>,
    pub window_offers: usize,
    pub average_salary: SalaryView,
    pub top_skills: Vec<GroupCount>,
    pub category_points: Vec<CategoryPoint>,
}

impl SkillsReport {
    /// `cutoff` defaults to the earliest publication date. Without a filter the
    /// whole table is windowed.
    pub fn build(table: &OfferTable, cutoff: Option<NaiveDate>, filter: Option<&OfferFilter>) -> Self {
        let date_bounds = table.date_bounds();
        let cutoff = cutoff.or_else(|| date_bounds.map(|bounds| bounds.default_cutoff()));

        let base = match filter {
            Some(filter) => table.filter(filter),
            None => table.view(),
        };
        let window = match cutoff {
            Some(cutoff) => base.published_through(cutoff),
            None => base,
        };

        Self {
            cutoff,
            date_bounds,
            window_offers: window.len(),
            average_salary: average_salary(&window).into(),
            top_skills: top_skills(&window, TOP_N),
            category_points: window.iter().filter_map(CategoryPoint::from_offer).collect(),
        }
    }

    /// Chart title naming the cutoff, e.g. `Top 10 skills (2023-03-10)`.
    pub fn title(&self) -> String {
        match self.cutoff {
            Some(cutoff) => format!("Top {TOP_N} skills ({cutoff})"),
            None => format!("Top {TOP_N} skills"),
        }
    }
}
