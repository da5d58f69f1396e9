use std::cmp::Ordering;

use gloo_net::http::Request;
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use web_sys::RequestCache;

use crate::config::DATA_URL;

/// One point of interest. Every field is optional in the source document;
/// wrongly-typed values decode as empty rather than failing the whole load.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stop {
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub subtitle: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_text")]
    pub address: String,
    #[serde(deserialize_with = "lenient_text")]
    pub photo: String,
    #[serde(deserialize_with = "lenient_number")]
    pub order: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub lng: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    pub nav_url: String,
}

impl Stop {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lng?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tour {
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_text")]
    pub route_url: String,
    #[serde(deserialize_with = "lenient_list")]
    pub stops: Vec<Stop>,
}

impl Tour {
    pub fn ordered_stops(&self) -> Vec<&Stop> {
        order_stops(&self.stops)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Callout {
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub text: String,
    #[serde(deserialize_with = "lenient_list")]
    pub images: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub link_url: String,
    #[serde(deserialize_with = "lenient_text")]
    pub link_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSections {
    #[serde(deserialize_with = "lenient_object")]
    pub intro_callout: Option<Callout>,
    #[serde(deserialize_with = "lenient_object")]
    pub outro_callout: Option<Callout>,
}

/// The document exactly as it arrives, before its shape is decided.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatasetDocument {
    #[serde(deserialize_with = "lenient_optional_list")]
    tours: Option<Vec<Tour>>,
    #[serde(deserialize_with = "lenient_optional_list")]
    stops: Option<Vec<Stop>>,
    #[serde(deserialize_with = "lenient_text")]
    tour_subtitle: String,
    #[serde(deserialize_with = "lenient_text")]
    tour_description: String,
    #[serde(deserialize_with = "lenient_text")]
    route_url: String,
    #[serde(deserialize_with = "lenient_object")]
    page_sections: Option<PageSections>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DatasetShape {
    MultiTour(Vec<Tour>),
    LegacyFlat {
        stops: Vec<Stop>,
        subtitle: String,
        description: String,
        route_url: String,
    },
    Unrecognized,
}

impl DatasetShape {
    pub fn into_tours(self) -> Vec<Tour> {
        match self {
            Self::MultiTour(tours) => tours,
            Self::LegacyFlat {
                stops,
                subtitle,
                description,
                route_url,
            } => vec![Tour {
                id: LEGACY_TOUR_ID.to_owned(),
                name: if subtitle.is_empty() {
                    LEGACY_TOUR_NAME.to_owned()
                } else {
                    subtitle
                },
                description,
                route_url,
                stops,
            }],
            Self::Unrecognized => Vec::new(),
        }
    }
}

impl DatasetDocument {
    pub fn into_parts(self) -> (DatasetShape, PageSections) {
        let shape = match (self.tours, self.stops) {
            (Some(tours), _) if !tours.is_empty() => DatasetShape::MultiTour(tours),
            (_, Some(stops)) => DatasetShape::LegacyFlat {
                stops,
                subtitle: self.tour_subtitle,
                description: self.tour_description,
                route_url: self.route_url,
            },
            _ => DatasetShape::Unrecognized,
        };
        (shape, self.page_sections.unwrap_or_default())
    }
}

pub const LEGACY_TOUR_ID: &str = "default";
const LEGACY_TOUR_NAME: &str = "Campus Tour";

/// Canonical in-memory form, whichever schema the document used.
#[derive(Debug, Clone, PartialEq)]
pub struct TourDataset {
    pub tours: Vec<Tour>,
    pub page_sections: PageSections,
}

impl TourDataset {
    pub fn from_document(document: DatasetDocument) -> Result<Self, DataError> {
        let (shape, page_sections) = document.into_parts();
        let tours = shape.into_tours();
        if tours.is_empty() {
            return Err(DataError::NoTours(DATA_URL.to_owned()));
        }
        Ok(Self {
            tours,
            page_sections,
        })
    }

}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status} while fetching {url}")]
    Status { status: u16, url: String },
    #[error("invalid tour data: {0}")]
    Parse(String),
    #[error("no tours found in {0}")]
    NoTours(String),
}

impl DataError {
    fn network<E: std::fmt::Display>(err: E) -> Self {
        Self::Network(err.to_string())
    }

    fn parse<E: std::fmt::Display>(err: E) -> Self {
        Self::Parse(err.to_string())
    }
}

pub async fn load_tour_data() -> Result<TourDataset, DataError> {
    let response = Request::get(DATA_URL)
        .cache(RequestCache::NoStore)
        .send()
        .await
        .map_err(DataError::network)?;

    if !response.ok() {
        return Err(DataError::Status {
            status: response.status(),
            url: DATA_URL.to_owned(),
        });
    }

    let text = response.text().await.map_err(DataError::network)?;
    let dataset = parse_dataset(&text)?;
    log::info!(
        "Loaded {} tour(s) from {}",
        dataset.tours.len(),
        DATA_URL
    );
    Ok(dataset)
}

pub fn parse_dataset(text: &str) -> Result<TourDataset, DataError> {
    let document: DatasetDocument = serde_json::from_str(text).map_err(DataError::parse)?;
    TourDataset::from_document(document)
}

/// Ascending by `order`; stops without one go last. The sort is stable, so
/// ties keep their input order.
pub fn order_stops(stops: &[Stop]) -> Vec<&Stop> {
    let mut ordered: Vec<&Stop> = stops.iter().collect();
    ordered.sort_by(|a, b| match (a.order, b.order) {
        (Some(left), Some(right)) => left.total_cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ordered
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number_text(&number),
        _ => String::new(),
    })
}

/// Renders a JSON number the way the browser stringifies it, so `1.0` and
/// `1` name the same stop.
pub(crate) fn number_text(number: &serde_json::Number) -> String {
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e15 => format!("{}", value as i64),
        _ => number.to_string(),
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(lenient_optional_list(deserializer)?.unwrap_or_default())
}

fn lenient_optional_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let decoded = entries
        .into_iter()
        .filter(|entry| !entry.is_null())
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(err) => {
                log::warn!("Skipping unreadable list entry: {}", err);
                None
            }
        })
        .collect();
    Ok(Some(decoded))
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(D::Error::custom),
        _ => Ok(None),
    }
}
