//! Presentation decisions for stop and callout cards, kept free of any DOM
//! access so the component layer only has to lay the fields out.

use std::collections::HashMap;

use crate::data::{Callout, Stop, Tour};
use crate::navigation::build_stop_nav_url;
use crate::storage::VisitedSet;

const UNTITLED_STOP: &str = "Tour Stop";
const UNTITLED_PHOTO_ALT: &str = "Stop photo";
const UNTITLED_TOUR: &str = "Self-guided tour";
const CALLOUT_IMAGE_ALT: &str = "Callout";
const CALLOUT_LINK_TEXT: &str = "Learn more";

pub const EMPTY_TITLE: &str = "No stops found";
pub const EMPTY_HINT: &str = "Try a different search, or disable “Hide visited”.";
pub const PHOTO_UNAVAILABLE: &str = "Photo unavailable";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopFilter {
    pub query: String,
    pub hide_visited: bool,
}

impl StopFilter {
    pub fn admits(&self, stop: &Stop, visited: &VisitedSet) -> bool {
        if self.hide_visited && visited.contains(&stop.id) {
            return false;
        }

        let query = normalize(&self.query);
        if query.is_empty() {
            return true;
        }

        let haystack = [
            stop.title.as_str(),
            stop.subtitle.as_str(),
            stop.description.as_str(),
            stop.address.as_str(),
        ]
        .join(" ");
        normalize(&haystack).contains(&query)
    }
}

pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

pub fn visible_stops<'a>(tour: &'a Tour, visited: &VisitedSet, filter: &StopFilter) -> Vec<&'a Stop> {
    tour.ordered_stops()
        .into_iter()
        .filter(|stop| filter.admits(stop, visited))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum StopListing {
    Empty,
    Cards(Vec<StopCard>),
}

pub fn stop_listing(tour: &Tour, visited: &VisitedSet, filter: &StopFilter) -> StopListing {
    let cards: Vec<StopCard> = visible_stops(tour, visited, filter)
        .into_iter()
        .map(|stop| StopCard::new(stop, visited.contains(&stop.id)))
        .collect();

    if cards.is_empty() {
        StopListing::Empty
    } else {
        StopListing::Cards(cards)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopCard {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// `None` renders the unavailable placeholder without attempting a load.
    pub photo: Option<String>,
    pub photo_alt: String,
    pub nav_url: String,
    pub visited: bool,
}

impl StopCard {
    pub fn new(stop: &Stop, visited: bool) -> Self {
        let subtitle = if stop.subtitle.is_empty() {
            stop.address.clone()
        } else {
            stop.subtitle.clone()
        };

        Self {
            id: stop.id.clone(),
            title: non_empty_or(&stop.title, UNTITLED_STOP),
            subtitle,
            description: stop.description.clone(),
            photo: Some(stop.photo.clone()).filter(|photo| !photo.is_empty()),
            photo_alt: if stop.title.is_empty() {
                UNTITLED_PHOTO_ALT.to_owned()
            } else {
                format!("{} photo", stop.title)
            },
            nav_url: build_stop_nav_url(stop),
            visited,
        }
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.visited {
            "Visited ✓"
        } else {
            "Mark visited"
        }
    }
}

/// Component keys for a card list. A key changes whenever a card's photo
/// does, so per-card photo state never leaks onto a different image.
/// Repeated id/photo pairs get an occurrence suffix to keep keys unique.
pub fn card_keys(cards: &[StopCard]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    cards
        .iter()
        .map(|card| {
            let base = format!("{}|{}", card.id, card.photo.as_deref().unwrap_or(""));
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                base
            } else {
                format!("{base}#{count}")
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutLink {
    pub url: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutCard {
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub image_alt: String,
    pub link: Option<CalloutLink>,
}

impl CalloutCard {
    pub fn from_callout(callout: &Callout) -> Self {
        let link = Some(callout.link_url.clone())
            .filter(|url| !url.is_empty())
            .map(|url| CalloutLink {
                url,
                label: non_empty_or(&callout.link_text, CALLOUT_LINK_TEXT),
            });

        Self {
            title: callout.title.clone(),
            text: callout.text.clone(),
            image: callout.images.first().filter(|image| !image.is_empty()).cloned(),
            image_alt: non_empty_or(&callout.title, CALLOUT_IMAGE_ALT),
            link,
        }
    }
}

pub fn tour_heading(tour: &Tour) -> String {
    non_empty_or(&tour.name, UNTITLED_TOUR)
}

pub fn tour_option_label(tour: &Tour) -> String {
    non_empty_or(&tour.name, &tour.id)
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_owned()
    } else {
        value.to_owned()
    }
}
