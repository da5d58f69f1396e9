use crate::navigation::TravelMode;

pub const DATA_URL: &str = match option_env!("CAMPUS_TOUR_DATA_URL") {
    Some(url) => url,
    None => "./stops.json",
};

pub const SERVICE_WORKER_PATH: &str = "./service-worker.js";

/// Used when a stop carries neither an address nor a title.
pub const DEFAULT_LOCATION: &str = match option_env!("CAMPUS_TOUR_DEFAULT_LOCATION") {
    Some(location) => location,
    None => "San Francisco State University",
};

// Renaming any of these drops every visitor's saved progress.
pub const VISITED_KEY: &str = "sfsuTour.visitedStopIds";
pub const ACTIVE_TOUR_KEY: &str = "sfsuTour.activeTourId";
pub const THEME_KEY: &str = "sfsuTour.theme";

pub const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";
pub const MAPS_DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/?api=1";
pub const MAPS_HOME_URL: &str = "https://www.google.com/maps";

pub const DEFAULT_TRAVEL_MODE: TravelMode = TravelMode::Walking;

pub const LOG_LEVEL: log::Level = log::Level::Info;

pub const LOADING_MESSAGE: &str = "Loading…";
pub const LOAD_ERROR_MESSAGE: &str = "Could not load tour content. Check stops.json and reload.";
pub const RESET_MESSAGE: &str = "Visited status reset.";
pub const LINK_COPIED_MESSAGE: &str = "Link copied to clipboard.";
