use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::{DEFAULT_LOCATION, MAPS_DIRECTIONS_URL, MAPS_HOME_URL, MAPS_SEARCH_URL};
use crate::data::{order_stops, Stop};

// Same unreserved set as `encodeURIComponent`, so links match what the map
// service expects from browser-built URLs.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TravelMode {
    #[default]
    Walking,
    Bicycling,
    Driving,
    Transit,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Driving => "driving",
            Self::Transit => "transit",
        }
    }
}

pub fn build_stop_nav_url(stop: &Stop) -> String {
    let explicit = stop.nav_url.trim();
    if !explicit.is_empty() {
        return explicit.to_owned();
    }

    if let Some((lat, lng)) = stop.coordinates() {
        return format!("{MAPS_SEARCH_URL}{lat},{lng}");
    }

    format!("{MAPS_SEARCH_URL}{}", encode(place_label(stop)))
}

pub fn build_multi_stop_route_url(stops: &[Stop], mode: TravelMode) -> String {
    let ordered = order_stops(stops);

    let (first, last) = match ordered.as_slice() {
        [] => return MAPS_HOME_URL.to_owned(),
        [only] => return build_stop_nav_url(only),
        [first, .., last] => (first, last),
    };

    let between = &ordered[1..ordered.len() - 1];
    let waypoints = if between.is_empty() {
        String::new()
    } else {
        let joined = between
            .iter()
            .map(|stop| point_repr(stop))
            .collect::<Vec<_>>()
            .join("|");
        format!("&waypoints={}", encode(&joined))
    };

    format!(
        "{MAPS_DIRECTIONS_URL}&origin={}&destination={}{waypoints}&travelmode={}",
        encode(&point_repr(first)),
        encode(&point_repr(last)),
        mode.as_str(),
    )
}

/// Coordinates when both are present, else the best textual label.
pub fn point_repr(stop: &Stop) -> String {
    match stop.coordinates() {
        Some((lat, lng)) => format!("{lat},{lng}"),
        None => place_label(stop).to_owned(),
    }
}

fn place_label(stop: &Stop) -> &str {
    [stop.address.as_str(), stop.title.as_str()]
        .into_iter()
        .find(|label| !label.is_empty())
        .unwrap_or(DEFAULT_LOCATION)
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(id: &str, title: &str, order: f64) -> Stop {
        Stop {
            id: id.to_owned(),
            title: title.to_owned(),
            order: Some(order),
            ..Stop::default()
        }
    }

    fn query_param<'a>(url: &'a str, name: &str) -> Vec<&'a str> {
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .filter(|(key, _)| *key == name)
            .map(|(_, value)| value)
            .collect()
    }

    fn looks_like_url(url: &str) -> bool {
        url.starts_with("https://") && !url.chars().any(char::is_whitespace)
    }

    #[test]
    fn explicit_nav_url_wins_after_trimming() {
        let stop = Stop {
            nav_url: "  https://maps.example/stop  ".to_owned(),
            lat: Some(1.0),
            lng: Some(2.0),
            ..Stop::default()
        };
        assert_eq!(build_stop_nav_url(&stop), "https://maps.example/stop");

        let blank = Stop {
            nav_url: "   ".to_owned(),
            title: "Gym".to_owned(),
            ..Stop::default()
        };
        assert_eq!(build_stop_nav_url(&blank), format!("{MAPS_SEARCH_URL}Gym"));
    }

    #[test]
    fn coordinates_beat_address() {
        let stop = Stop {
            address: "1600 Holloway Ave".to_owned(),
            lat: Some(37.7219),
            lng: Some(-122.4782),
            ..Stop::default()
        };
        assert_eq!(
            build_stop_nav_url(&stop),
            format!("{MAPS_SEARCH_URL}37.7219,-122.4782")
        );
    }

    #[test]
    fn half_a_coordinate_pair_falls_back_to_text() {
        let stop = Stop {
            title: "J. Paul Leonard Library".to_owned(),
            lat: Some(37.72),
            ..Stop::default()
        };
        assert_eq!(
            build_stop_nav_url(&stop),
            format!("{MAPS_SEARCH_URL}J.%20Paul%20Leonard%20Library")
        );
    }

    #[test]
    fn empty_stop_still_gets_a_url() {
        let url = build_stop_nav_url(&Stop::default());
        assert!(looks_like_url(&url));
        assert!(url.ends_with(&encode(DEFAULT_LOCATION)));
    }

    #[test]
    fn route_for_no_stops_is_generic() {
        assert_eq!(
            build_multi_stop_route_url(&[], TravelMode::Walking),
            MAPS_HOME_URL
        );
    }

    #[test]
    fn route_for_one_stop_matches_single_stop_link() {
        let only = titled("a", "Library", 1.0);
        assert_eq!(
            build_multi_stop_route_url(std::slice::from_ref(&only), TravelMode::Driving),
            build_stop_nav_url(&only)
        );
    }

    #[test]
    fn two_stops_have_no_waypoints() {
        let stops = [titled("a", "Library", 1.0), titled("b", "Gym", 2.0)];
        let url = build_multi_stop_route_url(&stops, TravelMode::Walking);

        assert!(url.starts_with(MAPS_DIRECTIONS_URL));
        assert_eq!(query_param(&url, "origin"), ["Library"]);
        assert_eq!(query_param(&url, "destination"), ["Gym"]);
        assert!(query_param(&url, "waypoints").is_empty());
        assert_eq!(query_param(&url, "travelmode"), ["walking"]);
    }

    #[test]
    fn middle_stop_becomes_single_waypoint_in_order() {
        let middle = Stop {
            id: "b".to_owned(),
            title: "Gym".to_owned(),
            lat: Some(37.7235),
            lng: Some(-122.4811),
            order: Some(2.0),
            ..Stop::default()
        };
        // Deliberately shuffled; the route follows `order`.
        let stops = [
            titled("c", "Art Gallery", 3.0),
            titled("a", "Library", 1.0),
            middle.clone(),
        ];
        let url = build_multi_stop_route_url(&stops, TravelMode::Bicycling);

        assert!(looks_like_url(&url));
        assert_eq!(query_param(&url, "origin"), ["Library"]);
        assert_eq!(query_param(&url, "destination"), ["Art%20Gallery"]);
        let waypoints = query_param(&url, "waypoints");
        assert_eq!(waypoints, [encode(&point_repr(&middle)).as_str()]);
        assert!(!waypoints[0].contains("%7C"));
        assert_eq!(query_param(&url, "travelmode"), ["bicycling"]);
    }

    #[test]
    fn waypoints_are_pipe_joined_and_encoded() {
        let stops = [
            titled("a", "Library", 1.0),
            titled("b", "Gym", 2.0),
            titled("c", "Quad", 3.0),
            titled("d", "Art Gallery", 4.0),
        ];
        let url = build_multi_stop_route_url(&stops, TravelMode::Walking);

        assert_eq!(query_param(&url, "waypoints"), ["Gym%7CQuad"]);
    }

    #[test]
    fn point_repr_prefers_coordinates_then_address_then_title() {
        let mut stop = Stop {
            title: "Gym".to_owned(),
            ..Stop::default()
        };
        assert_eq!(point_repr(&stop), "Gym");

        stop.address = "Cox Stadium".to_owned();
        assert_eq!(point_repr(&stop), "Cox Stadium");

        stop.lat = Some(37.7);
        stop.lng = Some(-122.5);
        assert_eq!(point_repr(&stop), "37.7,-122.5");

        assert_eq!(point_repr(&Stop::default()), DEFAULT_LOCATION);
    }
}
