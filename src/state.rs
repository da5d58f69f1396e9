use std::rc::Rc;

use log::info;
use yew::Reducible;

use crate::config::DEFAULT_TRAVEL_MODE;
use crate::data::{PageSections, Tour, TourDataset};
use crate::navigation::build_multi_stop_route_url;
use crate::storage::{
    load_active_tour_id, load_visited_set, save_active_tour_id, save_visited_set, KeyValueStore,
    VisitedSet,
};
use crate::view::{stop_listing, StopFilter, StopListing};

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Loaded(TourDataset),
    SelectTour(String),
    ToggleVisited(String),
    ResetVisited,
    Search(String),
    HideVisited(bool),
}

/// Everything the page mutates, owned in one place. Each action that changes
/// the visited set or the active tour writes it through to `store`.
#[derive(Debug, Clone)]
pub struct AppState<S> {
    store: S,
    dataset: Option<Rc<TourDataset>>,
    active: usize,
    visited: VisitedSet,
    filter: StopFilter,
}

impl<S: KeyValueStore> AppState<S> {
    pub fn new(store: S) -> Self {
        let visited = load_visited_set(&store);
        Self {
            store,
            dataset: None,
            active: 0,
            visited,
            filter: StopFilter::default(),
        }
    }

    pub fn apply(&mut self, action: AppAction) {
        match action {
            AppAction::Loaded(dataset) => {
                let preferred = load_active_tour_id(&self.store);
                self.active = preferred
                    .and_then(|id| dataset.tours.iter().position(|tour| tour.id == id))
                    .unwrap_or(0);
                self.dataset = Some(Rc::new(dataset));
            }
            AppAction::SelectTour(id) => {
                let Some(dataset) = &self.dataset else {
                    return;
                };
                self.active = dataset
                    .tours
                    .iter()
                    .position(|tour| tour.id == id)
                    .unwrap_or(0);
                if let Some(tour) = dataset.tours.get(self.active) {
                    info!("Switched to tour '{}'", tour.id);
                    save_active_tour_id(&self.store, &tour.id);
                }
            }
            AppAction::ToggleVisited(id) => {
                if id.is_empty() {
                    return;
                }
                self.visited.toggle(&id);
                save_visited_set(&self.store, &self.visited);
            }
            AppAction::ResetVisited => {
                self.visited.clear();
                save_visited_set(&self.store, &self.visited);
            }
            AppAction::Search(query) => self.filter.query = query,
            AppAction::HideVisited(hide) => self.filter.hide_visited = hide,
        }
    }

    pub fn tours(&self) -> &[Tour] {
        self.dataset
            .as_deref()
            .map(|dataset| dataset.tours.as_slice())
            .unwrap_or_default()
    }

    pub fn active_tour(&self) -> Option<&Tour> {
        self.tours().get(self.active)
    }

    pub fn page_sections(&self) -> Option<&PageSections> {
        self.dataset.as_deref().map(|dataset| &dataset.page_sections)
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn filter(&self) -> &StopFilter {
        &self.filter
    }

    pub fn listing(&self) -> Option<StopListing> {
        self.active_tour()
            .map(|tour| stop_listing(tour, &self.visited, &self.filter))
    }

    /// The tour's own route link when it has one, otherwise a directions
    /// link through every stop in order.
    pub fn route_url(&self) -> Option<String> {
        self.active_tour().map(|tour| {
            let explicit = tour.route_url.trim();
            if explicit.is_empty() {
                build_multi_stop_route_url(&tour.stops, DEFAULT_TRAVEL_MODE)
            } else {
                explicit.to_owned()
            }
        })
    }
}

impl<S: KeyValueStore + Clone> Reducible for AppState<S> {
    type Action = AppAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ACTIVE_TOUR_KEY, MAPS_DIRECTIONS_URL, VISITED_KEY};
    use crate::data::{parse_dataset, Stop};
    use crate::storage::MemoryStore;

    fn dataset() -> TourDataset {
        parse_dataset(
            r#"{"tours": [
                {"id": "main", "name": "Main Loop", "routeUrl": "https://maps.example/main",
                 "stops": [{"id": "library", "title": "Library", "order": 1},
                           {"id": "gym", "title": "Gym", "order": 2}]},
                {"id": "art", "name": "Art Walk",
                 "stops": [{"id": "gallery", "title": "Art Gallery", "order": 1},
                           {"id": "studio", "title": "Studio", "order": 2}]}
            ]}"#,
        )
        .unwrap()
    }

    fn loaded(store: &MemoryStore) -> AppState<MemoryStore> {
        let mut state = AppState::new(store.clone());
        state.apply(AppAction::Loaded(dataset()));
        state
    }

    fn card_ids(state: &AppState<MemoryStore>) -> Vec<String> {
        match state.listing() {
            Some(StopListing::Cards(cards)) => cards.into_iter().map(|card| card.id).collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn nothing_to_show_before_load() {
        let state = AppState::new(MemoryStore::default());
        assert!(state.tours().is_empty());
        assert!(state.active_tour().is_none());
        assert!(state.listing().is_none());
        assert!(state.route_url().is_none());
    }

    #[test]
    fn startup_seeds_visited_from_storage() {
        let store = MemoryStore::default();
        store.write(VISITED_KEY, r#"["gym"]"#).unwrap();

        let state = AppState::new(store);
        assert!(state.visited().contains("gym"));
    }

    #[test]
    fn first_tour_is_active_without_a_saved_choice() {
        let state = loaded(&MemoryStore::default());
        assert_eq!(state.active_tour().unwrap().id, "main");
    }

    #[test]
    fn saved_tour_is_restored_when_it_still_exists() {
        let store = MemoryStore::default();
        store.write(ACTIVE_TOUR_KEY, "art").unwrap();
        assert_eq!(loaded(&store).active_tour().unwrap().id, "art");

        store.write(ACTIVE_TOUR_KEY, "retired").unwrap();
        assert_eq!(loaded(&store).active_tour().unwrap().id, "main");
    }

    #[test]
    fn selecting_a_tour_persists_it() {
        let store = MemoryStore::default();
        let mut state = loaded(&store);

        state.apply(AppAction::SelectTour("art".to_owned()));
        assert_eq!(state.active_tour().unwrap().id, "art");
        assert_eq!(card_ids(&state), ["gallery", "studio"]);
        assert_eq!(load_active_tour_id(&store).as_deref(), Some("art"));

        state.apply(AppAction::SelectTour("missing".to_owned()));
        assert_eq!(state.active_tour().unwrap().id, "main");
        assert_eq!(load_active_tour_id(&store).as_deref(), Some("main"));
    }

    #[test]
    fn toggle_writes_through_and_twice_restores() {
        let store = MemoryStore::default();
        let mut state = loaded(&store);

        state.apply(AppAction::ToggleVisited("gym".to_owned()));
        assert!(state.visited().contains("gym"));
        assert!(load_visited_set(&store).contains("gym"));

        state.apply(AppAction::ToggleVisited("gym".to_owned()));
        assert!(state.visited().is_empty());
        assert!(load_visited_set(&store).is_empty());
    }

    #[test]
    fn toggle_without_id_does_nothing() {
        let store = MemoryStore::default();
        let mut state = loaded(&store);

        state.apply(AppAction::ToggleVisited(String::new()));
        assert!(state.visited().is_empty());
        assert_eq!(store.read(VISITED_KEY), None);
    }

    #[test]
    fn reset_clears_visited_but_keeps_the_key() {
        let store = MemoryStore::default();
        let mut state = loaded(&store);
        state.apply(AppAction::ToggleVisited("library".to_owned()));
        state.apply(AppAction::ToggleVisited("gym".to_owned()));

        state.apply(AppAction::ResetVisited);
        assert!(state.visited().is_empty());
        assert_eq!(store.read(VISITED_KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn filters_drive_the_listing() {
        let mut state = loaded(&MemoryStore::default());
        state.apply(AppAction::ToggleVisited("library".to_owned()));

        state.apply(AppAction::HideVisited(true));
        assert_eq!(card_ids(&state), ["gym"]);

        state.apply(AppAction::Search("LIB".to_owned()));
        assert_eq!(state.listing(), Some(StopListing::Empty));

        state.apply(AppAction::HideVisited(false));
        assert_eq!(card_ids(&state), ["library"]);
    }

    #[test]
    fn route_prefers_explicit_link_then_builds_directions() {
        let mut state = loaded(&MemoryStore::default());
        assert_eq!(state.route_url().as_deref(), Some("https://maps.example/main"));

        state.apply(AppAction::SelectTour("art".to_owned()));
        let url = state.route_url().unwrap();
        assert!(url.starts_with(MAPS_DIRECTIONS_URL));
        assert!(url.contains("origin=Art%20Gallery"));
        assert!(url.contains("destination=Studio"));
        assert!(url.ends_with("travelmode=walking"));
    }

    #[test]
    fn reducer_leaves_previous_state_untouched() {
        let store = MemoryStore::default();
        let before = Rc::new(loaded(&store));
        let after = before
            .clone()
            .reduce(AppAction::ToggleVisited("gym".to_owned()));

        assert!(!before.visited().contains("gym"));
        assert!(after.visited().contains("gym"));
        assert_eq!(
            after.active_tour().map(|tour| tour.stops.clone()),
            Some(vec![
                Stop {
                    id: "library".to_owned(),
                    title: "Library".to_owned(),
                    order: Some(1.0),
                    ..Stop::default()
                },
                Stop {
                    id: "gym".to_owned(),
                    title: "Gym".to_owned(),
                    order: Some(2.0),
                    ..Stop::default()
                },
            ])
        );
    }
}
