pub mod browser;
pub mod cards;
pub mod config;
pub mod data;
pub mod navigation;
pub mod state;
pub mod storage;
pub mod theme;
pub mod view;

use browser::{InstallPrompt, ShareOutcome};
use cards::{render_callout, render_listing};
use config::{
    LINK_COPIED_MESSAGE, LOADING_MESSAGE, LOAD_ERROR_MESSAGE, LOG_LEVEL, RESET_MESSAGE,
    SERVICE_WORKER_PATH,
};
use data::{load_tour_data, Tour};
use gloo_events::EventListener;
use log::{error, warn};
use state::{AppAction, AppState};
use storage::{load_theme, save_theme, LocalStore};
use theme::Theme;
use view::{tour_heading, tour_option_label, CalloutCard};
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

const ROUTE_BUTTON_LABEL: &str = "Open Full Route in Google Maps";
const ONLINE_TEXT: &str = "Online";
const OFFLINE_TEXT: &str = "Offline (showing cached content if available)";

#[derive(PartialEq, Clone)]
enum FetchStatus {
    Loading,
    Ready,
    Error(String),
}

#[function_component(App)]
fn app() -> Html {
    let tour_state = use_reducer(|| AppState::new(LocalStore));
    let fetch_status = use_state(|| FetchStatus::Loading);
    let notice = use_state(|| None::<String>);
    let theme = use_state(|| load_theme(&LocalStore));
    let prefers_dark = use_state(browser::system_prefers_dark);
    let online = use_state(browser::is_online);
    let install_prompt = use_state(|| None::<InstallPrompt>);

    let effective_theme = theme.effective(*prefers_dark);

    use_effect_with_deps(
        move |effective: &Theme| {
            if let Err(err) = browser::apply_theme(*effective) {
                warn!("Could not apply theme: {}", err);
            }
            || ()
        },
        effective_theme,
    );

    {
        let prefers_dark = prefers_dark.clone();
        use_effect_with_deps(
            move |theme: &Theme| {
                // Only a stored "system" choice tracks the OS setting live.
                let listener = (*theme == Theme::System)
                    .then(browser::dark_scheme_query)
                    .flatten()
                    .map(|query| {
                        let target = query.clone();
                        EventListener::new(&target, "change", move |_| {
                            prefers_dark.set(query.matches());
                        })
                    });
                move || drop(listener)
            },
            *theme,
        );
    }

    {
        let online = online.clone();
        let install_prompt = install_prompt.clone();
        use_effect_with_deps(
            move |_| {
                let mut listeners = Vec::new();
                if let Some(window) = web_sys::window() {
                    for event in ["online", "offline"] {
                        let online = online.clone();
                        listeners.push(EventListener::new(&window, event, move |_| {
                            online.set(browser::is_online());
                        }));
                    }

                    let offered = install_prompt.clone();
                    listeners.push(browser::listen_for_install_prompt(
                        &window,
                        move |prompt| offered.set(Some(prompt)),
                    ));

                    let installed = install_prompt.clone();
                    listeners.push(EventListener::new(&window, "appinstalled", move |_| {
                        installed.set(None);
                    }));
                }
                move || drop(listeners)
            },
            (),
        );
    }

    {
        let tour_state = tour_state.clone();
        let fetch_status = fetch_status.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    match load_tour_data().await {
                        Ok(dataset) => {
                            tour_state.dispatch(AppAction::Loaded(dataset));
                            fetch_status.set(FetchStatus::Ready);
                        }
                        Err(err) => {
                            error!("Tour data load failed: {}", err);
                            fetch_status.set(FetchStatus::Error(LOAD_ERROR_MESSAGE.to_owned()));
                        }
                    }

                    browser::register_service_worker(SERVICE_WORKER_PATH).await;
                });
                || ()
            },
            (),
        );
    }

    let on_toggle_visited = {
        let tour_state = tour_state.clone();
        Callback::from(move |id: String| tour_state.dispatch(AppAction::ToggleVisited(id)))
    };

    let on_search = {
        let tour_state = tour_state.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            tour_state.dispatch(AppAction::Search(input.value()));
        })
    };

    let on_hide_visited = {
        let tour_state = tour_state.clone();
        Callback::from(move |event: Event| {
            let input: HtmlInputElement = event.target_unchecked_into();
            tour_state.dispatch(AppAction::HideVisited(input.checked()));
        })
    };

    let on_reset = {
        let tour_state = tour_state.clone();
        let notice = notice.clone();
        Callback::from(move |_: MouseEvent| {
            tour_state.dispatch(AppAction::ResetVisited);
            notice.set(Some(RESET_MESSAGE.to_owned()));
        })
    };

    let on_select_tour = {
        let tour_state = tour_state.clone();
        let notice = notice.clone();
        Callback::from(move |event: Event| {
            let select: HtmlSelectElement = event.target_unchecked_into();
            tour_state.dispatch(AppAction::SelectTour(select.value()));
            notice.set(None);
        })
    };

    let on_reload = Callback::from(|event: MouseEvent| {
        event.prevent_default();
        if let Err(err) = browser::reload_page() {
            warn!("Reload failed: {}", err);
        }
    });

    let on_toggle_theme = {
        let theme = theme.clone();
        Callback::from(move |_: MouseEvent| {
            let next = effective_theme.toggled();
            save_theme(&LocalStore, next);
            theme.set(next);
        })
    };

    let on_install = {
        let install_prompt = install_prompt.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(prompt) = &*install_prompt {
                if let Err(err) = prompt.prompt() {
                    warn!("Install prompt failed: {}", err);
                }
            }
            install_prompt.set(None);
        })
    };

    let on_share = {
        let notice = notice.clone();
        let title = tour_state
            .active_tour()
            .map(tour_heading)
            .unwrap_or_else(|| "Campus Tour".to_owned());
        Callback::from(move |_: MouseEvent| {
            let notice = notice.clone();
            let title = title.clone();
            spawn_local(async move {
                match browser::share_page(&title).await {
                    Ok(ShareOutcome::Copied) => notice.set(Some(LINK_COPIED_MESSAGE.to_owned())),
                    Ok(ShareOutcome::Shared) => {}
                    Ok(ShareOutcome::Unsupported) => warn!("No share or clipboard support"),
                    Err(err) => warn!("Share failed: {}", err),
                }
            });
        })
    };

    let status_text = match &*fetch_status {
        FetchStatus::Loading => LOADING_MESSAGE.to_owned(),
        FetchStatus::Error(message) => message.clone(),
        FetchStatus::Ready => (*notice).clone().unwrap_or_default(),
    };

    let sections = tour_state.page_sections();
    let intro = sections
        .and_then(|sections| sections.intro_callout.as_ref())
        .map(CalloutCard::from_callout);
    let outro = sections
        .and_then(|sections| sections.outro_callout.as_ref())
        .map(CalloutCard::from_callout);

    html! {
        <div class="app">
            <header class="topbar">
                <div class="status">
                    <span class={classes!("status__dot", if *online { "online" } else { "offline" })}></span>
                    <span class="status__text">{ if *online { ONLINE_TEXT } else { OFFLINE_TEXT } }</span>
                </div>
                <div class="topbar__actions">
                    <button class="btn btn--ghost" onclick={on_toggle_theme}
                        aria-label={format!("Theme: {effective_theme}. Tap to toggle.")}>
                        { effective_theme.toggle_label() }
                    </button>
                    {
                        if install_prompt.is_some() {
                            html! { <button class="btn btn--ghost" onclick={on_install}>{ "Install" }</button> }
                        } else {
                            html! {}
                        }
                    }
                    <button class="btn btn--ghost" onclick={on_share}>{ "Share" }</button>
                    <button class="btn btn--ghost" onclick={on_reload}>{ "Reload" }</button>
                </div>
            </header>

            { render_tour_header(tour_state.active_tour()) }

            <section class="controls">
                { render_tour_select(tour_state.tours(), tour_state.active_tour(), on_select_tour) }
                <input class="controls__search" type="search" placeholder="Search stops"
                    value={tour_state.filter().query.clone()} oninput={on_search} />
                <label class="controls__toggle">
                    <input type="checkbox" checked={tour_state.filter().hide_visited}
                        onchange={on_hide_visited} />
                    { "Hide visited" }
                </label>
                <button class="btn btn--secondary" onclick={on_reset}>{ "Reset visited" }</button>
                {
                    match tour_state.route_url() {
                        Some(route_url) => html! {
                            <a class="btn" href={route_url} target="_blank" rel="noopener">
                                { ROUTE_BUTTON_LABEL }
                            </a>
                        },
                        None => html! {},
                    }
                }
            </section>

            <p class="statusBar" role="status">{ status_text }</p>

            <section class="callout callout--intro">{ render_callout(intro.as_ref()) }</section>
            <main class="stops-grid">
                { render_listing(tour_state.listing(), &on_toggle_visited) }
            </main>
            <section class="callout callout--outro">{ render_callout(outro.as_ref()) }</section>
        </div>
    }
}

fn render_tour_header(tour: Option<&Tour>) -> Html {
    let Some(tour) = tour else {
        return html! {};
    };

    html! {
        <section class="tour-header">
            <h1 class="tour-header__name">{ tour_heading(tour) }</h1>
            if !tour.description.is_empty() {
                <p class="tour-header__desc">{ &tour.description }</p>
            }
        </section>
    }
}

fn render_tour_select(tours: &[Tour], active: Option<&Tour>, on_change: Callback<Event>) -> Html {
    if tours.is_empty() {
        return html! {};
    }

    let active_id = active.map(|tour| tour.id.as_str()).unwrap_or_default();

    html! {
        <select class="controls__tour" aria-label="Choose a tour" onchange={on_change}>
            { for tours.iter().map(|tour| html! {
                <option value={tour.id.clone()} selected={tour.id == active_id}>
                    { tour_option_label(tour) }
                </option>
            }) }
        </select>
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(LOG_LEVEL));
    yew::Renderer::<App>::new().render();
}
