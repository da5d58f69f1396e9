use yew::prelude::*;

use crate::view::{
    card_keys, CalloutCard, StopCard, StopListing, EMPTY_HINT, EMPTY_TITLE, PHOTO_UNAVAILABLE,
};

#[derive(Properties, PartialEq)]
pub struct StopCardProps {
    pub card: StopCard,
    pub on_toggle: Callback<String>,
}

#[function_component(StopCardItem)]
pub fn stop_card_item(props: &StopCardProps) -> Html {
    let photo_failed = use_state(|| false);
    let card = &props.card;

    let on_photo_error = {
        let photo_failed = photo_failed.clone();
        Callback::from(move |_: Event| photo_failed.set(true))
    };

    let on_toggle_click = {
        let on_toggle = props.on_toggle.clone();
        let id = card.id.clone();
        Callback::from(move |_: MouseEvent| on_toggle.emit(id.clone()))
    };

    let media = match &card.photo {
        Some(src) if !*photo_failed => html! {
            <div class="card__media">
                <img class="card__img"
                    src={src.clone()}
                    alt={card.photo_alt.clone()}
                    loading="lazy"
                    onerror={on_photo_error} />
            </div>
        },
        _ => html! {
            <div class="card__media card__media--unavailable">{ PHOTO_UNAVAILABLE }</div>
        },
    };

    html! {
        <article class={classes!("card", card.visited.then_some("card--visited"))}>
            { media }
            <div class="card__body">
                <span class="card__badge" hidden={!card.visited}>{ "Visited" }</span>
                <h2 class="card__title">{ &card.title }</h2>
                <p class="card__subtitle">{ &card.subtitle }</p>
                <p class="card__desc">{ &card.description }</p>
                <div class="card__actions">
                    <a class="btn card__nav" href={card.nav_url.clone()} target="_blank" rel="noopener">
                        { "Navigate" }
                    </a>
                    <button class="btn btn--secondary card__visitedBtn" onclick={on_toggle_click}>
                        { card.toggle_label() }
                    </button>
                </div>
            </div>
        </article>
    }
}

pub fn render_listing(listing: Option<StopListing>, on_toggle: &Callback<String>) -> Html {
    match listing {
        None => html! {},
        Some(StopListing::Empty) => render_empty_card(),
        Some(StopListing::Cards(cards)) => {
            let keys = card_keys(&cards);
            html! {
                { for cards.into_iter().zip(keys).map(|(card, key)| html! {
                    <StopCardItem key={key} card={card} on_toggle={on_toggle.clone()} />
                }) }
            }
        }
    }
}

fn render_empty_card() -> Html {
    html! {
        <div class="card">
            <div class="card__body">
                <h2 class="card__title">{ EMPTY_TITLE }</h2>
                <p class="card__desc">{ EMPTY_HINT }</p>
            </div>
        </div>
    }
}

/// Renders nothing when the dataset has no callout for this slot.
pub fn render_callout(callout: Option<&CalloutCard>) -> Html {
    let Some(callout) = callout else {
        return html! {};
    };

    let link = callout.link.as_ref().map(|link| {
        html! {
            <div class="card__actions">
                <a class="btn btn--secondary" href={link.url.clone()} target="_blank" rel="noopener">
                    { &link.label }
                </a>
            </div>
        }
    });

    match &callout.image {
        Some(image) => html! {
            <div class="card callout">
                <div class="card__media">
                    <img class="card__img" src={image.clone()} alt={callout.image_alt.clone()} loading="lazy" />
                    <div class="mediaOverlay">
                        <h3 class="mediaOverlay__title">{ &callout.title }</h3>
                        <p class="mediaOverlay__text">{ &callout.text }</p>
                    </div>
                </div>
                <div class="card__body">
                    { link }
                </div>
            </div>
        },
        None => html! {
            <div class="card callout">
                <div class="card__body">
                    <h2 class="card__title">{ &callout.title }</h2>
                    <p class="card__desc">{ &callout.text }</p>
                    { link }
                </div>
            </div>
        },
    }
}
