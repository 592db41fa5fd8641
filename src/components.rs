//! Yew components for the catalog page.

use crate::hooks::use_price_field;
use hotel_catalog_widgets::config::{RangeConfig, MAX_FIELD_ID, MIN_FIELD_ID};
use hotel_catalog_widgets::controller::{Endpoint, InputChannel, RangeAction, RangeController};
use hotel_catalog_widgets::favorite::{Favorite, FlagStore, LocalStorageStore, MemoryStore};
use hotel_catalog_widgets::input::{DragSession, DragState, StepDirection, TrackGeometry};
use hotel_catalog_widgets::listener::ScopedListener;
use hotel_catalog_widgets::progress::{percent_of, render};
use log::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, EventTarget};
use yew::prelude::*;

fn field_id(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Min => MIN_FIELD_ID,
        Endpoint::Max => MAX_FIELD_ID,
    }
}

fn track_geometry(track_ref: &NodeRef) -> Option<TrackGeometry> {
    let rect = track_ref.cast::<Element>()?.get_bounding_client_rect();
    Some(TrackGeometry {
        left: rect.left(),
        width: rect.width(),
    })
}

/// Register the document-level listeners of one drag session.
///
/// The returned listeners must be kept alive for the whole session; dropping
/// them detaches every handler.
fn attach_drag_listeners(
    session: DragSession,
    max_value: u32,
    dispatcher: UseReducerDispatcher<RangeController>,
    drag: UseStateHandle<DragState>,
) -> Result<Vec<ScopedListener>, JsValue> {
    let document: EventTarget = gloo_utils::document().into();
    let window: EventTarget = gloo_utils::window().into();

    let move_to = move |client_x: f64| {
        if let Some(value) = session.proposal(client_x, max_value) {
            dispatcher.dispatch(RangeAction::Reconcile {
                endpoint: session.endpoint,
                value,
                channel: session.channel,
            });
        }
    };
    let end = move |_: Event| drag.set(DragState::Idle);

    let mut listeners = Vec::with_capacity(4);
    match session.channel {
        InputChannel::Touch => {
            listeners.push(ScopedListener::attach_active(&document, "touchmove", move |e: Event| {
                let touch = e.dyn_ref::<TouchEvent>().and_then(|t| t.touches().get(0));
                if let Some(touch) = touch {
                    e.prevent_default();
                    move_to(f64::from(touch.client_x()));
                }
            })?);
            listeners.push(ScopedListener::attach(&document, "touchend", end.clone())?);
            listeners.push(ScopedListener::attach(&document, "touchcancel", end.clone())?);
        }
        _ => {
            listeners.push(ScopedListener::attach(&document, "mousemove", move |e: Event| {
                if let Some(mouse) = e.dyn_ref::<MouseEvent>() {
                    move_to(f64::from(mouse.client_x()));
                }
            })?);
            listeners.push(ScopedListener::attach(&document, "mouseup", end.clone())?);
        }
    }
    // Losing the window mid-drag never delivers a release event.
    listeners.push(ScopedListener::attach(&window, "blur", end)?);

    Ok(listeners)
}

#[derive(Properties, PartialEq)]
pub struct RangeHandleProps {
    pub endpoint: Endpoint,
    pub value: u32,
    pub config: RangeConfig,
    pub active: bool,
    pub onmousedown: Callback<MouseEvent>,
    pub ontouchstart: Callback<TouchEvent>,
    pub onkeydown: Callback<KeyboardEvent>,
}

/// One draggable, focusable handle on the track.
#[function_component(RangeHandle)]
pub fn range_handle(props: &RangeHandleProps) -> Html {
    let modifier = match props.endpoint {
        Endpoint::Min => "range-scale__button--min",
        Endpoint::Max => "range-scale__button--max",
    };
    let label = match props.endpoint {
        Endpoint::Min => "Минимальная цена",
        Endpoint::Max => "Максимальная цена",
    };

    html! {
        <button
            type="button"
            class={classes!(
                "range-scale__button",
                modifier,
                props.active.then_some("range-scale__button--active")
            )}
            style={format!("left: {}%;", percent_of(props.value, props.config.max_value))}
            role="slider"
            aria-label={label}
            aria-controls={field_id(props.endpoint)}
            aria-valuemin="0"
            aria-valuemax={props.config.max_value.to_string()}
            aria-valuenow={props.value.to_string()}
            onmousedown={props.onmousedown.clone()}
            ontouchstart={props.ontouchstart.clone()}
            onkeydown={props.onkeydown.clone()}
        />
    }
}

#[derive(Properties, PartialEq)]
pub struct PriceRangeScaleProps {
    #[prop_or_default]
    pub config: RangeConfig,
}

/// Dual-handle price slider with its two mirrored text fields.
#[function_component(PriceRangeScale)]
pub fn price_range_scale(props: &PriceRangeScaleProps) -> Html {
    let range = {
        let config = props.config;
        use_reducer_eq(move || RangeController::new(config))
    };
    let drag = use_state(DragState::default);
    let track_ref = use_node_ref();
    let min_field = use_price_field(Endpoint::Min, range.clone());
    let max_field = use_price_field(Endpoint::Max, range.clone());

    let config = *range.config();
    let state = range.state();
    let progress = render(state, &config);

    // Document listeners exist only while a session is active.
    {
        let dispatcher = range.dispatcher();
        let drag_handle = drag.clone();
        use_effect_with(*drag, move |drag_state| -> Box<dyn FnOnce()> {
            let Some(session) = drag_state.session() else {
                return Box::new(|| ());
            };
            debug!("drag started on {:?} via {:?}", session.endpoint, session.channel);
            match attach_drag_listeners(session, config.max_value, dispatcher, drag_handle.clone()) {
                Ok(listeners) => Box::new(move || {
                    debug!("drag ended, detaching {} listeners", listeners.len());
                    drop(listeners);
                }),
                Err(e) => {
                    warn!("Failed to start drag session: {:?}", e);
                    drag_handle.set(DragState::Idle);
                    Box::new(|| ())
                }
            }
        });
    }

    let start_drag = |endpoint: Endpoint, channel: InputChannel| {
        let drag = drag.clone();
        let track_ref = track_ref.clone();
        move || {
            let Some(track) = track_geometry(&track_ref) else {
                warn!("Range track is not mounted; ignoring drag");
                return;
            };
            drag.set((*drag).press(DragSession {
                endpoint,
                channel,
                track,
            }));
        }
    };

    let handle = |endpoint: Endpoint| {
        let onmousedown = {
            let start = start_drag(endpoint, InputChannel::Pointer);
            Callback::from(move |e: MouseEvent| {
                if e.button() == 0 {
                    // Keeps the page from selecting text while dragging.
                    e.prevent_default();
                    start();
                }
            })
        };
        let ontouchstart = {
            let start = start_drag(endpoint, InputChannel::Touch);
            Callback::from(move |_: TouchEvent| start())
        };
        let onkeydown = {
            let dispatcher = range.dispatcher();
            Callback::from(move |e: KeyboardEvent| {
                let Some(direction) = StepDirection::from_handle_key(&e.key()) else {
                    return;
                };
                e.prevent_default();
                dispatcher.dispatch(RangeAction::Step {
                    endpoint,
                    direction,
                });
            })
        };
        let active = drag.session().is_some_and(|s| s.endpoint == endpoint);

        html! {
            <RangeHandle
                {endpoint}
                value={state.get(endpoint)}
                {config}
                {active}
                {onmousedown}
                {ontouchstart}
                {onkeydown}
            />
        }
    };

    html! {
        <div class="range-scale-widget">
            <div class="range-scale" ref={track_ref.clone()}>
                <div class="range-scale__progress" style={progress.style(config.handle_inset_px)}></div>
                { handle(Endpoint::Min) }
                { handle(Endpoint::Max) }
            </div>
            <div class="range-scale__fields">
                <label class="range-scale__field">
                    <span class="visually-hidden">{ "Минимальная цена" }</span>
                    <input
                        id={MIN_FIELD_ID}
                        type="text"
                        inputmode="numeric"
                        value={min_field.text}
                        oninput={min_field.oninput}
                        onchange={min_field.onchange}
                        onblur={min_field.onblur}
                        onkeydown={min_field.onkeydown}
                    />
                </label>
                <label class="range-scale__field">
                    <span class="visually-hidden">{ "Максимальная цена" }</span>
                    <input
                        id={MAX_FIELD_ID}
                        type="text"
                        inputmode="numeric"
                        value={max_field.text}
                        oninput={max_field.oninput}
                        onchange={max_field.onchange}
                        onblur={max_field.onblur}
                        onkeydown={max_field.onkeydown}
                    />
                </label>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct FavoriteButtonProps {
    /// Catalog item key, taken from the item's title.
    pub hotel_id: AttrValue,
}

fn open_store() -> Box<dyn FlagStore> {
    match LocalStorageStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("{}; favorites will not survive a reload", e);
            Box::new(MemoryStore::default())
        }
    }
}

/// Toggle button that remembers whether a hotel is a favorite.
#[function_component(FavoriteButton)]
pub fn favorite_button(props: &FavoriteButtonProps) -> Html {
    let store = use_memo((), |_| open_store());
    let favorite = {
        let store = store.clone();
        let key = props.hotel_id.to_string();
        use_state(move || Favorite::load(key, &**store))
    };

    let onclick = {
        let favorite = favorite.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            let mut next = (*favorite).clone();
            if let Err(err) = next.toggle(&**store) {
                warn!("{}", err);
            }
            favorite.set(next);
        })
    };

    html! {
        <button
            type="button"
            class={classes!(
                "catalog__button",
                "button--primary",
                favorite.active.then_some("active")
            )}
            title={favorite.title()}
            aria-pressed={favorite.aria_pressed()}
            {onclick}
        >
            { favorite.label() }
        </button>
    }
}
