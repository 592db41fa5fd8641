use hotel_catalog_widgets::controller::{Endpoint, InputChannel, RangeAction, RangeController};
use hotel_catalog_widgets::debounce::Debouncer;
use hotel_catalog_widgets::input::{
    classify_keystroke, commit_proposal, parse_leading_int, Keystroke, StepDirection,
};
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// State and callbacks for one price text field.
#[derive(Clone)]
pub struct PriceField {
    /// What the field shows: the user's uncommitted draft, or the range value.
    pub text: String,
    /// Keystrokes; numeric text is reconciled after the debounce delay.
    pub oninput: Callback<InputEvent>,
    pub onchange: Callback<Event>,
    pub onblur: Callback<FocusEvent>,
    /// Enter commits, ArrowUp/ArrowDown step immediately.
    pub onkeydown: Callback<KeyboardEvent>,
}

/// Text field mirrored with one endpoint of `range`.
#[hook]
pub fn use_price_field(endpoint: Endpoint, range: UseReducerHandle<RangeController>) -> PriceField {
    let config = *range.config();
    let committed = range.state().get(endpoint);
    let dispatcher = range.dispatcher();

    // Uncommitted text; `None` means the field mirrors the range.
    let draft = use_state(|| None::<String>);
    let debouncer = use_mut_ref(|| Debouncer::with_timeout(config.debounce_ms));

    let oninput = {
        let draft = draft.clone();
        let debouncer = debouncer.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let text = input.value();
            let keystroke = classify_keystroke(&text);
            draft.set(Some(text));

            match keystroke {
                Keystroke::Tolerated => {
                    debouncer.borrow_mut().cancel();
                }
                Keystroke::Deferred(value) => {
                    let dispatcher = dispatcher.clone();
                    let draft = draft.clone();
                    debouncer.borrow_mut().schedule(move || {
                        dispatcher.dispatch(RangeAction::Reconcile {
                            endpoint,
                            value,
                            channel: InputChannel::Text,
                        });
                        draft.set(None);
                    });
                }
            }
        })
    };

    let commit = {
        let draft = draft.clone();
        let debouncer = debouncer.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |text: String| {
            debouncer.borrow_mut().cancel();
            dispatcher.dispatch(RangeAction::Reconcile {
                endpoint,
                value: commit_proposal(&text, endpoint, &config),
                channel: InputChannel::Text,
            });
            draft.set(None);
        })
    };

    let onchange = {
        let commit = commit.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            commit.emit(input.value());
        })
    };

    let onblur = {
        let commit = commit.clone();
        Callback::from(move |e: FocusEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            commit.emit(input.value());
        })
    };

    let onkeydown = {
        let draft = draft.clone();
        Callback::from(move |e: KeyboardEvent| {
            let key = e.key();
            if key == "Enter" {
                let input: HtmlInputElement = e.target_unchecked_into();
                commit.emit(input.value());
                return;
            }
            let Some(direction) = StepDirection::from_field_key(&key) else {
                return;
            };
            e.prevent_default();
            debouncer.borrow_mut().cancel();

            // Step from what the user sees, even if it is not committed yet.
            let base = draft
                .as_deref()
                .and_then(parse_leading_int)
                .map(|v| v.clamp(0.0, f64::from(config.max_value)) as u32);
            let action = match base {
                Some(base) => RangeAction::Reconcile {
                    endpoint,
                    value: direction.proposal(base, &config),
                    channel: InputChannel::Keyboard,
                },
                None => RangeAction::Step {
                    endpoint,
                    direction,
                },
            };
            dispatcher.dispatch(action);
            draft.set(None);
        })
    };

    PriceField {
        text: (*draft).clone().unwrap_or_else(|| committed.to_string()),
        oninput,
        onchange,
        onblur,
        onkeydown,
    }
}
