//! Entry point for the catalog page widgets.
//! Mounts the price range slider and one favorite button per catalog item
//! into the server-rendered markup.

use hotel_catalog_widgets::config::*;
use hotel_catalog_widgets::favorite::favorite_key;
use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::Element;

mod components;
mod hooks;

use components::{FavoriteButton, FavoriteButtonProps, PriceRangeScale, PriceRangeScaleProps};

/// Configuration from the root's `data-range-config` attribute, or defaults.
fn read_range_config(root: &Element) -> RangeConfig {
    match root.get_attribute(RANGE_CONFIG_ATTR) {
        None => RangeConfig::default(),
        Some(json) => RangeConfig::from_json(&json).unwrap_or_else(|e| {
            warn!("{}; falling back to defaults", e);
            RangeConfig::default()
        }),
    }
}

fn mount_price_range() {
    let Some(root) = gloo_utils::document().get_element_by_id(RANGE_ROOT_ID) else {
        info!("No #{} element on this page, price range not mounted", RANGE_ROOT_ID);
        return;
    };
    let config = read_range_config(&root);
    info!(
        "Mounting price range 0..{} (gap {}, debounce {} ms)",
        config.max_value, config.min_gap, config.debounce_ms
    );
    yew::Renderer::<PriceRangeScale>::with_root_and_props(root, PriceRangeScaleProps { config })
        .render();
}

/// Product key of a catalog item, taken from its title.
fn hotel_id(item: &Element) -> Option<String> {
    let title = item.query_selector(CATALOG_TITLE_SELECTOR).ok().flatten()?;
    favorite_key(&title.text_content()?)
}

fn mount_favorites() {
    let items = match gloo_utils::document().query_selector_all(CATALOG_ITEM_SELECTOR) {
        Ok(items) => items,
        Err(e) => {
            warn!("Failed to query catalog items: {:?}", e);
            return;
        }
    };

    let mut mounted = 0;
    for idx in 0..items.length() {
        let Some(item) = items.item(idx).and_then(|node| node.dyn_into::<Element>().ok()) else {
            continue;
        };
        let mount = item.query_selector(FAVORITE_MOUNT_SELECTOR).ok().flatten();
        match (hotel_id(&item), mount) {
            (Some(id), Some(mount)) => {
                yew::Renderer::<FavoriteButton>::with_root_and_props(
                    mount,
                    FavoriteButtonProps {
                        hotel_id: id.into(),
                    },
                )
                .render();
                mounted += 1;
            }
            _ => debug!("Catalog item {} has no title or favorite mount, skipping", idx),
        }
    }
    info!("Mounted {} favorite buttons", mounted);
}

fn main() {
    // Set the panic hook to log detailed errors to the console
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    mount_price_range();
    mount_favorites();
}
