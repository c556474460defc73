//! Application Context
//!
//! Shared handles provided via Leptos Context API. The planners hold `Rc`
//! state, so they live in local (non-`Send`) stored values.

use std::collections::HashMap;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos_dragdrop::{create_dnd_signals, DndSignals};

use crate::commands::RestApi;
use crate::config::ApiConfig;
use crate::directory::SidebarTarget;
use crate::models::{ItemId, Platform};
use crate::notice::Notifier;
use crate::planner::{GridHandle, Planner};
use crate::store::{store_bump_collections, store_bump_items, AppStore};

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    store: AppStore,
    base_url: StoredValue<String>,
    notifier: StoredValue<Notifier, LocalStorage>,
    /// One planner per platform, created on first use
    planners: StoredValue<HashMap<Platform, Planner<RestApi>>, LocalStorage>,
    /// Card grid drag state
    pub grid_dnd: DndSignals<GridHandle>,
    /// Folder sidebar drag state
    pub sidebar_dnd: DndSignals<SidebarTarget>,
    /// Handle with keyboard focus in the grid
    pub focused: RwSignal<Option<GridHandle>>,
    /// Item open in the editor panel
    pub editing_item: RwSignal<Option<ItemId>>,
}

impl AppContext {
    pub fn new(store: AppStore, config: ApiConfig, notifier: Notifier) -> Self {
        Self {
            store,
            base_url: StoredValue::new(config.base_url),
            notifier: StoredValue::new_local(notifier),
            planners: StoredValue::new_local(HashMap::new()),
            grid_dnd: create_dnd_signals(),
            sidebar_dnd: create_dnd_signals(),
            focused: RwSignal::new(None),
            editing_item: RwSignal::new(None),
        }
    }

    /// Planner for `platform`, wired to the app store on creation
    pub fn planner(&self, platform: Platform) -> Planner<RestApi> {
        if let Some(planner) = self.planners.with_value(|all| all.get(&platform).cloned()) {
            return planner;
        }

        let config = ApiConfig {
            base_url: self.base_url.get_value(),
            platform,
        };
        let api = Rc::new(RestApi::new(&config));
        let planner = Planner::new(api, platform, self.notifier.get_value());
        log::info!("[STORE] planner for {} at {}", platform.label(), config.endpoint());

        let store = self.store;
        planner.items().subscribe(move |_collection_id| store_bump_items(&store));
        planner.directory().subscribe(move || store_bump_collections(&store));

        self.planners.update_value(|all| {
            all.insert(platform, planner.clone());
        });
        planner
    }
}

pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
