//! Planner Frontend App
//!
//! Three-column layout: collection sidebar, card grid, item editor.

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;

use crate::components::{CollectionSidebar, ItemEditor, NewItemForm, NoticeBanner, PlannerGrid, PlatformTabBar};
use crate::config::ApiConfig;
use crate::context::AppContext;
use crate::notice::{Notice, NoticeLevel, Notifier};
use crate::prefs;
use crate::store::{store_push_notice, AppState, AppStateStoreFields};

#[component]
pub fn App() -> impl IntoView {
    let config = ApiConfig::default();
    let store = Store::new(AppState::new(config.platform, prefs::load_grid_lock()));
    provide_context(store);

    let notifier = Notifier::new(move |notice: Notice| {
        if notice.level == NoticeLevel::Error {
            log::error!("[STORE] notice: {}", notice.message);
        }
        store_push_notice(&store, notice);
    });
    let ctx = AppContext::new(store, config, notifier);
    provide_context(ctx);

    // Load collections and items when the platform changes
    Effect::new(move |_| {
        let platform = store.platform().get();
        ctx.editing_item.set(None);
        ctx.focused.set(None);
        let planner = ctx.planner(platform);
        spawn_local(async move {
            if planner.load().await {
                log::info!("[APP] {} planner ready", planner.platform().label());
            }
        });
    });

    view! {
        <div class="app-layout">
            <CollectionSidebar />

            <main class="main-content">
                <PlatformTabBar />
                <NoticeBanner />
                <h1>{move || format!("{} planner", store.platform().get().label())}</h1>
                <NewItemForm />
                <PlannerGrid />
                <p class="item-count">
                    {move || {
                        store.items_version().get();
                        store.collections_version().get();
                        let planner = ctx.planner(store.platform().get());
                        let count = planner.current().map(|cid| planner.items().len(&cid)).unwrap_or(0);
                        format!("{} items", count)
                    }}
                </p>
            </main>

            <ItemEditor />
        </div>
    }
}
