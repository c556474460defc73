//! Notice Banner Component
//!
//! Dismissible notices for failed writes, plus the blocking message shown
//! when an operation is refused outright.

use leptos::prelude::*;

use crate::notice::NoticeLevel;
use crate::store::{store_dismiss_notice, use_app_store, AppStateStoreFields};

#[component]
pub fn NoticeBanner() -> impl IntoView {
    let store = use_app_store();

    view! {
        <div class="notice-stack">
            <For
                each=move || store.notices().get()
                key=|notice| notice.id
                children=move |notice| {
                    let id = notice.id;
                    let class = match notice.level {
                        NoticeLevel::Warning => "notice notice-warning",
                        NoticeLevel::Error => "notice notice-error",
                    };
                    view! {
                        <div class=class>
                            <span class="notice-message">{notice.message}</span>
                            <button class="close-btn" on:click=move |_| store_dismiss_notice(&store, id)>"×"</button>
                        </div>
                    }
                }
            />
        </div>

        {move || store.blocking_message().get().map(|message| view! {
            <div class="modal-backdrop">
                <div class="modal blocking-message">
                    <p>{message}</p>
                    <button on:click=move |_| {
                        *store.blocking_message().write() = None;
                    }>"OK"</button>
                </div>
            </div>
        })}
    }
}
