//! UI Components
//!
//! Reusable Leptos components.

mod collection_sidebar;
mod delete_confirm_button;
mod item_editor;
mod new_item_form;
mod notice_banner;
mod planner_grid;
mod platform_tab_bar;
mod status_selector;

pub use collection_sidebar::CollectionSidebar;
pub use delete_confirm_button::DeleteConfirmButton;
pub use item_editor::ItemEditor;
pub use new_item_form::NewItemForm;
pub use notice_banner::NoticeBanner;
pub use planner_grid::PlannerGrid;
pub use platform_tab_bar::PlatformTabBar;
pub use status_selector::StatusSelector;
