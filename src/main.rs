#![allow(warnings)]
//! Planner Grid Frontend Entry Point

mod models;
mod config;
mod error;
mod logging;
mod notice;
mod ordered;
mod commands;
mod sync;
mod debounce;
mod directory;
mod planner;
mod prefs;
mod context;
mod store;
mod components;
mod app;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    logging::init(config::LOG_LEVEL);
    mount_to_body(App);
}
