#[macro_use]
extern crate rocket;

pub mod api;
pub mod bootstrap;
pub mod common;
pub mod config;
pub mod models;
pub mod observe;
pub mod pipeline;
pub mod utils;

use crate::api::AppState;
use crate::api::handlers::media::generate_media_routes;
use crate::api::handlers::system::generate_system_routes;

pub fn build_rocket() -> rocket::Rocket<rocket::Build> {
    rocket::build()
        .manage(AppState::new())
        .mount("/", generate_media_routes())
        .mount("/", generate_system_routes())
}
