use rocket::serde::json::Json;
use rocket::{get, routes};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthInfo {
    pub status: &'static str,
    pub version: &'static str,
}

#[get("/health")]
pub fn health() -> Json<HealthInfo> {
    Json(HealthInfo {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn generate_system_routes() -> Vec<rocket::Route> {
    routes![health]
}
