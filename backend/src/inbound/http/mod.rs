//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod organizations;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::{ApiResult, json_config};

/// Register the directory routes on a `/api/v1` scope.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use roster::inbound::http::configure_api;
///
/// let _app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(organizations::create_organization)
        .service(organizations::update_organization)
        .service(organizations::list_organizations)
        .service(organizations::queue_create_organization)
        .service(organizations::queue_update_organization)
        .service(users::create_user)
        .service(users::update_user)
        .service(users::list_organization_users)
        .service(users::list_users)
        .service(users::queue_create_user)
        .service(users::queue_update_user);
}
