//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::Trace;
use crate::domain::ports::{
    MockDirectDirectoryCommand, MockDirectoryQuery, MockQueuedDirectoryCommand,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;

/// Port doubles for one handler test. Unconfigured mocks panic when called.
#[derive(Default)]
pub struct TestPorts {
    pub queued: MockQueuedDirectoryCommand,
    pub direct: MockDirectDirectoryCommand,
    pub query: MockDirectoryQuery,
}

/// Build the `/api/v1` application around the supplied doubles, with the
/// trace middleware installed.
pub fn test_app(
    ports: TestPorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(
        Arc::new(ports.queued),
        Arc::new(ports.direct),
        Arc::new(ports.query),
    );
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api))
}
