use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, payload::Json};

use crate::presentation::http::{
    endpoints::root::{ApiState, EndpointsTags},
    responses::{SchedulerActionDto, SchedulerStatusDto},
};

#[derive(Clone)]
pub struct SchedulerEndpoints {
    state: Arc<ApiState>,
}

impl SchedulerEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl SchedulerEndpoints {
    #[oai(
        path = "/scheduler/start",
        method = "post",
        tag = EndpointsTags::Scheduler,
    )]
    pub async fn start_scheduler(&self) -> PoemResult<Json<SchedulerActionDto>> {
        if self.state.scheduler.start() {
            Ok(Json(SchedulerActionDto {
                status: "message scheduler started".to_string(),
            }))
        } else {
            Err(poem::Error::from_string(
                "message scheduler already running",
                poem::http::StatusCode::CONFLICT,
            ))
        }
    }

    #[oai(
        path = "/scheduler/stop",
        method = "post",
        tag = EndpointsTags::Scheduler,
    )]
    pub async fn stop_scheduler(&self) -> PoemResult<Json<SchedulerActionDto>> {
        if self.state.scheduler.stop() {
            Ok(Json(SchedulerActionDto {
                status: "message scheduler stopped".to_string(),
            }))
        } else {
            Err(poem::Error::from_string(
                "message scheduler already stopped",
                poem::http::StatusCode::CONFLICT,
            ))
        }
    }

    #[oai(
        path = "/scheduler/status",
        method = "get",
        tag = EndpointsTags::Scheduler,
    )]
    pub async fn scheduler_status(&self) -> Json<SchedulerStatusDto> {
        Json(SchedulerStatusDto {
            running: self.state.scheduler.is_running(),
        })
    }
}
