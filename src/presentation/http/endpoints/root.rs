use std::sync::Arc;

use poem_openapi::Tags;

use crate::application::{
    services::scheduler::Scheduler,
    usecases::{
        list_delivered::ListDeliveredMessagesUseCase, submit_message::SubmitMessageUseCase,
    },
};

#[derive(Clone)]
pub struct ApiState {
    pub scheduler: Arc<Scheduler>,
    pub submit_message_usecase: Arc<SubmitMessageUseCase>,
    pub list_delivered_usecase: Arc<ListDeliveredMessagesUseCase>,
}

pub struct Endpoints;

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Scheduler,
    Messages,
}
