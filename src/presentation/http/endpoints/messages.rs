use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, payload::Json};

use crate::{
    application::usecases::submit_message::SubmitMessageRequest,
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags},
        mappers::map_message,
        requests::SubmitMessageRequestDto,
        responses::{MessageDto, SubmitMessageResponseDto},
    },
};

#[derive(Clone)]
pub struct MessagesEndpoints {
    state: Arc<ApiState>,
}

impl MessagesEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl MessagesEndpoints {
    #[oai(
        path = "/messages",
        method = "post",
        tag = EndpointsTags::Messages,
    )]
    pub async fn submit_message(
        &self,
        request: Json<SubmitMessageRequestDto>,
    ) -> PoemResult<Json<SubmitMessageResponseDto>> {
        let message = self
            .state
            .submit_message_usecase
            .execute(SubmitMessageRequest {
                to: request.to.clone(),
                content: request.content.clone(),
            })
            .await
            .map_err(bad_request)?;

        Ok(Json(SubmitMessageResponseDto {
            message_id: message.id,
        }))
    }

    #[oai(
        path = "/messages",
        method = "get",
        tag = EndpointsTags::Messages,
    )]
    pub async fn list_delivered_messages(&self) -> PoemResult<Json<Vec<MessageDto>>> {
        let messages = self
            .state
            .list_delivered_usecase
            .execute()
            .await
            .map_err(internal_error)?;

        Ok(Json(messages.iter().map(map_message).collect()))
    }
}

fn internal_error(err: anyhow::Error) -> poem::Error {
    poem::Error::from_string(
        err.to_string(),
        poem::http::StatusCode::INTERNAL_SERVER_ERROR,
    )
}

fn bad_request(err: anyhow::Error) -> poem::Error {
    poem::Error::from_string(err.to_string(), poem::http::StatusCode::BAD_REQUEST)
}
