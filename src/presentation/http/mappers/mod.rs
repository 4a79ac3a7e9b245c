use crate::{domain::models::Message, presentation::http::responses::MessageDto};

pub fn map_message(message: &Message) -> MessageDto {
    MessageDto {
        id: message.id,
        to: message.to.clone(),
        content: message.content.clone(),
        delivered: message.delivered,
        created_at: message.created_at.to_rfc3339(),
        delivered_at: message.delivered_at.map(|at| at.to_rfc3339()),
        delivery_id: message.delivery_id.clone(),
    }
}
