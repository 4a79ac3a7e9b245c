use poem_openapi::Object;

#[derive(Object)]
pub struct MessageDto {
    pub id: i64,
    pub to: String,
    pub content: String,
    pub delivered: bool,
    pub created_at: String,
    pub delivered_at: Option<String>,
    pub delivery_id: Option<String>,
}

#[derive(Object)]
pub struct SubmitMessageResponseDto {
    pub message_id: i64,
}

#[derive(Object)]
pub struct SchedulerActionDto {
    pub status: String,
}

#[derive(Object)]
pub struct SchedulerStatusDto {
    pub running: bool,
}
