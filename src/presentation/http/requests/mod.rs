use poem_openapi::Object;

#[derive(Object, Debug)]
pub struct SubmitMessageRequestDto {
    #[oai(validator(min_length = 1))]
    pub to: String,
    #[oai(validator(min_length = 1))]
    pub content: String,
}
