use std::env::var;

use dotenvy::dotenv;

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub webhook_url: String,
    pub webhook_auth_key: String,
    pub max_content_length: usize,
}

impl Config {
    pub fn try_parse() -> Result<Config, &'static str> {
        let _ = dotenv();

        Ok(Config {
            port: var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .map_err(|_| "An error occured while parsing PORT env param")?,
            database_url: var("DATABASE_URL")
                .map_err(|_| "An error occured while getting DATABASE_URL env param")?,
            redis_url: var("REDIS_URL")
                .map_err(|_| "An error occured while getting REDIS_URL env param")?,
            webhook_url: var("WEBHOOK_URL")
                .map_err(|_| "An error occured while getting WEBHOOK_URL env param")?,
            webhook_auth_key: var("WEBHOOK_AUTH_KEY")
                .map_err(|_| "An error occured while getting WEBHOOK_AUTH_KEY env param")?,
            max_content_length: var("MAX_CONTENT_LENGTH")
                .unwrap_or_else(|_| "160".to_string())
                .parse::<usize>()
                .map_err(|_| "An error occured while parsing MAX_CONTENT_LENGTH env param")?,
        })
    }
}
