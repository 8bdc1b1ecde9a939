use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Apply the Luhn checksum on top of the card length check.
    pub card_luhn_check: bool,
    pub allow_past_visit_dates: bool,
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "hubdesk.db".to_string()),
            card_luhn_check: env_flag("CARD_LUHN_CHECK", true),
            allow_past_visit_dates: env_flag("ALLOW_PAST_VISIT_DATES", false),
        }
    }
}
