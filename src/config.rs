use crate::error::{LedgerError, Result};
use crate::models::NameMatch;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MAIL_FROM: &str = "alumconnect@localhost";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub name_match: NameMatch,
    pub mail_from: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| {
            LedgerError::Config("DATABASE_URL must be set to a Postgres instance".to_string())
        })?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                LedgerError::Config(format!("DATABASE_MAX_CONNECTIONS is not a number: {raw}"))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let name_match = match lookup("NAME_MATCH") {
            Some(raw) => raw
                .parse()
                .map_err(|err| LedgerError::Config(format!("NAME_MATCH: {err}")))?,
            None => NameMatch::default(),
        };

        let mail_from = lookup("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string());

        Ok(Self {
            database_url,
            max_connections,
            name_match,
            mail_from,
        })
    }
}
