use crate::{AppError, AppResult};
use chrono::FixedOffset;
use error_stack::{Report, ResultExt};
use locimo_core::auth::AuthUser;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DB_NAME: &str = "locimo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Mongo { url: String, db_name: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub store: StoreKind,
    pub metrics_enabled: bool,
    pub calendar_zone: FixedOffset,
    /// Who the session resolves to at startup. `None` means nobody is signed in.
    pub operator: Option<AuthUser>,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let port = parse_or(&var, "LOCIMO_PORT", DEFAULT_PORT)?;

        let store = match var("LOCIMO_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("memory") => StoreKind::Memory,
            Some("mongodb") => StoreKind::Mongo {
                url: var("DATABASE_URL")
                    .ok_or_else(|| Report::new(AppError))
                    .attach("DATABASE_URL is missing, it is required when LOCIMO_STORE=mongodb")?,
                db_name: var("LOCIMO_DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            },
            Some(other) => {
                return Err(Report::new(AppError)
                    .attach(format!("LOCIMO_STORE '{other}' is not one of memory, mongodb")));
            }
        };

        let metrics_enabled = parse_or(&var, "LOCIMO_METRICS", true)?;

        let calendar_zone = match var("LOCIMO_CALENDAR_OFFSET") {
            Some(offset) => FixedOffset::from_str(offset.trim())
                .change_context(AppError)
                .attach_with(|| format!("LOCIMO_CALENDAR_OFFSET '{offset}' is not an offset like +01:00"))?,
            None => locimo_core::calendar::utc(),
        };

        let operator = var("LOCIMO_OPERATOR_ID")
            .filter(|id| !id.trim().is_empty())
            .map(|id| AuthUser {
                id,
                display_name: var("LOCIMO_OPERATOR_NAME"),
                email: var("LOCIMO_OPERATOR_EMAIL"),
                photo_url: var("LOCIMO_OPERATOR_PHOTO"),
            });

        Ok(Self {
            port,
            store,
            metrics_enabled,
            calendar_zone,
            operator,
        })
    }
}

fn parse_or<T>(var: impl Fn(&str) -> Option<String>, name: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .change_context(AppError)
            .attach_with(|| format!("{name} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
