use crate::model::PostType;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::env;
use std::path::Path;

/// Upper bound for every hour-based policy knob (30 days).
pub const MAX_POLICY_HOURS: u32 = 720;
pub const DEFAULT_MIN_ACCOUNT_AGE_HOURS: u32 = 24;
pub const DEFAULT_CONTACT_BLOCK_WINDOW_HOURS: u32 = 24;
pub const DEFAULT_RESTRICTED_POST_TYPES: [PostType; 3] = [
    PostType::MarketListing,
    PostType::LostFound,
    PostType::Meetup,
];

/// Age-window policy shared by the contact and post-type evaluators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    pub min_account_age_hours: u32,
    pub restricted_post_types: BTreeSet<PostType>,
    pub contact_block_window_hours: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_account_age_hours: DEFAULT_MIN_ACCOUNT_AGE_HOURS,
            restricted_post_types: DEFAULT_RESTRICTED_POST_TYPES.into_iter().collect(),
            contact_block_window_hours: DEFAULT_CONTACT_BLOCK_WINDOW_HOURS,
        }
    }
}

impl PolicyConfig {
    /// Builds a config from an operator-supplied settings document.
    ///
    /// Never fails: invalid numbers fall back to the defaults, hours are
    /// clamped to `[0, MAX_POLICY_HOURS]`, and unknown post types are dropped.
    /// Keys may be snake_case or camelCase.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();

        let min_account_age_hours = normalize_hours(
            field(value, "min_account_age_hours", "minAccountAgeHours"),
            defaults.min_account_age_hours,
        );
        let contact_block_window_hours = normalize_hours(
            field(value, "contact_block_window_hours", "contactBlockWindowHours"),
            defaults.contact_block_window_hours,
        );
        let restricted_post_types = normalize_post_types(
            field(value, "restricted_post_types", "restrictedPostTypes"),
            &defaults.restricted_post_types,
        );

        Self {
            min_account_age_hours,
            restricted_post_types,
            contact_block_window_hours,
        }
    }

    pub fn with_min_account_age_hours(mut self, hours: u32) -> Self {
        self.min_account_age_hours = hours.min(MAX_POLICY_HOURS);
        self
    }

    pub fn with_contact_block_window_hours(mut self, hours: u32) -> Self {
        self.contact_block_window_hours = hours.min(MAX_POLICY_HOURS);
        self
    }

    pub fn with_restricted_post_types<I>(mut self, post_types: I) -> Self
    where
        I: IntoIterator<Item = PostType>,
    {
        self.restricted_post_types = post_types.into_iter().collect();
        self
    }

    pub fn is_restricted(&self, post_type: PostType) -> bool {
        self.restricted_post_types.contains(&post_type)
    }
}

fn field<'a>(value: &'a Value, snake: &str, camel: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    object.get(snake).or_else(|| object.get(camel))
}

/// Coerces a JSON number or numeric string into whole hours.
pub fn normalize_hours(value: Option<&Value>, fallback: u32) -> u32 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed.filter(|hours| hours.is_finite()) {
        Some(hours) => hours.floor().clamp(0.0, MAX_POLICY_HOURS as f64) as u32,
        None => {
            if value.is_some_and(|value| !value.is_null()) {
                tracing::warn!(fallback, "ignoring non-numeric policy hours value");
            }
            fallback.min(MAX_POLICY_HOURS)
        }
    }
}

/// Accepts a list of post type names or a comma-separated string.
pub fn normalize_post_types(
    value: Option<&Value>,
    fallback: &BTreeSet<PostType>,
) -> BTreeSet<PostType> {
    let names: Vec<&str> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(raw)) => raw.split(',').collect(),
        _ => return fallback.clone(),
    };

    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| name.parse::<PostType>().ok())
        .collect()
}

#[derive(Debug, Deserialize, Default)]
struct RawAppConfig {
    #[serde(default)]
    policy: Value,
    #[serde(default)]
    forbidden_keywords: Value,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub policy: PolicyConfig,
    /// Unvalidated keyword list; normalized by the keyword matcher.
    pub forbidden_keywords: Value,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join(run_mode)).required(false))
            .add_source(
                Environment::with_prefix("TOWNPET")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let raw: RawAppConfig = builder.build()?.try_deserialize()?;
        Ok(Self {
            policy: PolicyConfig::from_value(&raw.policy),
            forbidden_keywords: raw.forbidden_keywords,
        })
    }
}
