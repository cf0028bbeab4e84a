use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tagsweep_application::RunScope;
use tagsweep_core::{AppError, AppResult, TenantId};
use tagsweep_domain::{
    CaseSensitivity, DEFAULT_DATE_FORMAT, DEFAULT_DELETE_BY_TAG_KEY, DEFAULT_TARGET_TAG_KEY,
    DEFAULT_TARGET_TAG_VALUE, DateFormat, ExecutionMode, RetirementPolicy, TagRule,
};
use tracing::{error, warn};

const DEFAULT_ARM_BASE_URL: &str = "https://management.azure.com";
const DEFAULT_ARM_API_VERSION: &str = "2021-04-01";

#[derive(Clone)]
pub struct DeleteEndpointConfig {
    pub base_url: String,
    pub access_token: String,
    pub api_version: String,
    pub max_attempts: u8,
    pub retry_backoff_ms: u64,
}

#[derive(Clone)]
pub struct WorkerConfig {
    pub tenant_id: TenantId,
    pub scope: RunScope,
    pub policy: RetirementPolicy,
    pub inventory_path: PathBuf,
    pub run_interval: Option<Duration>,
    pub delete_endpoint: Option<DeleteEndpointConfig>,
}

impl WorkerConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Tag text and date patterns are used verbatim; everything else is trimmed.
        let raw = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let tenant_id = TenantId::parse(required(&read, "TENANT_ID")?.as_str())?;

        let mut scope = RunScope::new(
            split_list(read("SUBSCRIPTION_IDS")),
            split_list(read("RESOURCE_GROUP_NAMES")),
        );
        if parse_bool(&read, "REQUIRE_SUBSCRIPTION_IDS")?.unwrap_or(false) {
            scope = scope.requiring_subscription_ids();
        }
        scope.validate()?;

        let case_sensitive = match parse_bool(&read, "CASE_SENSITIVE_TAGS") {
            Ok(value) => value.unwrap_or(false),
            Err(parse_error) => {
                error!(
                    error = %parse_error,
                    "unable to parse CASE_SENSITIVE_TAGS, using case-insensitive tags"
                );
                false
            }
        };
        let tag_rule = TagRule::new(
            raw("TARGET_TAG_KEY").unwrap_or_else(|| DEFAULT_TARGET_TAG_KEY.to_owned()),
            raw("TARGET_TAG_VALUE").unwrap_or_else(|| DEFAULT_TARGET_TAG_VALUE.to_owned()),
            CaseSensitivity::from_flag(case_sensitive),
        )?;

        let date_format = DateFormat::new(
            raw("DATE_TIME_FORMAT").unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_owned()),
        )?;

        let mode = match read("EXECUTION_MODE") {
            None => ExecutionMode::Audit,
            Some(value) => ExecutionMode::from_str(value.as_str()).unwrap_or_else(|parse_error| {
                warn!(
                    error = %parse_error,
                    "unable to parse EXECUTION_MODE, using audit mode"
                );
                ExecutionMode::Audit
            }),
        };

        let policy = RetirementPolicy::new(
            tag_rule,
            raw("DELETE_BY_TAG_KEY").unwrap_or_else(|| DEFAULT_DELETE_BY_TAG_KEY.to_owned()),
            date_format,
            mode,
        )?;

        let inventory_path = PathBuf::from(required(&read, "INVENTORY_PATH")?);

        let run_interval = match parse_number::<u64>(&read, "RUN_INTERVAL_SECONDS")? {
            Some(0) => {
                return Err(AppError::Validation(
                    "RUN_INTERVAL_SECONDS must be greater than zero".to_owned(),
                ));
            }
            Some(seconds) => Some(Duration::from_secs(seconds)),
            None => None,
        };

        let delete_endpoint = if mode == ExecutionMode::Delete {
            Some(DeleteEndpointConfig {
                base_url: read("ARM_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_ARM_BASE_URL.to_owned())
                    .trim_end_matches('/')
                    .to_owned(),
                access_token: required(&read, "ARM_ACCESS_TOKEN")?,
                api_version: read("ARM_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_ARM_API_VERSION.to_owned()),
                max_attempts: parse_number::<u8>(&read, "DELETE_MAX_ATTEMPTS")?.unwrap_or(3),
                retry_backoff_ms: parse_number::<u64>(&read, "DELETE_RETRY_BACKOFF_MS")?
                    .unwrap_or(500),
            })
        } else {
            None
        };

        Ok(Self {
            tenant_id,
            scope,
            policy,
            inventory_path,
            run_interval,
            delete_endpoint,
        })
    }
}

fn required<R>(read: &R, name: &str) -> AppResult<String>
where
    R: Fn(&str) -> Option<String>,
{
    read(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|value| value.split(',').map(str::to_owned).collect())
        .unwrap_or_default()
}

fn parse_bool<R>(read: &R, name: &str) -> AppResult<Option<bool>>
where
    R: Fn(&str) -> Option<String>,
{
    match read(name) {
        None => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(value) => Err(AppError::Validation(format!(
            "invalid {name} value '{value}': expected true or false"
        ))),
    }
}

fn parse_number<T>(read: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    read(name)
        .map(|value| {
            value.parse::<T>().map_err(|error| {
                AppError::Validation(format!("invalid {name} value '{value}': {error}"))
            })
        })
        .transpose()
}
