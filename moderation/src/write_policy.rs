//! Restricted post types (marketplace, lost/found, meetups) for new accounts.

use crate::safety::{account_age_ms, remaining_restriction_hours};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use townpet_core::config::{PolicyConfig, MAX_POLICY_HOURS};
use townpet_core::model::{PostType, UserRole};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WritePolicyDecision {
    pub allowed: bool,
    /// `0` when allowed, at least `1` otherwise.
    pub remaining_hours: u32,
    pub message: Option<String>,
}

impl WritePolicyDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            remaining_hours: 0,
            message: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostWriteRequest {
    pub role: UserRole,
    pub account_created_at: DateTime<Utc>,
    pub post_type: PostType,
    pub now: Option<DateTime<Utc>>,
    pub min_account_age_hours: Option<u32>,
    pub restricted_types: Option<BTreeSet<PostType>>,
}

impl PostWriteRequest {
    pub fn new(role: UserRole, account_created_at: DateTime<Utc>, post_type: PostType) -> Self {
        Self {
            role,
            account_created_at,
            post_type,
            now: None,
            min_account_age_hours: None,
            restricted_types: None,
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_min_account_age_hours(mut self, hours: u32) -> Self {
        self.min_account_age_hours = Some(hours);
        self
    }

    pub fn with_restricted_types<I>(mut self, post_types: I) -> Self
    where
        I: IntoIterator<Item = PostType>,
    {
        self.restricted_types = Some(post_types.into_iter().collect());
        self
    }
}

pub fn post_write_block_message(
    post_type: PostType,
    threshold_hours: u32,
    remaining_hours: u32,
) -> String {
    format!(
        "{} 글은 가입 후 {threshold_hours}시간이 지나야 작성할 수 있습니다. 약 {remaining_hours}시간 후 다시 시도해 주세요.",
        post_type.label()
    )
}

/// Evaluates the request against the built-in defaults.
pub fn evaluate_new_user_post_write_policy(request: &PostWriteRequest) -> WritePolicyDecision {
    evaluate_with_config(request, &PolicyConfig::default())
}

/// Evaluates the request, taking any override it leaves unset from `config`.
pub fn evaluate_with_config(
    request: &PostWriteRequest,
    config: &PolicyConfig,
) -> WritePolicyDecision {
    if !request.role.is_base() {
        return WritePolicyDecision::allowed();
    }

    let restricted = request
        .restricted_types
        .as_ref()
        .unwrap_or(&config.restricted_post_types);
    if !restricted.contains(&request.post_type) {
        return WritePolicyDecision::allowed();
    }

    let threshold_hours = request
        .min_account_age_hours
        .unwrap_or(config.min_account_age_hours)
        .min(MAX_POLICY_HOURS);
    let now = request.now.unwrap_or_else(Utc::now);
    let age_ms = account_age_ms(request.account_created_at, now);
    let remaining_hours = remaining_restriction_hours(age_ms, threshold_hours);
    if remaining_hours == 0 {
        return WritePolicyDecision::allowed();
    }

    debug!(
        post_type = %request.post_type,
        threshold_hours,
        remaining_hours,
        "restricting post type for new account"
    );
    WritePolicyDecision {
        allowed: false,
        remaining_hours,
        message: Some(post_write_block_message(
            request.post_type,
            threshold_hours,
            remaining_hours,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn account_exactly_at_threshold_is_allowed() {
        let now = Utc::now();
        let request = PostWriteRequest::new(
            UserRole::User,
            now - Duration::hours(24),
            PostType::LostFound,
        )
        .with_now(now);
        assert_eq!(
            evaluate_new_user_post_write_policy(&request),
            WritePolicyDecision::allowed()
        );
    }

    #[test]
    fn last_minute_still_reports_one_hour() {
        let now = Utc::now();
        let request = PostWriteRequest::new(
            UserRole::User,
            now - Duration::hours(24) + Duration::minutes(1),
            PostType::Meetup,
        )
        .with_now(now);
        let decision = evaluate_new_user_post_write_policy(&request);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining_hours, 1);
    }

    #[test]
    fn config_supplies_unset_overrides() {
        let now = Utc::now();
        let config = PolicyConfig::default()
            .with_min_account_age_hours(72)
            .with_restricted_post_types([PostType::AdoptionListing]);
        let request = PostWriteRequest::new(
            UserRole::User,
            now - Duration::hours(48),
            PostType::AdoptionListing,
        )
        .with_now(now);

        let decision = evaluate_with_config(&request, &config);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining_hours, 24);
        assert!(decision.message.unwrap().contains("입양 공고"));

        let market =
            PostWriteRequest::new(UserRole::User, now, PostType::MarketListing).with_now(now);
        assert!(evaluate_with_config(&market, &config).allowed);
    }
}
