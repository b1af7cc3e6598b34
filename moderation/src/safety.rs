//! New-account contact restriction: block contact details outright while an
//! account is young, mask them afterwards.

use crate::contact::{detect_contact_signals, mask_contact_signals, ContactSignalType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use townpet_core::config::{DEFAULT_CONTACT_BLOCK_WINDOW_HOURS, MAX_POLICY_HOURS};
use townpet_core::model::UserRole;
use tracing::debug;

const MS_PER_HOUR: i64 = 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationDecision {
    pub blocked: bool,
    pub signals: Vec<ContactSignalType>,
    /// Masked text when allowed; the untouched input when blocked.
    pub sanitized_text: String,
    pub message: Option<String>,
}

impl ModerationDecision {
    fn clean(text: &str) -> Self {
        Self {
            blocked: false,
            signals: Vec::new(),
            sanitized_text: text.to_string(),
            message: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContactModerationRequest<'a> {
    pub text: &'a str,
    pub role: UserRole,
    pub account_created_at: DateTime<Utc>,
    /// Defaults to the current time.
    pub now: Option<DateTime<Utc>>,
    /// Defaults to [`DEFAULT_CONTACT_BLOCK_WINDOW_HOURS`].
    pub block_window_hours: Option<u32>,
}

impl<'a> ContactModerationRequest<'a> {
    pub fn new(text: &'a str, role: UserRole, account_created_at: DateTime<Utc>) -> Self {
        Self {
            text,
            role,
            account_created_at,
            now: None,
            block_window_hours: None,
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_block_window_hours(mut self, hours: u32) -> Self {
        self.block_window_hours = Some(hours);
        self
    }
}

pub fn contact_block_message(window_hours: u32) -> String {
    format!(
        "가입 후 {window_hours}시간 동안은 연락처(전화번호, 이메일, 메신저 ID/링크)를 게시할 수 없습니다."
    )
}

/// Milliseconds between account creation and `now`; negative for future timestamps.
pub(crate) fn account_age_ms(account_created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(account_created_at).num_milliseconds()
}

/// Whole hours left before an account of age `age_ms` clears `threshold_hours`.
///
/// Rounds up and never reports 0 while the restriction still applies.
pub fn remaining_restriction_hours(age_ms: i64, threshold_hours: u32) -> u32 {
    let remaining_ms = i64::from(threshold_hours)
        .saturating_mul(MS_PER_HOUR)
        .saturating_sub(age_ms);
    if remaining_ms <= 0 {
        return 0;
    }

    let hours = remaining_ms.div_euclid(MS_PER_HOUR) + i64::from(remaining_ms % MS_PER_HOUR != 0);
    u32::try_from(hours.max(1)).unwrap_or(u32::MAX)
}

fn is_contact_restricted(role: UserRole, age_ms: i64, window_hours: u32) -> bool {
    role.is_base() && age_ms < i64::from(window_hours) * MS_PER_HOUR
}

/// Hours until a base-role account may share contact details. `0` once allowed.
pub fn contact_restriction_remaining_hours(
    role: UserRole,
    account_created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    window_hours: u32,
) -> u32 {
    let window_hours = window_hours.min(MAX_POLICY_HOURS);
    let age_ms = account_age_ms(account_created_at, now);
    if !is_contact_restricted(role, age_ms, window_hours) {
        return 0;
    }
    remaining_restriction_hours(age_ms, window_hours)
}

/// Decides whether contact details in `request.text` are blocked or masked.
///
/// Only base-role accounts younger than the block window are blocked; every
/// other author gets the text back with its contact signals masked.
pub fn moderate_contact_content(request: &ContactModerationRequest<'_>) -> ModerationDecision {
    let signals = detect_contact_signals(request.text);
    if signals.is_empty() {
        return ModerationDecision::clean(request.text);
    }

    let now = request.now.unwrap_or_else(Utc::now);
    let window_hours = request
        .block_window_hours
        .unwrap_or(DEFAULT_CONTACT_BLOCK_WINDOW_HOURS)
        .min(MAX_POLICY_HOURS);
    let age_ms = account_age_ms(request.account_created_at, now);

    if is_contact_restricted(request.role, age_ms, window_hours) {
        debug!(
            role = %request.role,
            signals = ?signals,
            window_hours,
            "blocking contact details from new account"
        );
        return ModerationDecision {
            blocked: true,
            signals,
            sanitized_text: request.text.to_string(),
            message: Some(contact_block_message(window_hours)),
        };
    }

    debug!(role = %request.role, signals = ?signals, "masking contact details");
    ModerationDecision {
        blocked: false,
        sanitized_text: mask_contact_signals(request.text),
        signals,
        message: None,
    }
}
