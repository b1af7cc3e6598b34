use crate::contact::ContactSignalType;
use crate::keyword::{KeywordList, NormalizeOptions};
use crate::safety::{moderate_contact_content, ContactModerationRequest};
use crate::write_policy::{evaluate_with_config, PostWriteRequest};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use townpet_core::audit::{AuditEvent, AuditOperation, AuditOutcome, AuditSink};
use townpet_core::config::{AppConfig, PolicyConfig};
use townpet_core::error::{ErrorCode, TownpetError};
use townpet_core::model::{PostType, UserRole};
use tracing::{debug, warn};

/// A rejection the author can fix. Display text is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("금지된 단어가 포함되어 있습니다: {}", .keywords.join(", "))]
    ForbiddenKeyword { keywords: Vec<String> },
    #[error("{message}")]
    ContactRestricted {
        signals: Vec<ContactSignalType>,
        message: String,
    },
    #[error("{message}")]
    PostTypeRestricted {
        post_type: PostType,
        remaining_hours: u32,
        message: String,
    },
}

impl TownpetError for PolicyError {
    fn error_code(&self) -> ErrorCode {
        match self {
            PolicyError::ForbiddenKeyword { .. } => ErrorCode::InvalidArgument,
            PolicyError::ContactRestricted { .. } | PolicyError::PostTypeRestricted { .. } => {
                ErrorCode::PermissionDenied
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Author {
    pub role: UserRole,
    pub account_created_at: DateTime<Utc>,
}

impl Author {
    pub fn new(role: UserRole, account_created_at: DateTime<Utc>) -> Self {
        Self {
            role,
            account_created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentSubmission<'a> {
    pub text: &'a str,
    pub author: Author,
    pub now: Option<DateTime<Utc>>,
}

impl<'a> ContentSubmission<'a> {
    pub fn new(text: &'a str, author: Author) -> Self {
        Self {
            text,
            author,
            now: None,
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

/// Text that passed screening, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenedContent {
    pub text: String,
    pub signals: Vec<ContactSignalType>,
}

impl ScreenedContent {
    pub fn was_masked(&self) -> bool {
        !self.signals.is_empty()
    }
}

pub trait ContentPolicy: Send + Sync {
    fn screen(&self, submission: &ContentSubmission<'_>) -> Result<ScreenedContent, PolicyError>;
}

/// Runs the keyword screen and contact moderation for post and comment bodies,
/// and the post-type gate for new posts.
pub struct ContentGate {
    config: PolicyConfig,
    keywords: KeywordList,
    audit_sink: Option<Arc<dyn AuditSink>>,
}

impl ContentGate {
    pub fn new(config: PolicyConfig, keywords: KeywordList) -> Self {
        Self {
            config,
            keywords,
            audit_sink: None,
        }
    }

    pub fn from_app_config(app: &AppConfig) -> Self {
        let keywords =
            KeywordList::from_value(&app.forbidden_keywords, &[], NormalizeOptions::allow_empty());
        Self::new(app.policy.clone(), keywords)
    }

    pub fn set_audit_sink(&mut self, sink: Arc<dyn AuditSink>) {
        self.audit_sink = Some(sink);
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn keywords(&self) -> &KeywordList {
        &self.keywords
    }

    fn record(&self, event: AuditEvent) {
        let Some(sink) = &self.audit_sink else {
            return;
        };
        if let Err(err) = sink.record(event) {
            warn!(
                error = %err,
                code = %err.error_code(),
                "failed to record moderation audit event"
            );
        }
    }

    pub fn screen(
        &self,
        submission: &ContentSubmission<'_>,
    ) -> Result<ScreenedContent, PolicyError> {
        let role = submission.author.role;

        let matched = self.keywords.find_matches(submission.text);
        if !matched.is_empty() {
            debug!(%role, matched = matched.len(), "rejecting forbidden keywords");
            self.record(
                AuditEvent::new(AuditOperation::KeywordScreen, AuditOutcome::Blocked, role)
                    .with_matched_keywords(matched.iter().cloned()),
            );
            return Err(PolicyError::ForbiddenKeyword { keywords: matched });
        }

        let mut request = ContactModerationRequest::new(
            submission.text,
            role,
            submission.author.account_created_at,
        )
        .with_block_window_hours(self.config.contact_block_window_hours);
        request.now = submission.now;

        let decision = moderate_contact_content(&request);
        let signal_names = decision.signals.iter().map(|signal| signal.as_str());

        if decision.blocked {
            self.record(
                AuditEvent::new(AuditOperation::ContactModeration, AuditOutcome::Blocked, role)
                    .with_signals(signal_names),
            );
            return Err(PolicyError::ContactRestricted {
                signals: decision.signals,
                message: decision.message.unwrap_or_default(),
            });
        }

        let outcome = if decision.signals.is_empty() {
            AuditOutcome::Allowed
        } else {
            AuditOutcome::Masked
        };
        self.record(
            AuditEvent::new(AuditOperation::ContactModeration, outcome, role)
                .with_signals(signal_names),
        );

        Ok(ScreenedContent {
            text: decision.sanitized_text,
            signals: decision.signals,
        })
    }

    pub fn authorize_post_type(
        &self,
        author: Author,
        post_type: PostType,
        now: Option<DateTime<Utc>>,
    ) -> Result<(), PolicyError> {
        let mut request = PostWriteRequest::new(author.role, author.account_created_at, post_type);
        request.now = now;

        let decision = evaluate_with_config(&request, &self.config);
        let outcome = if decision.allowed {
            AuditOutcome::Allowed
        } else {
            AuditOutcome::Blocked
        };
        self.record(
            AuditEvent::new(AuditOperation::PostWrite, outcome, author.role)
                .with_post_type(post_type)
                .with_metadata("remaining_hours", decision.remaining_hours.to_string()),
        );

        if decision.allowed {
            return Ok(());
        }
        Err(PolicyError::PostTypeRestricted {
            post_type,
            remaining_hours: decision.remaining_hours,
            message: decision.message.unwrap_or_default(),
        })
    }
}

impl ContentPolicy for ContentGate {
    fn screen(&self, submission: &ContentSubmission<'_>) -> Result<ScreenedContent, PolicyError> {
        ContentGate::screen(self, submission)
    }
}
