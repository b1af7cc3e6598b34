//! Contact-signal detection and new-account moderation for community posts.
//!
//! - [`contact`] finds and masks phone numbers, emails, messenger links and
//!   KakaoTalk IDs.
//! - [`keyword`] matches the operator's forbidden keyword list.
//! - [`safety`] blocks or masks contact details depending on account age and role.
//! - [`write_policy`] gates restricted post types for new accounts.
//! - [`gate`] chains the above for a single submission.
//!
//! Every evaluator is a pure function of its inputs.

pub mod contact;
pub mod gate;
pub mod keyword;
pub mod safety;
pub mod write_policy;

pub use contact::{
    detect_contact_signals, find_contact_signals, mask_contact_signals, ContactSignalMatch,
    ContactSignalType,
};
pub use gate::{Author, ContentGate, ContentPolicy, ContentSubmission, PolicyError, ScreenedContent};
pub use keyword::{
    find_matched_forbidden_keywords, normalize_forbidden_keywords, KeywordList, NormalizeOptions,
};
pub use safety::{
    contact_restriction_remaining_hours, moderate_contact_content, ContactModerationRequest,
    ModerationDecision,
};
pub use write_policy::{
    evaluate_new_user_post_write_policy, evaluate_with_config, PostWriteRequest,
    WritePolicyDecision,
};
