//! Contact-signal detection and masking.
//!
//! Every signal category owns one compiled pattern (see [`contact_pattern`]).
//! Detection and masking both walk the same pattern table, so anything the
//! detector reports is also rewritten by the masker.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;

pub const EMAIL_PLACEHOLDER: &str = "[이메일 비공개]";
pub const PHONE_PLACEHOLDER: &str = "[연락처 비공개]";
pub const OPEN_KAKAO_PLACEHOLDER: &str = "[오픈채팅 링크 비공개]";
pub const MESSENGER_LINK_PLACEHOLDER: &str = "[메신저 링크 비공개]";
const DEFAULT_KAKAO_ID_LABEL: &str = "아이디";
const MIN_PHONE_DIGITS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactSignalType {
    Email,
    Phone,
    OpenKakao,
    MessengerLink,
    KakaoId,
}

impl ContactSignalType {
    /// Detection and masking order.
    pub const ALL: [ContactSignalType; 5] = [
        ContactSignalType::Email,
        ContactSignalType::Phone,
        ContactSignalType::OpenKakao,
        ContactSignalType::MessengerLink,
        ContactSignalType::KakaoId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContactSignalType::Email => "email",
            ContactSignalType::Phone => "phone",
            ContactSignalType::OpenKakao => "open_kakao",
            ContactSignalType::MessengerLink => "messenger_link",
            ContactSignalType::KakaoId => "kakao_id",
        }
    }
}

impl std::fmt::Display for ContactSignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_.%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}")
        .expect("email pattern compiles")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:01[016789]|02|0[3-9][0-9])[-. ]?[0-9]{3,4}[-. ]?[0-9]{4}")
        .expect("phone pattern compiles")
});

static OPEN_KAKAO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://open\.kakao\.com/[A-Za-z0-9._~/?#@!$&=+%:-]*")
        .expect("open kakao pattern compiles")
});

static MESSENGER_LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:t\.me|wa\.me|line\.me)/[A-Za-z0-9._~/?#@!$&=+%:-]*")
        .expect("messenger link pattern compiles")
});

// Channel word, then a label (colon optional) or a bare colon, then the ID.
// The ID takes the whole token run so nothing glued to its tail survives masking.
static KAKAO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(카카오톡|카카오|카톡)[ \t]*(?:(아이디|(?i:id))[ \t]*[:：]?|[:：])[ \t]*([A-Za-z0-9._-]{3,})",
    )
    .expect("kakao id pattern compiles")
});

/// The compiled matcher for one signal category.
pub fn contact_pattern(kind: ContactSignalType) -> &'static Regex {
    match kind {
        ContactSignalType::Email => &*EMAIL_PATTERN,
        ContactSignalType::Phone => &*PHONE_PATTERN,
        ContactSignalType::OpenKakao => &*OPEN_KAKAO_PATTERN,
        ContactSignalType::MessengerLink => &*MESSENGER_LINK_PATTERN,
        ContactSignalType::KakaoId => &*KAKAO_ID_PATTERN,
    }
}

/// A single matched signal span, for moderator tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSignalMatch {
    pub kind: ContactSignalType,
    pub range: Range<usize>,
    pub text: String,
}

fn signal_captures<'t>(
    kind: ContactSignalType,
    text: &'t str,
) -> impl Iterator<Item = Captures<'t>> + 't {
    contact_pattern(kind)
        .captures_iter(text)
        .filter(move |caps| match (kind, caps.get(0)) {
            (ContactSignalType::Phone, Some(whole)) => is_standalone_number(text, whole.range()),
            (ContactSignalType::KakaoId, Some(_)) => {
                caps.get(3).is_some_and(|id| !is_masked_prefix(text, id.end()))
            }
            (_, whole) => whole.is_some(),
        })
}

// The token stops right before a `*` run, i.e. it is the kept prefix of a mask.
fn is_masked_prefix(text: &str, token_end: usize) -> bool {
    text[token_end..].starts_with('*')
}

// A digit run glued to more digits (order numbers, timestamps) is not a phone number.
fn is_standalone_number(text: &str, range: Range<usize>) -> bool {
    let digit_before = text[..range.start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit());
    let digit_after = text[range.end..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit());
    !digit_before && !digit_after
}

pub fn has_contact_signal(kind: ContactSignalType, text: &str) -> bool {
    signal_captures(kind, text).next().is_some()
}

/// Distinct signal categories present in `text`, in [`ContactSignalType::ALL`] order.
pub fn detect_contact_signals(text: &str) -> Vec<ContactSignalType> {
    if text.is_empty() {
        return Vec::new();
    }

    ContactSignalType::ALL
        .into_iter()
        .filter(|kind| has_contact_signal(*kind, text))
        .collect()
}

/// Every matched span in `text`, ordered by position.
pub fn find_contact_signals(text: &str) -> Vec<ContactSignalMatch> {
    let mut matches: Vec<ContactSignalMatch> = ContactSignalType::ALL
        .into_iter()
        .flat_map(|kind| {
            signal_captures(kind, text).filter_map(move |caps| {
                caps.get(0).map(|whole| ContactSignalMatch {
                    kind,
                    range: whole.range(),
                    text: whole.as_str().to_string(),
                })
            })
        })
        .collect();
    matches.sort_by_key(|m| (m.range.start, m.kind));
    matches
}

/// Rewrites every contact signal in `text` into a partially redacted form.
///
/// Runs one substitution per category over the whole text. The replacement
/// shapes never re-match their own pattern, so masking twice is the same as
/// masking once.
pub fn mask_contact_signals(text: &str) -> String {
    ContactSignalType::ALL
        .into_iter()
        .fold(text.to_string(), |current, kind| mask_category(kind, &current))
}

fn mask_category(kind: ContactSignalType, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in signal_captures(kind, text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&mask_match(kind, &caps));
        last = whole.end();
    }

    out.push_str(&text[last..]);
    out
}

fn mask_match(kind: ContactSignalType, caps: &Captures<'_>) -> String {
    let whole = caps.get(0).map_or("", |m| m.as_str());
    match kind {
        ContactSignalType::Email => mask_email(whole),
        ContactSignalType::Phone => mask_phone(whole),
        ContactSignalType::OpenKakao => OPEN_KAKAO_PLACEHOLDER.to_string(),
        ContactSignalType::MessengerLink => MESSENGER_LINK_PLACEHOLDER.to_string(),
        ContactSignalType::KakaoId => {
            let channel = caps.get(1).map_or("카카오톡", |m| m.as_str());
            let label = caps.get(2).map_or(DEFAULT_KAKAO_ID_LABEL, |m| m.as_str());
            let id = caps.get(3).map_or("", |m| m.as_str());
            format!("{channel} {label}: {}***", keep_prefix(id))
        }
    }
}

fn keep_prefix(value: &str) -> String {
    value.chars().take(2).collect()
}

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            format!("{}***@{}", keep_prefix(local), domain)
        }
        _ => EMAIL_PLACEHOLDER.to_string(),
    }
}

fn mask_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < MIN_PHONE_DIGITS {
        return PHONE_PLACEHOLDER.to_string();
    }

    let last4 = &digits[digits.len() - 4..];
    if digits.starts_with("02") {
        format!("02-***-{last4}")
    } else {
        format!("{}-****-{last4}", &digits[..3])
    }
}
