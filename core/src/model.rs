use crate::error::{ErrorCode, TownpetError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Role of the acting account. `User` is the only role subject to new-account
/// restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Moderator,
    Admin,
}

impl UserRole {
    pub fn is_base(self) -> bool {
        matches!(self, UserRole::User)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UserRole::User => "USER",
            UserRole::Moderator => "MODERATOR",
            UserRole::Admin => "ADMIN",
        };
        write!(f, "{}", s)
    }
}

/// Board category of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostType {
    HospitalReview,
    PlaceReview,
    WalkRoute,
    Meetup,
    MarketListing,
    AdoptionListing,
    ShelterVolunteer,
    LostFound,
    QaQuestion,
    QaAnswer,
    FreePost,
    DailyShare,
    ProductReview,
    PetShowcase,
}

impl PostType {
    pub const ALL: [PostType; 14] = [
        PostType::HospitalReview,
        PostType::PlaceReview,
        PostType::WalkRoute,
        PostType::Meetup,
        PostType::MarketListing,
        PostType::AdoptionListing,
        PostType::ShelterVolunteer,
        PostType::LostFound,
        PostType::QaQuestion,
        PostType::QaAnswer,
        PostType::FreePost,
        PostType::DailyShare,
        PostType::ProductReview,
        PostType::PetShowcase,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PostType::HospitalReview => "HOSPITAL_REVIEW",
            PostType::PlaceReview => "PLACE_REVIEW",
            PostType::WalkRoute => "WALK_ROUTE",
            PostType::Meetup => "MEETUP",
            PostType::MarketListing => "MARKET_LISTING",
            PostType::AdoptionListing => "ADOPTION_LISTING",
            PostType::ShelterVolunteer => "SHELTER_VOLUNTEER",
            PostType::LostFound => "LOST_FOUND",
            PostType::QaQuestion => "QA_QUESTION",
            PostType::QaAnswer => "QA_ANSWER",
            PostType::FreePost => "FREE_POST",
            PostType::DailyShare => "DAILY_SHARE",
            PostType::ProductReview => "PRODUCT_REVIEW",
            PostType::PetShowcase => "PET_SHOWCASE",
        }
    }

    /// Korean display label shown to end users.
    pub fn label(self) -> &'static str {
        match self {
            PostType::HospitalReview => "병원 후기",
            PostType::PlaceReview => "장소 후기",
            PostType::WalkRoute => "산책 코스",
            PostType::Meetup => "동네 모임",
            PostType::MarketListing => "중고/공동구매",
            PostType::AdoptionListing => "입양 공고",
            PostType::ShelterVolunteer => "보호소 봉사",
            PostType::LostFound => "실종/목격 제보",
            PostType::QaQuestion => "질문",
            PostType::QaAnswer => "답변",
            PostType::FreePost => "자유게시판",
            PostType::DailyShare => "일상 공유",
            PostType::ProductReview => "용품 리뷰",
            PostType::PetShowcase => "반려동물 자랑",
        }
    }
}

impl std::fmt::Display for PostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown post type: {0}")]
pub struct UnknownPostType(pub String);

impl TownpetError for UnknownPostType {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidArgument
    }
}

impl FromStr for PostType {
    type Err = UnknownPostType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        PostType::ALL
            .into_iter()
            .find(|post_type| post_type.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| UnknownPostType(normalized.to_string()))
    }
}
