use moderation::contact::{
    detect_contact_signals, has_contact_signal, mask_contact_signals, ContactSignalType,
    MESSENGER_LINK_PLACEHOLDER, OPEN_KAKAO_PLACEHOLDER,
};

const FIXTURES: &[&str] = &[
    "문의: 010-1234-5678, 이메일 hello@example.com, https://open.kakao.com/o/demo",
    "연락처 01012345678 / test@townpet.dev / https://open.kakao.com/o/demo / https://t.me/demo",
    "카카오톡 아이디: townpet123",
    "카톡: 010-1234-5678",
    "HTTPS://OPEN.KAKAO.COM/o/abc?x=1 그리고 https://wa.me/821012345678",
    "메일: a@b.co, c.d-e@mail.example.org",
    "서울 02-123-4567 / 부산 051 234 5678",
    "카카오톡 아이디 abcdefghijklmnopqrstuvwxyz",
    "카톡: abcdefghijklmnopqrs101012345678",
    "라인 https://line.me/ti/p/~petfriend 으로 주세요",
    "그냥 평범한 산책 후기입니다",
    "",
];

#[test]
fn detects_phone_email_and_open_chat_together() {
    let signals = detect_contact_signals(
        "문의: 010-1234-5678, 이메일 hello@example.com, https://open.kakao.com/o/demo",
    );
    assert!(signals.contains(&ContactSignalType::Phone));
    assert!(signals.contains(&ContactSignalType::Email));
    assert!(signals.contains(&ContactSignalType::OpenKakao));
    assert_eq!(
        signals,
        vec![
            ContactSignalType::Email,
            ContactSignalType::Phone,
            ContactSignalType::OpenKakao,
        ]
    );
}

#[test]
fn masks_every_category_in_one_pass() {
    let masked = mask_contact_signals(
        "연락처 01012345678 / test@townpet.dev / https://open.kakao.com/o/demo / https://t.me/demo",
    );
    assert!(masked.contains("010-****-5678"));
    assert!(masked.contains("te***@townpet.dev"));
    assert!(masked.contains(OPEN_KAKAO_PLACEHOLDER));
    assert!(masked.contains(MESSENGER_LINK_PLACEHOLDER));
    assert_eq!(
        masked,
        "연락처 010-****-5678 / te***@townpet.dev / [오픈채팅 링크 비공개] / [메신저 링크 비공개]"
    );
}

#[test]
fn signal_free_text_is_unchanged() {
    let text = "오늘 공원에서 강아지 3마리랑 산책했어요 :)";
    assert!(detect_contact_signals(text).is_empty());
    assert_eq!(mask_contact_signals(text), text);
}

#[test]
fn masking_is_idempotent() {
    for text in FIXTURES {
        let once = mask_contact_signals(text);
        let twice = mask_contact_signals(&once);
        assert_eq!(once, twice, "masking not idempotent for {text:?}");
    }
}

#[test]
fn masked_output_carries_no_detectable_signal() {
    for text in FIXTURES {
        let masked = mask_contact_signals(text);
        assert!(
            detect_contact_signals(&masked).is_empty(),
            "masked output {masked:?} still has signals"
        );
    }
}

#[test]
fn every_detected_category_is_rewritten() {
    for text in FIXTURES {
        let masked = mask_contact_signals(text);
        for kind in detect_contact_signals(text) {
            assert_ne!(&masked, text, "{kind} detected but text unchanged");
            assert!(
                !has_contact_signal(kind, &masked),
                "{kind} survived masking in {masked:?}"
            );
        }
    }
}

#[test]
fn adjacent_contacts_are_masked_independently() {
    let masked = mask_contact_signals("010-1111-2222,010-3333-4444");
    assert_eq!(masked, "010-****-2222,010-****-4444");
}

#[test]
fn long_kakao_id_cannot_hide_a_phone_number() {
    let text = "카톡: abcdefghijklmnopqrs101012345678";
    let masked = mask_contact_signals(text);
    assert_eq!(masked, "카톡 아이디: ab***");
    assert!(!masked.contains("01012345678"));
    assert_eq!(mask_contact_signals(&masked), masked);
}

#[test]
fn phone_after_kakao_channel_keeps_phone_mask_shape() {
    assert_eq!(mask_contact_signals("카톡: 010-1234-5678"), "카톡: 010-****-5678");
}

#[test]
fn seoul_numbers_use_short_mask() {
    assert_eq!(mask_contact_signals("02-123-4567"), "02-***-4567");
    assert_eq!(mask_contact_signals("02 1234 5678"), "02-***-5678");
}

#[test]
fn signal_type_serializes_snake_case() {
    let json = serde_json::to_string(&ContactSignalType::MessengerLink).unwrap();
    assert_eq!(json, "\"messenger_link\"");
    let parsed: ContactSignalType = serde_json::from_str("\"kakao_id\"").unwrap();
    assert_eq!(parsed, ContactSignalType::KakaoId);
}
