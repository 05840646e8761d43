// src/tests/classifier_tests.rs

//! tests for `classifier.rs`

#![allow(non_snake_case)]

use crate::data::utmpx::{tv_sec_type, Utmpx};
use crate::redact::classifier::{
    Decision,
    HostSessionPolicy,
    RedactReason,
    SessionClassifier,
};
use crate::redact::predicate::Filters;
use crate::tests::common::{
    boot,
    login,
    login_placeholder,
    logout,
    logout_host,
    logout_user,
    ENTRIES_ALICE_BOB,
    ENTRIES_REMOTE,
    HOST_REMOTE,
    TV_SEC_1,
    TV_SEC_2,
    TV_SEC_3,
    TV_SEC_4,
    TV_SEC_BOOT,
};

use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const KEEP: Decision = Decision::Keep;
const R_HOST: Decision = Decision::Redact(RedactReason::Host);
const R_LOGIN: Decision = Decision::Redact(RedactReason::UserLogin);
const R_LOGOUT: Decision = Decision::Redact(RedactReason::UserLogout);
const R_TRACKED: Decision = Decision::Redact(RedactReason::TrackedLogout);
const R_PLACEHOLDER: Decision = Decision::Redact(RedactReason::LoginPlaceholder);

/// Classify `entries` in order with a new `SessionClassifier`.
fn classify_all(
    filters: &Filters,
    host_policy: HostSessionPolicy,
    entries: &[Utmpx],
) -> Vec<Decision> {
    let mut classifier = SessionClassifier::new(filters, host_policy);
    entries
        .iter()
        .map(|entry| classifier.classify(entry))
        .collect()
}

fn user_filter(user: &str) -> Filters {
    Filters::new(Some(user), None, None)
}

#[test]
fn test_classify_alice_bob() {
    let decisions = classify_all(&user_filter("alice"), HostSessionPolicy::Bypass, &ENTRIES_ALICE_BOB);
    assert_eq!(decisions, vec![R_LOGIN, KEEP, R_TRACKED, R_PLACEHOLDER, KEEP]);
}

#[test]
fn test_classify_alice_bob_redact_bob() {
    let decisions = classify_all(&user_filter("bob"), HostSessionPolicy::Bypass, &ENTRIES_ALICE_BOB);
    assert_eq!(decisions, vec![KEEP, R_LOGIN, KEEP, KEEP, R_TRACKED]);
}

#[test]
fn test_classify_no_match() {
    let decisions = classify_all(&user_filter("mallory"), HostSessionPolicy::Bypass, &ENTRIES_ALICE_BOB);
    assert!(decisions.iter().all(|d| *d == KEEP), "{:?}", decisions);
}

#[test]
fn test_classify_boot_ends_sessions() {
    let entries = vec![
        login("alice", "tty1", "", TV_SEC_1),
        boot(TV_SEC_2),
        logout("tty1", TV_SEC_3),
        login_placeholder("tty1", TV_SEC_3),
    ];
    let decisions = classify_all(&user_filter("alice"), HostSessionPolicy::Bypass, &entries);
    assert_eq!(decisions, vec![R_LOGIN, KEEP, KEEP, KEEP]);
}

#[test]
fn test_classify_placeholder_only_directly_after() {
    let entries = vec![
        login("alice", "tty1", "", TV_SEC_1),
        logout("tty1", TV_SEC_2),
        logout("tty2", TV_SEC_2),
        login_placeholder("tty1", TV_SEC_3),
    ];
    let decisions = classify_all(&user_filter("alice"), HostSessionPolicy::Bypass, &entries);
    assert_eq!(decisions, vec![R_LOGIN, R_TRACKED, KEEP, KEEP]);
}

#[test]
fn test_classify_named_logout() {
    // a logout naming the user ends the session but is not followed by a
    // redacted placeholder
    let entries = vec![
        login("alice", "pts/2", "", TV_SEC_1),
        logout_user("alice", "pts/2", TV_SEC_2),
        login_placeholder("pts/2", TV_SEC_2),
        logout("pts/2", TV_SEC_3),
    ];
    let decisions = classify_all(&user_filter("alice"), HostSessionPolicy::Bypass, &entries);
    assert_eq!(decisions, vec![R_LOGIN, R_LOGOUT, KEEP, KEEP]);
}

#[test]
fn test_classify_session_state_per_classifier() {
    let filters = user_filter("alice");
    let mut classifier = SessionClassifier::new(&filters, HostSessionPolicy::Bypass);
    assert_eq!(classifier.classify(&login("alice", "tty1", "", TV_SEC_1)), R_LOGIN);
    assert_eq!(classifier.tracker().len(), 1);
    assert_eq!(classifier.classify(&logout("tty1", TV_SEC_2)), R_TRACKED);
    assert!(classifier.pending_login());
    assert!(classifier.tracker().is_empty());
    // a new file starts with no sessions
    let mut classifier = SessionClassifier::new(&filters, HostSessionPolicy::Bypass);
    assert!(!classifier.pending_login());
    assert_eq!(classifier.classify(&logout("tty1", TV_SEC_3)), KEEP);
}

#[test_case(TV_SEC_2, vec![KEEP, KEEP, KEEP]; "login before cutoff; session untracked")]
#[test_case(TV_SEC_1, vec![R_LOGIN, R_TRACKED, R_PLACEHOLDER]; "all at or after cutoff")]
#[test_case(TV_SEC_3 + 1, vec![KEEP, KEEP, KEEP]; "all before cutoff")]
fn test_classify_age_cutoff(cutoff: i32, expect: Vec<Decision>) {
    let filters = Filters::new(Some("alice"), None, Some(cutoff as tv_sec_type));
    let entries = vec![
        login("alice", "tty1", "", TV_SEC_1),
        logout("tty1", TV_SEC_2),
        login_placeholder("tty1", TV_SEC_3),
    ];
    let decisions = classify_all(&filters, HostSessionPolicy::Bypass, &entries);
    assert_eq!(decisions, expect);
}

#[test_case(HostSessionPolicy::Bypass, vec![KEEP, R_HOST, KEEP, KEEP, KEEP, KEEP]; "bypass")]
#[test_case(HostSessionPolicy::Track, vec![KEEP, R_HOST, KEEP, R_TRACKED, KEEP, KEEP]; "track")]
fn test_classify_host_policy(host_policy: HostSessionPolicy, expect: Vec<Decision>) {
    let filters = Filters::new(None, Some(HOST_REMOTE), None);
    let decisions = classify_all(&filters, host_policy, &ENTRIES_REMOTE);
    assert_eq!(decisions, expect);
}

#[test]
fn test_classify_host_default_policy_is_bypass() {
    assert_eq!(HostSessionPolicy::default(), HostSessionPolicy::Bypass);
}

#[test]
fn test_classify_host_track_host_logout() {
    let filters = Filters::new(None, Some(HOST_REMOTE), None);
    let entries = vec![
        login("carol", "pts/0", HOST_REMOTE, TV_SEC_1),
        logout_host("pts/0", HOST_REMOTE, TV_SEC_2),
        login_placeholder("pts/0", TV_SEC_2),
    ];
    let decisions = classify_all(&filters, HostSessionPolicy::Track, &entries);
    assert_eq!(decisions, vec![R_HOST, R_HOST, R_PLACEHOLDER]);
    let decisions = classify_all(&filters, HostSessionPolicy::Bypass, &entries);
    assert_eq!(decisions, vec![R_HOST, R_HOST, KEEP]);
}

#[test]
fn test_classify_host_and_user() {
    let filters = Filters::new(Some("alice"), Some(HOST_REMOTE), None);
    let entries = vec![
        login("alice", "tty1", "", TV_SEC_1),
        login("bob", "pts/0", HOST_REMOTE, TV_SEC_2),
        logout("tty1", TV_SEC_3),
        logout("pts/0", TV_SEC_4),
    ];
    let decisions = classify_all(&filters, HostSessionPolicy::Bypass, &entries);
    assert_eq!(decisions, vec![R_LOGIN, R_HOST, R_TRACKED, KEEP]);
}

#[test]
fn test_classify_boot_resets_when_redacted_by_host() {
    // the boot entry host is a kernel release
    let filters = Filters::new(Some("alice"), Some("6.1.0"), None);
    let entries = vec![
        login("alice", "tty1", "", TV_SEC_BOOT),
        boot(TV_SEC_1),
        logout("tty1", TV_SEC_2),
    ];
    let decisions = classify_all(&filters, HostSessionPolicy::Bypass, &entries);
    assert_eq!(decisions, vec![R_LOGIN, R_HOST, KEEP]);
}

#[test]
fn test_Decision_is_redact() {
    assert!(!KEEP.is_redact());
    assert!(R_HOST.is_redact());
    assert_eq!(KEEP.to_string(), "keep");
    assert_eq!(R_PLACEHOLDER.to_string(), "redact (LoginPlaceholder)");
}
