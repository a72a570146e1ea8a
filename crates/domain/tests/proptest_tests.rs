//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use chrono::{DateTime, Duration, TimeZone, Utc};
use domain::entities::Task;
use domain::value_objects::{EmailAddress, Priority, TaskStatus, UserId, VersionToken};
use proptest::prelude::*;

fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01..2100-01-01, second precision
    (946_684_800i64..4_102_444_800i64)
        .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap())
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Draft),
        Just(TaskStatus::Open),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Completed),
        Just(TaskStatus::Overdue),
        Just(TaskStatus::Cancelled),
    ]
}

// ============================================================================
// VersionToken Property Tests
// ============================================================================

mod version_token_tests {
    use super::*;

    proptest! {
        #[test]
        fn base64_roundtrip(bytes in prop::array::uniform16(any::<u8>())) {
            let token = VersionToken::from_uuid(uuid::Uuid::from_bytes(bytes));
            let decoded = VersionToken::from_base64(&token.to_base64()).unwrap();
            prop_assert_eq!(decoded, token);
        }

        #[test]
        fn non_token_strings_never_panic(s in ".*") {
            // Decoding must reject or accept, never panic
            let _ = VersionToken::from_base64(&s);
        }
    }

    #[test]
    fn fresh_is_always_distinct_from_previous() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(VersionToken::fresh()));
        }
    }
}

// ============================================================================
// EmailAddress Property Tests
// ============================================================================

mod email_address_tests {
    use super::*;

    proptest! {
        #[test]
        fn normalization_is_idempotent(
            local in "[a-z][a-z0-9]{0,10}",
            dom in "[a-z][a-z0-9]{0,10}\\.[a-z]{2,4}"
        ) {
            let raw = format!("  {}@{}  ", local.to_uppercase(), dom);
            let once = EmailAddress::new(&raw).unwrap();
            let twice = EmailAddress::new(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn case_variants_are_the_same_key(
            local in "[a-z][a-z0-9]{0,10}",
            dom in "[a-z][a-z0-9]{0,10}\\.[a-z]{2,4}"
        ) {
            let lower = EmailAddress::new(format!("{local}@{dom}")).unwrap();
            let upper = EmailAddress::new(format!("{}@{}", local.to_uppercase(), dom)).unwrap();
            prop_assert_eq!(lower, upper);
        }
    }
}

// ============================================================================
// Task overdue / claim Property Tests
// ============================================================================

mod task_tests {
    use super::*;

    proptest! {
        #[test]
        fn terminal_tasks_are_never_overdue(
            due in arb_instant(),
            now in arb_instant(),
            terminal in prop_oneof![Just(TaskStatus::Completed), Just(TaskStatus::Cancelled)]
        ) {
            let task = Task::new("t", "d", due, Priority::Low, UserId::new())
                .with_status(terminal);
            prop_assert!(!task.is_overdue(now));
            prop_assert_eq!(task.effective_status(now), terminal);
        }

        #[test]
        fn overdue_iff_due_elapsed_and_non_terminal(
            due in arb_instant(),
            now in arb_instant(),
            status in arb_status()
        ) {
            let task = Task::new("t", "d", due, Priority::Low, UserId::new())
                .with_status(status);
            let expected = due < now && !status.is_terminal();
            prop_assert_eq!(task.is_overdue(now), expected);
        }

        #[test]
        fn claimable_requires_unclaimed(
            due in arb_instant(),
            claimed in proptest::option::of(arb_instant()),
            status in arb_status()
        ) {
            let mut task = Task::new("t", "d", due, Priority::Low, UserId::new())
                .with_status(status);
            task.due_notified_at = claimed;
            let now = due + Duration::minutes(1);
            let expected = !status.is_terminal() && claimed.is_none();
            prop_assert_eq!(task.is_claimable(now), expected);
        }

        #[test]
        fn touch_always_changes_the_version(
            due in arb_instant(),
            now in arb_instant()
        ) {
            let mut task = Task::new("t", "d", due, Priority::Low, UserId::new());
            let before = task.version;
            task.touch(now);
            prop_assert_ne!(task.version, before);
            prop_assert_eq!(task.updated_at, now);
        }
    }
}
