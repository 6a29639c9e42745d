// Business rules exercised through the library API

use chrono::{Duration, Utc};
use std::str::FromStr;

use estia_backend::models::property::{
    can_view_property, ViewerRelation, STATUS_APPROVED, STATUS_UNAVAILABLE,
};
use estia_backend::models::transaction::{effective_stage, Stage, STATUS_INTERESTED};
use estia_backend::models::viewing::ViewingStatus;
use estia_backend::services::otp;

#[test]
fn interested_transactions_reset_to_pending_after_cancellation() {
    // A trailing CANCELLED progress row, or no progress at all, renders the
    // fresh-interest default
    assert_eq!(
        effective_stage(STATUS_INTERESTED, "DEPOSIT_PAID", Some("CANCELLED")),
        "PENDING"
    );
    assert_eq!(effective_stage(STATUS_INTERESTED, "", None), "PENDING");
}

#[test]
fn interested_transactions_show_genuine_progress() {
    // Admin stage advances leave status untouched; the advanced stage must
    // survive into every read view
    assert_eq!(
        effective_stage(STATUS_INTERESTED, "DEPOSIT_PAID", Some("DEPOSIT_PAID")),
        "DEPOSIT_PAID"
    );
}

#[test]
fn stored_stage_wins_over_progress_history() {
    assert_eq!(
        effective_stage("PRE_DEPOSIT", "MEETING_SCHEDULED", Some("DEPOSIT_PAID")),
        "MEETING_SCHEDULED"
    );
}

#[test]
fn progress_history_backfills_missing_stage() {
    assert_eq!(
        effective_stage("PRE_DEPOSIT", "", Some("DEPOSIT_PAID")),
        "DEPOSIT_PAID"
    );
    assert_eq!(effective_stage("PRE_DEPOSIT", "", None), "PENDING");
}

#[test]
fn stage_parse_accepts_any_case() {
    assert_eq!(Stage::from_str("deposit_paid").unwrap(), Stage::DepositPaid);
    assert_eq!(Stage::from_str("COMPLETED").unwrap(), Stage::Completed);
    assert!(Stage::from_str("SHIPPED").is_err());
}

#[test]
fn stage_rejection_message_lists_every_stage() {
    assert_eq!(
        Stage::invalid_stage_message(),
        "Invalid transaction stage. Must be one of: PENDING, MEETING_SCHEDULED, \
         DEPOSIT_PAID, FINAL_SIGNING, COMPLETED, CANCELLED"
    );
}

#[test]
fn unavailable_listings_need_a_relationship() {
    assert!(can_view_property(STATUS_APPROVED, None));
    assert!(!can_view_property(STATUS_UNAVAILABLE, None));
    assert!(!can_view_property(
        STATUS_UNAVAILABLE,
        Some(ViewerRelation::default())
    ));

    for relation in [
        ViewerRelation { is_owner: true, ..Default::default() },
        ViewerRelation { is_admin: true, ..Default::default() },
        ViewerRelation { has_favorite: true, ..Default::default() },
        ViewerRelation { is_connected_agent: true, ..Default::default() },
        ViewerRelation { is_connected_buyer: true, ..Default::default() },
    ] {
        assert!(can_view_property(STATUS_UNAVAILABLE, Some(relation)));
    }
}

#[test]
fn viewing_status_machine_end_to_end() {
    // Proposal path
    assert!(ViewingStatus::Pending.can_transition_to(ViewingStatus::Accepted));
    assert!(ViewingStatus::Accepted.can_transition_to(ViewingStatus::Completed));

    // Slot booking path
    assert!(ViewingStatus::PendingSellerApproval.can_transition_to(ViewingStatus::Scheduled));

    // Rejections are terminal apart from cancellation
    assert!(!ViewingStatus::Rejected.can_transition_to(ViewingStatus::Accepted));
    assert!(ViewingStatus::Rejected.can_transition_to(ViewingStatus::Cancelled));
}

#[test]
fn otp_lifecycle() {
    let now = Utc::now();
    let code = otp::generate_code();
    assert_eq!(code.len(), 6);

    let expires = otp::expiry_from(now);
    assert_eq!(
        otp::check_code(Some(&code), Some(expires), &code, now),
        otp::OtpCheck::Valid
    );

    // Same code a minute past the window
    let late = expires + Duration::minutes(1);
    assert_eq!(
        otp::check_code(Some(&code), Some(expires), &code, late),
        otp::OtpCheck::Expired
    );
}
