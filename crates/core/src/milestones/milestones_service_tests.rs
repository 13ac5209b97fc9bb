//! Tests for milestone direction, progress and date estimation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use crate::accounts::{account_types, AccountRepositoryTrait};
use crate::loans::LoanPayoffCalculator;
use crate::milestones::{MilestoneService, MilestoneServiceTrait, MilestoneStatus, NewMilestone};
use crate::test_support::{
    account, date, loan_account, stored_projection, MockAccountRepository,
    MockMilestoneRepository, MockProjectionRepository,
};
use crate::utils::FixedClock;

struct Fixture {
    accounts: Arc<MockAccountRepository>,
    projections: Arc<MockProjectionRepository>,
    service: MilestoneService,
}

fn fixture() -> Fixture {
    let accounts = MockAccountRepository::with_accounts(vec![
        account("liability", account_types::LIABILITY, dec!(-300000)),
        account("savings", account_types::SECURITIES, dec!(10000)),
        loan_account(
            "mortgage",
            account_types::MORTGAGE,
            dec!(-300000),
            dec!(0.05),
            300,
        ),
    ]);
    let projections = MockProjectionRepository::new();
    let service = MilestoneService::new(
        accounts.clone(),
        MockMilestoneRepository::new(),
        projections.clone(),
        Arc::new(FixedClock::new(date(2026, 10, 16))),
    );
    Fixture {
        accounts,
        projections,
        service,
    }
}

fn milestone(account_id: &str, target: Decimal) -> NewMilestone {
    NewMilestone {
        id: None,
        account_id: account_id.to_string(),
        name: format!("Target {}", target),
        target_amount: target,
    }
}

#[tokio::test]
async fn test_next_milestone_for_liability_is_closest_reduction_goal() {
    let f = fixture();
    f.service
        .create_milestone(milestone("liability", dec!(250000)))
        .await
        .unwrap();
    f.service
        .create_milestone(milestone("liability", dec!(280000)))
        .await
        .unwrap();

    let next = f.service.next_milestone("liability").unwrap().unwrap();
    assert_eq!(next.target_amount, dec!(280000));
    assert!(next.is_reduction);
}

#[tokio::test]
async fn test_next_milestone_for_asset_is_lowest_target_above_balance() {
    let f = fixture();
    for target in [dec!(5000), dec!(25000), dec!(15000)] {
        f.service
            .create_milestone(milestone("savings", target))
            .await
            .unwrap();
    }

    let next = f.service.next_milestone("savings").unwrap().unwrap();
    assert_eq!(next.target_amount, dec!(15000));
}

#[tokio::test]
async fn test_next_milestone_none_when_nothing_qualifies() {
    let f = fixture();
    f.service
        .create_milestone(milestone("savings", dec!(5000)))
        .await
        .unwrap();

    assert!(f.service.next_milestone("savings").unwrap().is_none());
    assert!(f.service.next_milestone("liability").unwrap().is_none());
}

#[tokio::test]
async fn test_create_rejects_non_positive_target() {
    let f = fixture();
    assert!(f
        .service
        .create_milestone(milestone("savings", Decimal::ZERO))
        .await
        .is_err());
    assert!(f.service.list_milestones("savings").unwrap().is_empty());
}

#[tokio::test]
async fn test_create_snapshots_direction_and_status() {
    let f = fixture();
    let reached = f
        .service
        .create_milestone(milestone("savings", dec!(5000)))
        .await
        .unwrap();
    assert_eq!(reached.status, MilestoneStatus::Achieved);
    assert!(reached.achieved_at.is_some());
    assert!(!reached.is_reduction);
    assert_eq!(reached.starting_balance, dec!(10000));

    let pending = f
        .service
        .create_milestone(milestone("liability", dec!(250000)))
        .await
        .unwrap();
    assert_eq!(pending.status, MilestoneStatus::Pending);
    assert_eq!(pending.starting_balance, dec!(300000));
}

#[tokio::test]
async fn test_progress_moves_through_statuses_and_achieved_is_terminal() {
    let f = fixture();
    f.service
        .create_milestone(milestone("liability", dec!(250000)))
        .await
        .unwrap();

    f.accounts
        .update_balance("liability", dec!(-290000), date(2026, 10, 16))
        .await
        .unwrap();
    let updated = f.service.update_milestone_progress("liability").await.unwrap();
    assert_eq!(updated[0].status, MilestoneStatus::InProgress);

    f.accounts
        .update_balance("liability", dec!(-249000), date(2026, 10, 16))
        .await
        .unwrap();
    let updated = f.service.update_milestone_progress("liability").await.unwrap();
    assert_eq!(updated[0].status, MilestoneStatus::Achieved);

    // Borrowing again does not reopen it
    f.accounts
        .update_balance("liability", dec!(-260000), date(2026, 10, 16))
        .await
        .unwrap();
    let updated = f.service.update_milestone_progress("liability").await.unwrap();
    assert_eq!(updated[0].status, MilestoneStatus::Achieved);
}

#[tokio::test]
async fn test_loan_backed_reduction_uses_amortization_schedule() {
    let f = fixture();
    let created = f
        .service
        .create_milestone(milestone("mortgage", dec!(280000)))
        .await
        .unwrap();

    let expected = LoanPayoffCalculator::new(dec!(300000), dec!(0.05), 300)
        .unwrap()
        .date_when_balance_at_or_below(dec!(280000), date(2026, 10, 16));
    assert!(expected.is_some());
    assert_eq!(created.projected_date, expected);
}

#[tokio::test]
async fn test_growth_milestone_date_comes_from_projections() {
    let f = fixture();
    f.projections
        .seed(stored_projection("savings", date(2026, 11, 30), dec!(10500), None));
    f.projections
        .seed(stored_projection("savings", date(2026, 12, 31), dec!(11200), None));
    f.projections
        .seed(stored_projection("savings", date(2027, 1, 31), dec!(12000), None));

    let created = f
        .service
        .create_milestone(milestone("savings", dec!(11000)))
        .await
        .unwrap();
    assert_eq!(created.projected_date, Some(date(2026, 12, 31)));

    let far = f
        .service
        .create_milestone(milestone("savings", dec!(50000)))
        .await
        .unwrap();
    assert_eq!(far.projected_date, None);
}

#[tokio::test]
async fn test_liability_without_loan_terms_scans_projection_magnitudes() {
    let f = fixture();
    f.projections
        .seed(stored_projection("liability", date(2026, 11, 30), dec!(-295000), None));
    f.projections
        .seed(stored_projection("liability", date(2026, 12, 31), dec!(-279000), None));

    let created = f
        .service
        .create_milestone(milestone("liability", dec!(280000)))
        .await
        .unwrap();
    assert_eq!(created.projected_date, Some(date(2026, 12, 31)));
}

#[tokio::test]
async fn test_update_projections_is_idempotent_and_clears_stale_dates() {
    let f = fixture();
    f.projections
        .seed(stored_projection("savings", date(2026, 12, 31), dec!(11200), None));
    f.service
        .create_milestone(milestone("savings", dec!(11000)))
        .await
        .unwrap();

    let first = f.service.update_milestone_projections("savings").await.unwrap();
    let second = f.service.update_milestone_projections("savings").await.unwrap();
    assert_eq!(first[0].projected_date, second[0].projected_date);
    assert_eq!(second[0].projected_date, Some(date(2026, 12, 31)));

    // Once the clock passes the only projection, no date remains
    let later = MilestoneService::new(
        f.accounts.clone(),
        MockMilestoneRepository::new(),
        f.projections.clone(),
        Arc::new(FixedClock::new(date(2027, 2, 1))),
    );
    later
        .create_milestone(milestone("savings", dec!(11000)))
        .await
        .unwrap();
    let refreshed = later.update_milestone_projections("savings").await.unwrap();
    assert_eq!(refreshed[0].projected_date, None);
}

#[tokio::test]
async fn test_delete_milestone() {
    let f = fixture();
    let created = f
        .service
        .create_milestone(milestone("savings", dec!(20000)))
        .await
        .unwrap();

    assert_eq!(f.service.delete_milestone(&created.id).await.unwrap(), 1);
    assert!(f.service.delete_milestone(&created.id).await.is_err());
    assert!(f.service.list_milestones("savings").unwrap().is_empty());
}

#[tokio::test]
async fn test_progress_percentage() {
    let f = fixture();
    let created = f
        .service
        .create_milestone(milestone("liability", dec!(200000)))
        .await
        .unwrap();

    assert_eq!(created.progress_percentage(dec!(250000)), dec!(50.00));
    assert_eq!(created.progress_percentage(dec!(310000)), Decimal::ZERO);
    assert_eq!(created.progress_percentage(dec!(150000)), Decimal::ONE_HUNDRED);
}
