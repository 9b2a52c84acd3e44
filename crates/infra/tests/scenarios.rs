//! End-to-end wizard sessions over the in-memory adapters.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use paydesk_core::{EmployeeId, InstitutionId};
use paydesk_deductions::{
    DeductionRequestStatus, DeductionType, DraftEdit, DraftPolicy, DraftState, Employee,
    EmploymentStatus,
};
use paydesk_infra::{
    AssessmentOutcome, DeductionWizard, InMemoryAffordabilityScorer, InMemoryDeductionRequestStore,
    InMemoryEmployeeDirectory, InstitutionContext, InstitutionKind, SearchOutcome, WizardError,
};
use paydesk_observability::LogFormat;

struct Setup {
    employer: InstitutionId,
    staff: Employee,
    store: Arc<InMemoryDeductionRequestStore>,
    wizard: DeductionWizard,
}

fn setup(kind: InstitutionKind, policy: DraftPolicy) -> Setup {
    paydesk_observability::init_with(LogFormat::Compact);

    let employer = InstitutionId::new();
    let staff = Employee {
        id: EmployeeId::new(),
        display_name: "Chikondi Banda".to_string(),
        employee_number: "EMP-0042".to_string(),
        national_id: "MWI123456".to_string(),
        employer_institution_id: employer,
        basic_salary: Some(dec!(450000)),
        employment_status: EmploymentStatus::Active,
    };

    let directory = Arc::new(InMemoryEmployeeDirectory::with_employees([staff.clone()]));
    let scorer = Arc::new(InMemoryAffordabilityScorer::new());
    scorer.set_salary(staff.id, dec!(450000), dec!(45000));
    let store = Arc::new(InMemoryDeductionRequestStore::new());

    let acting = match kind {
        InstitutionKind::Employer => employer,
        _ => InstitutionId::new(),
    };
    let wizard = DeductionWizard::new(
        InstitutionContext::new(acting, kind),
        policy,
        directory,
        scorer,
        store.clone(),
    );

    Setup {
        employer,
        staff,
        store,
        wizard,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn equipment_loan_is_submitted_and_draft_resets() {
    let s = setup(InstitutionKind::Sacco, DraftPolicy::request_flow());
    let w = &s.wizard;

    let SearchOutcome::Applied(hits) = w.search_employees("MWI123456").await else {
        panic!("search should apply");
    };
    assert_eq!(hits, vec![s.staff.clone()]);

    w.select_employee(hits[0].clone()).await.unwrap();
    assert_eq!(w.state(), DraftState::EmployeeSelected);

    w.edit(DraftEdit::DeductionType(DeductionType::LoanRepayment))
        .await
        .unwrap();
    let outcome = w.edit(DraftEdit::Amount("50,000".to_string())).await.unwrap();
    let AssessmentOutcome::Recorded(assessment) = outcome else {
        panic!("expected an assessment, got {outcome:?}");
    };
    assert!(assessment.can_afford);
    assert_eq!(assessment.net_salary_after_deduction, dec!(355000));

    w.edit(DraftEdit::StartDate(Some(date(2025, 3, 1)))).await.unwrap();
    w.edit(DraftEdit::Installments("6".to_string())).await.unwrap();
    w.edit(DraftEdit::Reason("Equipment loan".to_string()))
        .await
        .unwrap();

    let snapshot = w.snapshot();
    assert_eq!(snapshot.state, DraftState::Ready);
    assert_eq!(snapshot.end_date, Some(date(2025, 9, 1)));
    assert_eq!(snapshot.maturity_total, Some(dec!(300000)));

    let request = w.submit().await.unwrap();
    assert_eq!(request.status, DeductionRequestStatus::Pending);
    assert_eq!(request.employer_institution_id, s.employer);
    assert_eq!(request.end_date, Some(date(2025, 9, 1)));
    assert_eq!(request.maturity_total(), Some(dec!(300000)));
    assert_eq!(request.kind_label(), "Deduction request");
    assert!(!request.id.to_string().is_empty());

    let after = w.snapshot();
    assert_eq!(after.state, DraftState::Submitted);
    assert_eq!(after.submitted_request_id, Some(request.id));
    assert_eq!(after.employee, None);
    assert_eq!(after.amount, None);
    assert_eq!(after.affordability, None);
    assert_eq!(s.store.get(request.id), Some(request));
}

#[tokio::test]
async fn employer_cannot_find_other_employers_staff() {
    let s = setup(InstitutionKind::Employer, DraftPolicy::request_flow());
    assert!(matches!(
        s.wizard.search_employees("EMP-0042").await,
        SearchOutcome::Applied(ref hits) if hits.len() == 1
    ));

    let outsider = setup(InstitutionKind::Employer, DraftPolicy::request_flow());
    // Directory holding another employer's staff.
    let other = DeductionWizard::new(
        InstitutionContext::new(InstitutionId::new(), InstitutionKind::Employer),
        DraftPolicy::request_flow(),
        Arc::new(InMemoryEmployeeDirectory::with_employees([outsider.staff])),
        Arc::new(InMemoryAffordabilityScorer::new()),
        Arc::new(InMemoryDeductionRequestStore::new()),
    );
    assert_eq!(
        other.search_employees("EMP-0042").await,
        SearchOutcome::Applied(Vec::new())
    );
    assert!(other.search_view().no_matches());
}

#[tokio::test]
async fn duplicate_external_reference_is_a_rejection() {
    let s = setup(InstitutionKind::Sacco, DraftPolicy::request_flow());
    let w = &s.wizard;

    for attempt in 0..2 {
        w.select_employee(s.staff.clone()).await.unwrap();
        w.edit(DraftEdit::DeductionType(DeductionType::Share))
            .await
            .unwrap();
        w.edit(DraftEdit::amount(dec!(15000))).await.unwrap();
        w.edit(DraftEdit::StartDate(Some(date(2025, 1, 31))))
            .await
            .unwrap();
        w.edit(DraftEdit::installments(12)).await.unwrap();
        w.edit(DraftEdit::Reason("Monthly shares".to_string()))
            .await
            .unwrap();
        w.edit(DraftEdit::ExternalReference("SH-2025-0042".to_string()))
            .await
            .unwrap();

        let result = w.submit().await;
        if attempt == 0 {
            let request = result.unwrap();
            assert_eq!(request.end_date, Some(date(2026, 1, 31)));
        } else {
            let err = result.unwrap_err();
            assert!(matches!(err, WizardError::Gateway(ref e) if e.is_rejection()));
            assert_eq!(w.state(), DraftState::Failed);
            assert_eq!(w.snapshot().external_reference, "SH-2025-0042");
        }
    }
    assert_eq!(s.store.len(), 1);
}

#[tokio::test]
async fn affordability_check_flow_blocks_unaffordable_reservation() {
    let s = setup(InstitutionKind::FinancialHub, DraftPolicy::affordability_check_flow());
    let w = &s.wizard;

    w.select_employee(s.staff.clone()).await.unwrap();
    w.edit(DraftEdit::DeductionType(DeductionType::Insurance))
        .await
        .unwrap();
    w.edit(DraftEdit::Reservation(true)).await.unwrap();
    let outcome = w.edit(DraftEdit::amount(dec!(250000))).await.unwrap();
    assert!(matches!(outcome, AssessmentOutcome::Recorded(ref a) if !a.can_afford));
    w.edit(DraftEdit::StartDate(Some(date(2025, 2, 1)))).await.unwrap();
    w.edit(DraftEdit::installments(3)).await.unwrap();
    w.edit(DraftEdit::Reason("Cover reservation".to_string()))
        .await
        .unwrap();

    assert_eq!(w.state(), DraftState::EmployeeSelected);
    assert!(matches!(w.submit().await, Err(WizardError::NotReady(_))));

    w.edit(DraftEdit::amount(dec!(40000))).await.unwrap();
    let request = w.submit().await.unwrap();
    assert!(request.is_reservation);
    assert_eq!(request.kind_label(), "Reservation");
}
