use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use paydesk_core::{EmployeeId, InstitutionId};
use paydesk_deductions::{
    DeductionType, DraftEdit, DraftPolicy, Employee, EmploymentStatus,
};
use paydesk_infra::{
    DeductionWizard, InMemoryAffordabilityScorer, InMemoryDeductionRequestStore,
    InMemoryEmployeeDirectory, InstitutionContext, InstitutionKind,
};

fn staff(employer: InstitutionId, n: usize) -> Employee {
    Employee {
        id: EmployeeId::new(),
        display_name: format!("Employee {n}"),
        employee_number: format!("EMP-{n:05}"),
        national_id: format!("MWI{n:06}"),
        employer_institution_id: employer,
        basic_salary: Some(dec!(450000)),
        employment_status: EmploymentStatus::Active,
    }
}

fn bench_wizard(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    let employer = InstitutionId::new();
    let employees: Vec<Employee> = (0..1_000).map(|n| staff(employer, n)).collect();
    let scorer = Arc::new(InMemoryAffordabilityScorer::new());
    for e in &employees {
        scorer.set_salary(e.id, dec!(450000), dec!(45000));
    }
    let target = employees[500].clone();
    let directory = Arc::new(InMemoryEmployeeDirectory::with_employees(employees));
    let store = Arc::new(InMemoryDeductionRequestStore::new());
    let wizard = DeductionWizard::new(
        InstitutionContext::new(employer, InstitutionKind::Employer),
        DraftPolicy::affordability_check_flow(),
        directory,
        scorer,
        store,
    );

    c.bench_function("search_1000_employees", |b| {
        b.iter(|| runtime.block_on(wizard.search_employees(black_box("MWI000500"))))
    });

    c.bench_function("fill_and_submit_draft", |b| {
        b.iter(|| {
            runtime.block_on(async {
                wizard.select_employee(target.clone()).await.ok();
                for edit in [
                    DraftEdit::DeductionType(DeductionType::LoanRepayment),
                    DraftEdit::Amount("50,000".to_string()),
                    DraftEdit::StartDate(NaiveDate::from_ymd_opt(2025, 3, 1)),
                    DraftEdit::Installments("6".to_string()),
                    DraftEdit::Reason("Equipment loan".to_string()),
                ] {
                    wizard.edit(edit).await.ok();
                }
                black_box(wizard.submit().await.ok());
            })
        })
    });
}

criterion_group!(benches, bench_wizard);
criterion_main!(benches);
