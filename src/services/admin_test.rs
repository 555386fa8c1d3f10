use super::*;

use crate::platform::mock::MockPlatform;
use crate::platform::Role;

fn platform_with_clients(count: usize) -> MockPlatform {
    let platform = MockPlatform::new();
    for i in 0..count {
        platform.add_profile(MockPlatform::client_profile(Uuid::new_v4(), &format!("Client{i}")));
    }
    platform
}

// ===== admin data load =====

#[tokio::test]
async fn load_returns_clients_projects_and_balances() {
    let platform = platform_with_clients(2);
    let client_id = Uuid::new_v4();
    platform.add_project(MockPlatform::project(Uuid::new_v4(), client_id, "Visible"));
    platform.set_balances(vec![ClientBalanceRow {
        client_id,
        full_name: Some("Client0".into()),
        email: Some("client0@example.com".into()),
        total_outstanding: 2500.0,
    }]);

    let data = load_admin_data(&platform, "t").await;
    assert_eq!(data.clients.len(), 2);
    assert_eq!(data.projects.len(), 1);
    assert_eq!(data.balances.len(), 1);
    assert!((data.balances[0].total_outstanding - 2500.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn load_excludes_admin_profiles_from_clients() {
    let platform = platform_with_clients(1);
    platform.add_profile(ProfileRow {
        id: Uuid::new_v4(),
        role: Role::Admin,
        full_name: Some("Root".into()),
        company_name: None,
        email: Some("root@example.com".into()),
    });

    let data = load_admin_data(&platform, "t").await;
    assert_eq!(data.clients.len(), 1);
    assert!(data.clients.iter().all(|c| c.role == Role::Client));
}

#[tokio::test]
async fn balances_failure_does_not_blank_the_rest() {
    let platform = platform_with_clients(2);
    platform.add_project(MockPlatform::project(Uuid::new_v4(), Uuid::new_v4(), "P"));
    platform.set_failures(|f| f.client_balances = true);

    let data = load_admin_data(&platform, "t").await;
    assert_eq!(data.clients.len(), 2);
    assert_eq!(data.projects.len(), 1);
    assert!(data.balances.is_empty());
}

#[tokio::test]
async fn projects_carry_owner_attributes() {
    let platform = MockPlatform::new();
    let client = MockPlatform::client_profile(Uuid::new_v4(), "Ada");
    platform.add_project(MockPlatform::project(Uuid::new_v4(), client.id, "Engine"));
    platform.add_profile(client);

    let data = load_admin_data(&platform, "t").await;
    let owner = data.projects[0].profiles.clone().unwrap();
    assert_eq!(owner.full_name.as_deref(), Some("Ada"));
    assert_eq!(owner.email.as_deref(), Some("ada@example.com"));
}

// ===== create project for client =====

#[tokio::test]
async fn create_assigns_the_chosen_client() {
    let platform = platform_with_clients(1);
    let client_id = Uuid::new_v4();
    let row = create_project_for_client(&platform, "t", client_id, "Launch".into(), None)
        .await
        .unwrap();
    assert_eq!(row.client_id, client_id);
}

// ===== demo seeding =====

#[tokio::test]
async fn seeding_three_clients_creates_three_projects_and_six_invoices() {
    let platform = platform_with_clients(3);

    let summary = seed_demo_data(&platform, "t").await.unwrap();
    assert_eq!(summary, SeedSummary { projects: 3, invoices: 6 });

    let projects = platform.projects();
    assert_eq!(projects.len(), 3);
    let invoices = platform.invoices();
    assert_eq!(invoices.len(), 6);
    let paid = invoices.iter().filter(|i| i.status == InvoiceStatus::Paid).count();
    let unpaid = invoices.iter().filter(|i| i.status == InvoiceStatus::Unpaid).count();
    assert_eq!(paid, 3);
    assert_eq!(unpaid, 3);

    // One project and two invoices per client, fixed demo amounts.
    for project in &projects {
        assert_eq!(project.status, ProjectStatus::Active);
        let mine: Vec<_> = invoices.iter().filter(|i| i.project_id == project.id).collect();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().any(|i| (i.amount - SEED_PAID_AMOUNT).abs() < f64::EPSILON));
        assert!(mine.iter().any(|i| (i.amount - SEED_UNPAID_AMOUNT).abs() < f64::EPSILON));
    }
}

#[tokio::test]
async fn seeding_with_no_clients_creates_nothing() {
    let platform = MockPlatform::new();
    let summary = seed_demo_data(&platform, "t").await.unwrap();
    assert_eq!(summary, SeedSummary::default());
}

#[tokio::test]
async fn failed_project_insert_skips_that_clients_invoices() {
    let platform = platform_with_clients(2);
    platform.set_failures(|f| f.insert_project = true);

    let summary = seed_demo_data(&platform, "t").await.unwrap();
    assert_eq!(summary, SeedSummary { projects: 0, invoices: 0 });
    assert!(platform.invoices().is_empty());
}

#[test]
fn seed_title_stamps_the_date() {
    let date = time::Date::from_calendar_date(2026, time::Month::August, 6).unwrap();
    assert_eq!(seed_project_title(date), "Website Redesign (2026-08-06)");
}
