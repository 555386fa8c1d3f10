//! In-memory platform fake for tests.
//!
//! Behaves like the real platform at the trait boundary: rows live in maps,
//! deletes cascade, the signing endpoint mints a fresh URL per call, and any
//! operation can be made to fail via [`MockFailures`] to exercise degraded
//! paths.

use std::sync::Mutex;

use uuid::Uuid;

use super::types::{
    AuthSession, AuthUser, ClientBalanceRow, InvoiceRow, InvoiceStatus, NewInvoice, NewProject,
    PlatformError, ProfilePatch, ProfileRow, ProjectOwner, ProjectPatch, ProjectRow,
    ProjectStatus, ProjectWithOwner, Role,
};
use super::Platform;

/// Switches that make individual operations fail with a server error.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockFailures {
    pub sign_in: bool,
    pub fetch_profile: bool,
    pub list_projects: bool,
    pub list_invoices: bool,
    pub insert_project: bool,
    pub update_project_status: bool,
    pub insert_invoice: bool,
    pub upload_object: bool,
    pub client_balances: bool,
    pub create_signed_url: bool,
}

#[derive(Default)]
struct MockData {
    profiles: Vec<ProfileRow>,
    projects: Vec<ProjectRow>,
    invoices: Vec<InvoiceRow>,
    balances: Vec<ClientBalanceRow>,
    /// Storage paths in upload order.
    uploads: Vec<String>,
    /// Coarse operation log for ordering assertions.
    ops: Vec<String>,
    signed_counter: u64,
    failures: MockFailures,
    signup_requires_confirmation: bool,
}

pub struct MockPlatform {
    data: Mutex<MockData>,
}

fn server_error(op: &str) -> PlatformError {
    PlatformError::Api { status: 500, message: format!("{op} failed") }
}

impl MockPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self { data: Mutex::new(MockData::default()) }
    }

    pub fn set_failures(&self, f: impl FnOnce(&mut MockFailures)) {
        f(&mut self.data.lock().unwrap().failures);
    }

    pub fn require_signup_confirmation(&self) {
        self.data.lock().unwrap().signup_requires_confirmation = true;
    }

    pub fn add_profile(&self, profile: ProfileRow) {
        self.data.lock().unwrap().profiles.push(profile);
    }

    pub fn add_project(&self, project: ProjectRow) {
        self.data.lock().unwrap().projects.push(project);
    }

    pub fn add_invoice(&self, invoice: InvoiceRow) {
        self.data.lock().unwrap().invoices.push(invoice);
    }

    pub fn set_balances(&self, balances: Vec<ClientBalanceRow>) {
        self.data.lock().unwrap().balances = balances;
    }

    #[must_use]
    pub fn projects(&self) -> Vec<ProjectRow> {
        self.data.lock().unwrap().projects.clone()
    }

    #[must_use]
    pub fn invoices(&self) -> Vec<InvoiceRow> {
        self.data.lock().unwrap().invoices.clone()
    }

    #[must_use]
    pub fn uploads(&self) -> Vec<String> {
        self.data.lock().unwrap().uploads.clone()
    }

    #[must_use]
    pub fn ops(&self) -> Vec<String> {
        self.data.lock().unwrap().ops.clone()
    }

    /// Convenience: a client profile row.
    #[must_use]
    pub fn client_profile(id: Uuid, name: &str) -> ProfileRow {
        ProfileRow {
            id,
            role: Role::Client,
            full_name: Some(name.to_string()),
            company_name: None,
            email: Some(format!("{}@example.com", name.to_lowercase())),
        }
    }

    /// Convenience: a project row owned by `client_id`.
    #[must_use]
    pub fn project(id: Uuid, client_id: Uuid, title: &str) -> ProjectRow {
        ProjectRow {
            id,
            title: title.to_string(),
            description: None,
            client_id,
            status: ProjectStatus::Active,
            created_at: None,
        }
    }

    /// Convenience: an invoice row.
    #[must_use]
    pub fn invoice(project_id: Uuid, amount: f64, status: InvoiceStatus) -> InvoiceRow {
        InvoiceRow {
            id: Uuid::new_v4(),
            project_id,
            amount,
            status,
            pdf_url: Some(format!("{project_id}/demo.pdf")),
            created_at: None,
        }
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Platform for MockPlatform {
    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<Option<AuthSession>, PlatformError> {
        let mut data = self.data.lock().unwrap();
        data.ops.push("sign_up".into());
        if data.signup_requires_confirmation {
            return Ok(None);
        }
        let id = Uuid::new_v4();
        Ok(Some(AuthSession {
            access_token: format!("access-{id}"),
            expires_in: 3600,
            user: AuthUser { id, email: Some(email.to_string()) },
        }))
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<AuthSession, PlatformError> {
        let mut data = self.data.lock().unwrap();
        data.ops.push("sign_in".into());
        if data.failures.sign_in {
            return Err(PlatformError::Api {
                status: 400,
                message: "Invalid login credentials".into(),
            });
        }
        let profile = data
            .profiles
            .iter()
            .find(|p| p.email.as_deref() == Some(email))
            .ok_or(PlatformError::Api {
                status: 400,
                message: "Invalid login credentials".into(),
            })?;
        Ok(AuthSession {
            access_token: format!("access-{}", profile.id),
            expires_in: 3600,
            user: AuthUser { id: profile.id, email: profile.email.clone() },
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), PlatformError> {
        self.data.lock().unwrap().ops.push("sign_out".into());
        Ok(())
    }

    async fn fetch_profile(
        &self,
        _token: &str,
        user_id: Uuid,
    ) -> Result<ProfileRow, PlatformError> {
        let data = self.data.lock().unwrap();
        if data.failures.fetch_profile {
            return Err(server_error("fetch_profile"));
        }
        data.profiles
            .iter()
            .find(|p| p.id == user_id)
            .cloned()
            .ok_or(PlatformError::NotFound)
    }

    async fn update_profile(
        &self,
        _token: &str,
        user_id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<(), PlatformError> {
        let mut data = self.data.lock().unwrap();
        if let Some(profile) = data.profiles.iter_mut().find(|p| p.id == user_id) {
            profile.full_name = patch.full_name.clone();
            profile.company_name = patch.company_name.clone();
        }
        Ok(())
    }

    async fn list_client_profiles(&self, _token: &str) -> Result<Vec<ProfileRow>, PlatformError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .profiles
            .iter()
            .filter(|p| p.role == Role::Client)
            .cloned()
            .collect())
    }

    async fn list_projects(&self, _token: &str) -> Result<Vec<ProjectRow>, PlatformError> {
        let data = self.data.lock().unwrap();
        if data.failures.list_projects {
            return Err(server_error("list_projects"));
        }
        // Newest first: reverse insertion order.
        Ok(data.projects.iter().rev().cloned().collect())
    }

    async fn list_projects_with_owner(
        &self,
        _token: &str,
    ) -> Result<Vec<ProjectWithOwner>, PlatformError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .projects
            .iter()
            .rev()
            .map(|project| {
                let owner = data
                    .profiles
                    .iter()
                    .find(|p| p.id == project.client_id)
                    .map(|p| ProjectOwner {
                        full_name: p.full_name.clone(),
                        email: p.email.clone(),
                    });
                ProjectWithOwner { project: project.clone(), profiles: owner }
            })
            .collect())
    }

    async fn insert_project(
        &self,
        _token: &str,
        project: &NewProject,
    ) -> Result<ProjectRow, PlatformError> {
        let mut data = self.data.lock().unwrap();
        data.ops.push("insert_project".into());
        if data.failures.insert_project {
            return Err(server_error("insert_project"));
        }
        let row = ProjectRow {
            id: Uuid::new_v4(),
            title: project.title.clone(),
            description: project.description.clone(),
            client_id: project.client_id,
            status: project.status.unwrap_or(ProjectStatus::Active),
            created_at: None,
        };
        data.projects.push(row.clone());
        Ok(row)
    }

    async fn update_project(
        &self,
        _token: &str,
        project_id: Uuid,
        patch: &ProjectPatch,
    ) -> Result<(), PlatformError> {
        let mut data = self.data.lock().unwrap();
        if let Some(project) = data.projects.iter_mut().find(|p| p.id == project_id) {
            project.title = patch.title.clone();
            project.description = patch.description.clone();
        }
        Ok(())
    }

    async fn update_project_status(
        &self,
        _token: &str,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> Result<(), PlatformError> {
        let mut data = self.data.lock().unwrap();
        data.ops.push("update_project_status".into());
        if data.failures.update_project_status {
            return Err(server_error("update_project_status"));
        }
        if let Some(project) = data.projects.iter_mut().find(|p| p.id == project_id) {
            project.status = status;
        }
        Ok(())
    }

    async fn delete_project(&self, _token: &str, project_id: Uuid) -> Result<(), PlatformError> {
        let mut data = self.data.lock().unwrap();
        data.ops.push("delete_project".into());
        data.projects.retain(|p| p.id != project_id);
        // Platform-side cascade.
        data.invoices.retain(|i| i.project_id != project_id);
        Ok(())
    }

    async fn list_invoices(
        &self,
        _token: &str,
        project_id: Uuid,
    ) -> Result<Vec<InvoiceRow>, PlatformError> {
        let data = self.data.lock().unwrap();
        if data.failures.list_invoices {
            return Err(server_error("list_invoices"));
        }
        Ok(data
            .invoices
            .iter()
            .rev()
            .filter(|i| i.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn insert_invoice(
        &self,
        _token: &str,
        invoice: &NewInvoice,
    ) -> Result<(), PlatformError> {
        let mut data = self.data.lock().unwrap();
        data.ops.push("insert_invoice".into());
        if data.failures.insert_invoice {
            return Err(server_error("insert_invoice"));
        }
        let row = InvoiceRow {
            id: Uuid::new_v4(),
            project_id: invoice.project_id,
            amount: invoice.amount,
            status: invoice.status,
            pdf_url: invoice.pdf_url.clone(),
            created_at: None,
        };
        data.invoices.push(row);
        Ok(())
    }

    async fn client_balances(&self, _token: &str) -> Result<Vec<ClientBalanceRow>, PlatformError> {
        let data = self.data.lock().unwrap();
        if data.failures.client_balances {
            return Err(server_error("client_balances"));
        }
        Ok(data.balances.clone())
    }

    async fn upload_object(
        &self,
        _token: &str,
        _bucket: &str,
        path: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), PlatformError> {
        let mut data = self.data.lock().unwrap();
        data.ops.push("upload_object".into());
        if data.failures.upload_object {
            return Err(server_error("upload_object"));
        }
        data.uploads.push(path.to_string());
        Ok(())
    }

    async fn create_signed_url(
        &self,
        _token: &str,
        bucket: &str,
        path: &str,
        expires_secs: u32,
    ) -> Result<String, PlatformError> {
        let mut data = self.data.lock().unwrap();
        if data.failures.create_signed_url {
            return Err(server_error("create_signed_url"));
        }
        data.signed_counter += 1;
        let counter = data.signed_counter;
        Ok(format!(
            "https://mock.platform/storage/v1/object/sign/{bucket}/{path}?token=t{counter}&expires={expires_secs}"
        ))
    }
}
