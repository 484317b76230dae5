use roaya_types::{Admin, AdminProfileUpdate, AdminResponse, LoginCredentials, LoginResponse};
use tracing::{debug, info};

use crate::error::Result;
use crate::pipeline::{Pipeline, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    /// Exchange credentials for a bearer token and keep it in the
    /// credential store.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse> {
        debug!(email = %credentials.email, "log in");
        let response: LoginResponse = self
            .pipeline
            .post("/admin/login", credentials, RequestOptions::default().skip_auth())
            .await?;
        self.pipeline.session().store().set_token(&response.token)?;
        info!(admin_id = response.admin.id, "logged in");
        Ok(response)
    }

    pub async fn update_profile(&self, update: &AdminProfileUpdate) -> Result<Admin> {
        let response: AdminResponse = self
            .pipeline
            .put("/admin/profile", update, RequestOptions::default())
            .await?;
        Ok(response.admin)
    }

    /// Drop the stored token. The API has no logout endpoint.
    pub fn logout(&self) -> Result<()> {
        self.pipeline.session().store().clear()?;
        info!("logged out");
        Ok(())
    }
}
