use roaya_types::{DataEnvelope, DeleteResponse, Permission, PermissionCreate, PermissionUpdate};

use crate::error::Result;
use crate::pipeline::{Pipeline, RequestOptions};

// sic: the API spells the resource this way
const PERMISSIONS: &str = "/admin/permetion";

#[derive(Debug, Clone, Copy)]
pub struct PermissionsApi<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> PermissionsApi<'a> {
    pub(crate) fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    pub async fn list(&self) -> Result<Vec<Permission>> {
        let envelope: DataEnvelope<Vec<Permission>> =
            self.pipeline.get(PERMISSIONS, RequestOptions::default()).await?;
        Ok(envelope.data)
    }

    pub async fn get(&self, id: &str) -> Result<Permission> {
        let envelope: DataEnvelope<Permission> = self
            .pipeline
            .get(&format!("{PERMISSIONS}/{id}"), RequestOptions::default())
            .await?;
        Ok(envelope.data)
    }

    pub async fn create(&self, permission: &PermissionCreate) -> Result<Permission> {
        let options = RequestOptions::default()
            .with_query(permission.to_query())
            .success_toast(None);
        let envelope: DataEnvelope<Permission> =
            self.pipeline.post(PERMISSIONS, &(), options).await?;
        Ok(envelope.data)
    }

    pub async fn update(&self, id: &str, permission: &PermissionUpdate) -> Result<Permission> {
        let options = RequestOptions::default()
            .with_query(permission.to_query())
            .success_toast(None);
        let envelope: DataEnvelope<Permission> = self
            .pipeline
            .put(&format!("{PERMISSIONS}/{id}"), &(), options)
            .await?;
        Ok(envelope.data)
    }

    pub async fn delete(&self, id: &str) -> Result<Option<DeleteResponse>> {
        self.pipeline
            .delete(&format!("{PERMISSIONS}/{id}"), RequestOptions::default())
            .await
    }
}
