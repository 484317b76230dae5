use roaya_types::{DataEnvelope, DeleteResponse, User, UserCreate, UserUpdate};

use crate::error::Result;
use crate::pipeline::{Pipeline, RequestOptions};

const USERS: &str = "/admin/users";

#[derive(Debug, Clone, Copy)]
pub struct UsersApi<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let envelope: DataEnvelope<Vec<User>> =
            self.pipeline.get(USERS, RequestOptions::default()).await?;
        Ok(envelope.data)
    }

    pub async fn get(&self, id: &str) -> Result<User> {
        let envelope: DataEnvelope<User> = self
            .pipeline
            .get(&format!("{USERS}/{id}"), RequestOptions::default())
            .await?;
        Ok(envelope.data)
    }

    /// The API reads the new user from query parameters, not the body.
    pub async fn create(&self, user: &UserCreate) -> Result<User> {
        let options = RequestOptions::default()
            .with_query(user.to_query())
            .success_toast(None);
        let envelope: DataEnvelope<User> = self.pipeline.post(USERS, &(), options).await?;
        Ok(envelope.data)
    }

    pub async fn update(&self, id: &str, user: &UserUpdate) -> Result<User> {
        let options = RequestOptions::default()
            .with_query(user.to_query())
            .success_toast(None);
        let envelope: DataEnvelope<User> = self
            .pipeline
            .put(&format!("{USERS}/{id}"), &(), options)
            .await?;
        Ok(envelope.data)
    }

    /// `None` when the API answers with an empty body.
    pub async fn delete(&self, id: &str) -> Result<Option<DeleteResponse>> {
        self.pipeline
            .delete(&format!("{USERS}/{id}"), RequestOptions::default())
            .await
    }
}
