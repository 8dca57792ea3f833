use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::contact::model::{normalize_number, NewContact};
use crate::modules::contact::repository::ContactRepository;
use crate::modules::contact::schema::ContactEntity;

/// Identity resolver: one contact row per phone number.
#[derive(Clone)]
pub struct ContactService {
    repo: Arc<dyn ContactRepository + Send + Sync>,
}

impl ContactService {
    pub fn with_dependencies(repo: Arc<dyn ContactRepository + Send + Sync>) -> Self {
        ContactService { repo }
    }

    /// Finds the contact for a raw gateway identifier, creating it on first sight.
    ///
    /// The name is only used on creation. Concurrent resolves for the same
    /// number converge on the row that won the insert.
    pub async fn resolve(
        &self,
        raw_number: &str,
        name: Option<&str>,
    ) -> Result<ContactEntity, error::SystemError> {
        let number = normalize_number(raw_number)?;

        if let Some(contact) = self.repo.find_by_number(&number).await? {
            return Ok(contact);
        }

        let new_contact = NewContact {
            number: number.clone(),
            name: name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
        };

        match self.repo.create_if_absent(&new_contact).await {
            Ok(Some(contact)) => {
                tracing::info!(contact_id = %contact.id, number = %contact.number, "contact created");
                return Ok(contact);
            }
            Ok(None) => {}
            Err(e) if e.is_conflict() => {}
            Err(e) => return Err(e),
        }

        tracing::debug!(number = %number, "contact insert lost a race, re-fetching");

        self.repo.find_by_number(&number).await?.ok_or_else(|| {
            error::SystemError::internal(format!("contact {number} conflicted but is not readable"))
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ContactEntity, error::SystemError> {
        self.repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Contact not found"))
    }
}
