use crate::auth::AuthContext;
use crate::domains::core::object_storage::{is_image, ObjectStorage};
use crate::domains::core::search::filter_by_search;
use crate::domains::core::workflow::WorkflowReport;
use crate::domains::pharmacy::repository::PharmacyRepository;
use crate::domains::pharmacy::types::{
    logo_key, LogoUpload, Pharmacy, PharmacyForm, PharmacyOption, MAX_LOGO_BYTES,
};
use crate::errors::{DomainError, ServiceError, ServiceResult, ValidationError};
use crate::types::{Confirmation, Permission};
use crate::validation::{validate_file_size, Validate};
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;

pub struct PharmacyService {
    repo: Arc<dyn PharmacyRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl PharmacyService {
    pub fn new(repo: Arc<dyn PharmacyRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { repo, storage }
    }

    /// Pharmacies ordered by name, narrowed by name, registration number or city.
    /// Operational users only see the pharmacies they are assigned to.
    pub async fn list_pharmacies(&self, auth: &AuthContext, search: &str) -> ServiceResult<Vec<Pharmacy>> {
        auth.authorize(Permission::ViewPharmacies)?;
        let pharmacies = self.repo.find_all().await?;
        debug!("Loaded {} pharmacies", pharmacies.len());
        let visible = pharmacies
            .into_iter()
            .filter(|p| auth.can_act_on_pharmacy(&p.id))
            .collect();
        Ok(filter_by_search(visible, search))
    }

    pub async fn get_pharmacy(&self, auth: &AuthContext, id: &str) -> ServiceResult<Pharmacy> {
        auth.authorize(Permission::ViewPharmacies)?;
        auth.authorize_pharmacy(id)?;
        Ok(self.repo.find_by_id(id).await?)
    }

    /// Id/name pairs for select inputs on other forms.
    pub async fn pharmacy_options(&self, auth: &AuthContext) -> ServiceResult<Vec<PharmacyOption>> {
        auth.authorize(Permission::ViewPharmacies)?;
        let pharmacies = self.repo.find_all().await?;
        Ok(pharmacies.iter().map(PharmacyOption::from).collect())
    }

    fn validate_logo(logo: &LogoUpload) -> Result<(), ValidationError> {
        if !validate_file_size(logo.data.len(), MAX_LOGO_BYTES) {
            return Err(ValidationError::invalid_value("logo", "must be at most 2 MB"));
        }
        if !is_image(&logo.data) {
            return Err(ValidationError::format("logo", "must be an image"));
        }
        Ok(())
    }

    /// Registers a pharmacy, then uploads its logo and records the logo key.
    ///
    /// Each step commits on its own: if the upload fails the pharmacy
    /// document stays in place and the error is a `PartialFailure`.
    pub async fn create_pharmacy(
        &self,
        auth: &AuthContext,
        form: PharmacyForm,
        logo: Option<LogoUpload>,
    ) -> ServiceResult<Pharmacy> {
        auth.authorize(Permission::ManagePharmacies)?;
        form.validate()?;
        if let Some(logo) = &logo {
            Self::validate_logo(logo).map_err(DomainError::from)?;
        }
        let targets = form.targets().map_err(DomainError::from)?;

        let mut workflow = WorkflowReport::start("create_pharmacy");
        let document = form.into_document(targets, Utc::now());
        let mut pharmacy = workflow.step("write_document", self.repo.create(&document).await)?;

        if let Some(logo) = logo {
            let key = logo_key(&pharmacy.id);
            let upload = self
                .storage
                .put_object(&key, logo.data)
                .await
                .map_err(|e| ServiceError::ExternalService(format!("Logo upload failed: {}", e)));
            workflow.step("upload_logo", upload)?;
            workflow.step("record_logo_path", self.repo.set_logo_path(&pharmacy.id, &key).await)?;
            pharmacy.logo_path = Some(key);
        }

        workflow.finish();
        info!("Pharmacy {} ({}) created by {}", pharmacy.name, pharmacy.id, auth.uid);
        Ok(pharmacy)
    }

    /// Removes the pharmacy document. Users, evidences and logos that point at it are left alone.
    pub async fn delete_pharmacy(
        &self,
        auth: &AuthContext,
        id: &str,
        confirmation: Confirmation,
    ) -> ServiceResult<()> {
        auth.authorize(Permission::ManagePharmacies)?;
        confirmation.require("delete pharmacy")?;
        self.repo.delete(id).await?;
        info!("Pharmacy {} deleted by {}", id, auth.uid);
        Ok(())
    }
}
