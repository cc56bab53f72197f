use crate::domains::core::document_store::{collections, EntityDocument};
use crate::domains::core::search::Searchable;
use crate::errors::{DomainError, DomainResult, StoreResult, ValidationError};
use crate::types::timestamp;
use crate::validation::{FormValidator, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review state of an evidence. `Approved` and `Rejected` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceStatus {
    Pending,
    Approved,
    Rejected,
}

impl EvidenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceStatus::Pending => "pending",
            EvidenceStatus::Approved => "approved",
            EvidenceStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EvidenceStatus::Pending => "Pendente",
            EvidenceStatus::Approved => "Aprovada",
            EvidenceStatus::Rejected => "Rejeitada",
        }
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, EvidenceStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    pub fn maps_link(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    pub action_plan_id: String,
    pub action_plan_title: String,
    pub pharmacy_id: String,
    pub pharmacy_name: String,
    pub user_id: String,
    pub user_name: String,
    /// Photo URL or storage key
    pub photo: String,
    pub status: EvidenceStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub location: Option<Location>,
    pub feedback: Option<String>,
}

impl Evidence {
    /// Checks `decision` against the current state and returns the fields to write.
    ///
    /// Only pending evidence can be reviewed. A rejection needs a non-blank
    /// reason; an approval takes optional feedback, stored as "" when absent.
    pub fn review(&self, decision: ReviewDecision, now: DateTime<Utc>) -> DomainResult<ReviewPatch> {
        let target = decision.status();
        if self.status.is_final() {
            return Err(DomainError::InvalidTransition {
                entity: format!("Evidence {}", self.id),
                from: self.status.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }

        let feedback = match decision {
            ReviewDecision::Approve { feedback } => feedback.map(|f| f.trim().to_string()).unwrap_or_default(),
            ReviewDecision::Reject { reason } => {
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err(ValidationError::required("feedback").into());
                }
                reason.to_string()
            }
        };

        Ok(ReviewPatch {
            status: target,
            feedback,
            reviewed_at: now,
        })
    }

    pub fn maps_link(&self) -> Option<String> {
        self.location.as_ref().map(Location::maps_link)
    }
}

impl Searchable for Evidence {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.action_plan_title.as_str(),
            self.pharmacy_name.as_str(),
            self.user_name.as_str(),
        ]
    }
}

/// Reviewer's verdict on a pending evidence
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewDecision {
    Approve { feedback: Option<String> },
    Reject { reason: String },
}

impl ReviewDecision {
    pub fn status(&self) -> EvidenceStatus {
        match self {
            ReviewDecision::Approve { .. } => EvidenceStatus::Approved,
            ReviewDecision::Reject { .. } => EvidenceStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    pub status: EvidenceStatus,
    pub feedback: String,
    #[serde(with = "timestamp")]
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceDocument {
    pub action_plan_id: String,
    #[serde(default)]
    pub action_plan_title: String,
    pub pharmacy_id: String,
    #[serde(default)]
    pub pharmacy_name: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub photo: String,
    pub status: EvidenceStatus,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl EntityDocument for EvidenceDocument {
    type Entity = Evidence;

    const COLLECTION: &'static str = collections::EVIDENCES;

    fn into_entity(self, id: String) -> StoreResult<Evidence> {
        Ok(Evidence {
            id,
            action_plan_id: self.action_plan_id,
            action_plan_title: self.action_plan_title,
            pharmacy_id: self.pharmacy_id,
            pharmacy_name: self.pharmacy_name,
            user_id: self.user_id,
            user_name: self.user_name,
            photo: self.photo,
            status: self.status,
            submitted_at: self.submitted_at,
            reviewed_at: self.reviewed_at,
            location: self.location,
            feedback: self.feedback,
        })
    }
}

/// Field submission of a photo against an action plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceSubmission {
    pub action_plan_id: String,
    pub pharmacy_id: String,
    pub photo: String,
    pub location: Option<Location>,
}

impl Validate for EvidenceSubmission {
    fn validate(&self) -> DomainResult<()> {
        let mut form = FormValidator::new();

        form.check(ValidationBuilder::new("actionPlanId", Some(self.action_plan_id.clone())).required());
        form.check(ValidationBuilder::new("pharmacyId", Some(self.pharmacy_id.clone())).required());
        form.check(ValidationBuilder::new("photo", Some(self.photo.clone())).required());
        if let Some(location) = &self.location {
            form.check(ValidationBuilder::new("latitude", Some(location.latitude)).range(-90.0, 90.0));
            form.check(ValidationBuilder::new("longitude", Some(location.longitude)).range(-180.0, 180.0));
        }

        form.validate()
    }
}

/// List filters of the evidences page. `None` means "all".
#[derive(Debug, Clone, Default)]
pub struct EvidenceFilter {
    pub status: Option<EvidenceStatus>,
    pub pharmacy_id: Option<String>,
    pub search: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(status: EvidenceStatus) -> Evidence {
        Evidence {
            id: "e1".to_string(),
            action_plan_id: "a1".to_string(),
            action_plan_title: "Vitrine".to_string(),
            pharmacy_id: "p1".to_string(),
            pharmacy_name: "Central".to_string(),
            user_id: "u1".to_string(),
            user_name: "Ana".to_string(),
            photo: "evidences/e1.jpg".to_string(),
            status,
            submitted_at: Some(Utc::now()),
            reviewed_at: None,
            location: None,
            feedback: None,
        }
    }

    #[test]
    fn test_reject_requires_reason() {
        let pending = evidence(EvidenceStatus::Pending);
        for reason in ["", "   "] {
            let result = pending.review(ReviewDecision::Reject { reason: reason.to_string() }, Utc::now());
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }

        let now = Utc::now();
        let patch = pending
            .review(ReviewDecision::Reject { reason: " foto borrada ".to_string() }, now)
            .unwrap();
        assert_eq!(patch.status, EvidenceStatus::Rejected);
        assert_eq!(patch.feedback, "foto borrada");
        assert_eq!(patch.reviewed_at, now);
    }

    #[test]
    fn test_approve_without_feedback() {
        let patch = evidence(EvidenceStatus::Pending)
            .review(ReviewDecision::Approve { feedback: None }, Utc::now())
            .unwrap();
        assert_eq!(patch.status, EvidenceStatus::Approved);
        assert_eq!(patch.feedback, "");
    }

    #[test]
    fn test_final_states_cannot_be_reviewed() {
        for status in [EvidenceStatus::Approved, EvidenceStatus::Rejected] {
            let result = evidence(status).review(ReviewDecision::Approve { feedback: None }, Utc::now());
            assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
        }
    }

    #[test]
    fn test_maps_link() {
        let mut e = evidence(EvidenceStatus::Pending);
        assert!(e.maps_link().is_none());
        e.location = Some(Location {
            latitude: -8.05,
            longitude: -34.9,
            address: None,
        });
        assert_eq!(e.maps_link().unwrap(), "https://www.google.com/maps?q=-8.05,-34.9");
    }

    #[test]
    fn test_submission_validation() {
        assert!(EvidenceSubmission::default().validate().is_err());
        let submission = EvidenceSubmission {
            action_plan_id: "a1".to_string(),
            pharmacy_id: "p1".to_string(),
            photo: "evidences/x.jpg".to_string(),
            location: Some(Location {
                latitude: 120.0,
                longitude: 0.0,
                address: None,
            }),
        };
        match submission.validate() {
            Err(DomainError::Form(errors)) => assert!(errors.contains("latitude")),
            other => panic!("expected form errors, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_coordinates_are_refused() {
        let submission = EvidenceSubmission {
            action_plan_id: "a1".to_string(),
            pharmacy_id: "p1".to_string(),
            photo: "evidences/x.jpg".to_string(),
            location: Some(Location {
                latitude: f64::NAN,
                longitude: f64::NAN,
                address: None,
            }),
        };
        match submission.validate() {
            Err(DomainError::Form(errors)) => {
                assert!(errors.contains("latitude"));
                assert!(errors.contains("longitude"));
            }
            other => panic!("expected form errors, got {:?}", other),
        }
    }
}
