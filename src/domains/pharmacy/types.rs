use crate::domains::core::document_store::{collections, EntityDocument};
use crate::domains::core::search::Searchable;
use crate::errors::{DomainResult, StoreResult, ValidationError};
use crate::types::{timestamp, RecordStatus};
use crate::validation::{parse_decimal, FormValidator, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIMARY_COLOR: &str = "#4B9EFF";
pub const DEFAULT_SECONDARY_COLOR: &str = "#6C63FF";
pub const DEFAULT_UVC_TARGET: Decimal = dec!(2.10);
pub const DEFAULT_TICKET_TARGET: Decimal = dec!(95.00);
pub const DEFAULT_PRICE_TARGET: Decimal = dec!(45.00);

/// Largest accepted logo upload.
pub const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

/// Storage key of a pharmacy's logo.
pub fn logo_key(pharmacy_id: &str) -> String {
    format!("pharmacies/{}/logo", pharmacy_id)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Performance targets a pharmacy is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Targets {
    /// Units per coupon
    pub uvc: Decimal,
    /// Average ticket
    pub ticket: Decimal,
    /// Average unit price
    pub price: Decimal,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            uvc: DEFAULT_UVC_TARGET,
            ticket: DEFAULT_TICKET_TARGET,
            price: DEFAULT_PRICE_TARGET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pharmacy {
    pub id: String,
    pub name: String,
    /// Company registration number, `XX.XXX.XXX/XXXX-XX`
    pub cnpj: String,
    pub responsible_name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub primary_color: String,
    pub secondary_color: String,
    pub logo_path: Option<String>,
    pub targets: Targets,
    pub status: RecordStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Searchable for Pharmacy {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.cnpj.as_str(), self.address.city.as_str()]
    }
}

/// Stored shape of a `pharmacies` document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyDocument {
    pub name: String,
    #[serde(default)]
    pub cnpj: String,
    #[serde(default)]
    pub responsible_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub complement: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default = "default_secondary_color")]
    pub secondary_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
    #[serde(default = "default_uvc")]
    pub uvc_target: Decimal,
    #[serde(default = "default_ticket")]
    pub ticket_target: Decimal,
    #[serde(default = "default_price")]
    pub price_target: Decimal,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_primary_color() -> String {
    DEFAULT_PRIMARY_COLOR.to_string()
}

fn default_secondary_color() -> String {
    DEFAULT_SECONDARY_COLOR.to_string()
}

fn default_uvc() -> Decimal {
    DEFAULT_UVC_TARGET
}

fn default_ticket() -> Decimal {
    DEFAULT_TICKET_TARGET
}

fn default_price() -> Decimal {
    DEFAULT_PRICE_TARGET
}

impl EntityDocument for PharmacyDocument {
    type Entity = Pharmacy;

    const COLLECTION: &'static str = collections::PHARMACIES;

    fn into_entity(self, id: String) -> StoreResult<Pharmacy> {
        Ok(Pharmacy {
            id,
            name: self.name,
            cnpj: self.cnpj,
            responsible_name: self.responsible_name,
            email: self.email,
            phone: self.phone,
            address: Address {
                street: self.street,
                number: self.number,
                complement: self.complement,
                neighborhood: self.neighborhood,
                city: self.city,
                state: self.state,
                zip_code: self.zip_code,
            },
            primary_color: self.primary_color,
            secondary_color: self.secondary_color,
            logo_path: self.logo_path,
            targets: Targets {
                uvc: self.uvc_target,
                ticket: self.ticket_target,
                price: self.price_target,
            },
            status: self.status,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoPatch {
    pub logo_path: String,
}

/// Registration form. Targets are kept as typed text until submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacyForm {
    pub name: String,
    pub cnpj: String,
    pub responsible_name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub primary_color: String,
    pub secondary_color: String,
    pub uvc_target: String,
    pub ticket_target: String,
    pub price_target: String,
    pub status: RecordStatus,
}

impl Default for PharmacyForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            cnpj: String::new(),
            responsible_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: Address::default(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            uvc_target: DEFAULT_UVC_TARGET.to_string(),
            ticket_target: DEFAULT_TICKET_TARGET.to_string(),
            price_target: DEFAULT_PRICE_TARGET.to_string(),
            status: RecordStatus::Active,
        }
    }
}

impl Validate for PharmacyForm {
    fn validate(&self) -> DomainResult<()> {
        let mut form = FormValidator::new();

        form.check(ValidationBuilder::new("name", Some(self.name.clone())).required());
        form.check(
            ValidationBuilder::new("cnpj", Some(self.cnpj.clone()))
                .required()
                .cnpj(),
        );
        form.check(
            ValidationBuilder::new("responsibleName", Some(self.responsible_name.clone())).required(),
        );
        form.check(
            ValidationBuilder::new("email", Some(self.email.clone()))
                .required()
                .email(),
        );
        form.check(ValidationBuilder::new("primaryColor", Some(self.primary_color.clone())).hex_color());
        form.check(
            ValidationBuilder::new("secondaryColor", Some(self.secondary_color.clone())).hex_color(),
        );
        for (field, value) in [
            ("uvcTarget", &self.uvc_target),
            ("ticketTarget", &self.ticket_target),
            ("priceTarget", &self.price_target),
        ] {
            form.check(ValidationBuilder::new(field, Some(value.clone())).non_negative_decimal());
        }

        form.validate()
    }
}

impl PharmacyForm {
    /// Parsed targets. Call after `validate`.
    pub fn targets(&self) -> Result<Targets, ValidationError> {
        let parse = |field: &str, value: &str| {
            parse_decimal(value)
                .ok_or_else(|| ValidationError::format(field, "must be a non-negative number"))
        };
        Ok(Targets {
            uvc: parse("uvcTarget", &self.uvc_target)?,
            ticket: parse("ticketTarget", &self.ticket_target)?,
            price: parse("priceTarget", &self.price_target)?,
        })
    }

    pub fn into_document(self, targets: Targets, created_at: DateTime<Utc>) -> PharmacyDocument {
        PharmacyDocument {
            name: self.name.trim().to_string(),
            cnpj: self.cnpj.trim().to_string(),
            responsible_name: self.responsible_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            street: self.address.street,
            number: self.address.number,
            complement: self.address.complement,
            neighborhood: self.address.neighborhood,
            city: self.address.city,
            state: self.address.state,
            zip_code: self.address.zip_code,
            primary_color: self.primary_color,
            secondary_color: self.secondary_color,
            logo_path: None,
            uvc_target: targets.uvc,
            ticket_target: targets.ticket,
            price_target: targets.price,
            status: self.status,
            created_at: Some(created_at),
        }
    }
}

/// Logo chosen in the registration form
#[derive(Debug, Clone)]
pub struct LogoUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Lightweight id/name pair for select inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PharmacyOption {
    pub id: String,
    pub name: String,
}

impl From<&Pharmacy> for PharmacyOption {
    fn from(pharmacy: &Pharmacy) -> Self {
        Self {
            id: pharmacy.id.clone(),
            name: pharmacy.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::core::document_store::{decode, StoredDocument};
    use crate::errors::DomainError;
    use serde_json::json;

    fn valid_form() -> PharmacyForm {
        PharmacyForm {
            name: "Farmácia Central".to_string(),
            cnpj: "12.345.678/0001-90".to_string(),
            responsible_name: "Rita".to_string(),
            email: "central@farmup.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let form = PharmacyForm::default();
        assert_eq!(form.primary_color, "#4B9EFF");
        assert_eq!(form.secondary_color, "#6C63FF");
        assert_eq!(form.uvc_target, "2.10");
        assert_eq!(form.ticket_target, "95.00");
        assert_eq!(form.price_target, "45.00");
    }

    #[test]
    fn test_form_validation() {
        assert!(valid_form().validate().is_ok());

        let form = PharmacyForm {
            cnpj: "12345678000190".to_string(),
            primary_color: "blue".to_string(),
            ticket_target: "abc".to_string(),
            ..valid_form()
        };
        match form.validate() {
            Err(DomainError::Form(errors)) => {
                assert!(errors.contains("cnpj"));
                assert!(errors.contains("primaryColor"));
                assert!(errors.contains("ticketTarget"));
                assert!(!errors.contains("name"));
            }
            other => panic!("expected form errors, got {:?}", other),
        }
    }

    #[test]
    fn test_targets_accept_decimal_comma() {
        let form = PharmacyForm {
            ticket_target: "99,90".to_string(),
            ..valid_form()
        };
        let targets = form.targets().unwrap();
        assert_eq!(targets.ticket, dec!(99.90));
        assert_eq!(targets.uvc, dec!(2.10));
    }

    #[test]
    fn test_decode_defaults_missing_fields() {
        let map = match json!({"name": "Drogaria Sul", "city": "Olinda", "uvcTarget": 2.5}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let pharmacy = decode::<PharmacyDocument>(StoredDocument::new("p1", map)).unwrap();
        assert_eq!(pharmacy.address.city, "Olinda");
        assert_eq!(pharmacy.targets.uvc, dec!(2.5));
        assert_eq!(pharmacy.targets.ticket, DEFAULT_TICKET_TARGET);
        assert_eq!(pharmacy.status, RecordStatus::Active);
        assert!(pharmacy.logo_path.is_none());
    }

    #[test]
    fn test_logo_key() {
        assert_eq!(logo_key("abc"), "pharmacies/abc/logo");
    }
}
