//! Modelo de SurgicalConsent

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::utils::errors::AppError;

db_enum! {
    ConsentStatus {
        Pendiente => "pendiente",
        Firmado => "firmado",
        Rechazado => "rechazado",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SurgicalConsent {
    pub id: i32,
    pub pet_id: i32,
    pub owner_id: i32,
    pub veterinarian_id: i32,
    pub procedure: String,
    pub risks: Option<String>,
    pub surgery_date: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: ConsentStatus,
    pub document_url: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SurgicalConsent {
    /// Solo un consentimiento pendiente admite cambios.
    pub fn ensure_pending(&self) -> Result<(), AppError> {
        if self.status != ConsentStatus::Pendiente {
            return Err(AppError::BadRequest(format!(
                "El consentimiento ya está en estado '{}'",
                self.status
            )));
        }
        Ok(())
    }

    pub fn sign(&mut self, now: DateTime<Utc>, document_url: String) -> Result<(), AppError> {
        self.ensure_pending()?;
        self.status = ConsentStatus::Firmado;
        self.document_url = Some(document_url);
        self.signed_at = Some(now);
        Ok(())
    }

    pub fn reject(&mut self) -> Result<(), AppError> {
        self.ensure_pending()?;
        self.status = ConsentStatus::Rechazado;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consent() -> SurgicalConsent {
        SurgicalConsent {
            id: 1,
            pet_id: 1,
            owner_id: 3,
            veterinarian_id: 2,
            procedure: "Esterilización".to_string(),
            risks: None,
            surgery_date: Utc::now(),
            status: ConsentStatus::Pendiente,
            document_url: None,
            signed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sign_then_reject_is_rejected() {
        let mut c = consent();
        let now = Utc::now();
        c.sign(now, "/uploads/consents/a.pdf".to_string()).unwrap();
        assert_eq!(c.status, ConsentStatus::Firmado);
        assert_eq!(c.signed_at, Some(now));
        assert!(c.reject().is_err());
        assert_eq!(c.status, ConsentStatus::Firmado);
    }
}
