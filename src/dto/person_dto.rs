use serde::Deserialize;
use validator::Validate;

use crate::models::person::{Person, PersonRole};
use crate::utils::validation::{validate_not_blank, DOCUMENT_REGEX, PHONE_REGEX};

// Request para registrar una persona
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePersonRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub first_name: String,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub last_name: String,
    #[validate(regex(path = "DOCUMENT_REGEX", message = "Documento inválido"))]
    pub document: String,
    #[validate(email, length(max = 150))]
    pub email: Option<String>,
    #[validate(regex(path = "PHONE_REGEX", message = "Teléfono inválido"))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    pub role: Option<PersonRole>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePersonRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub last_name: Option<String>,
    #[validate(regex(path = "DOCUMENT_REGEX", message = "Documento inválido"))]
    pub document: Option<String>,
    #[validate(email, length(max = 150))]
    pub email: Option<String>,
    #[validate(regex(path = "PHONE_REGEX", message = "Teléfono inválido"))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    pub role: Option<PersonRole>,
}

impl UpdatePersonRequest {
    pub fn merge_into(self, person: &mut Person) {
        if let Some(first_name) = self.first_name {
            person.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            person.last_name = last_name;
        }
        if let Some(document) = self.document {
            person.document = document;
        }
        if self.email.is_some() {
            person.email = self.email;
        }
        if self.phone.is_some() {
            person.phone = self.phone;
        }
        if self.address.is_some() {
            person.address = self.address;
        }
        if let Some(role) = self.role {
            person.role = role;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PersonFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Busca sobre "nombre apellido"
    pub name: Option<String>,
    pub document: Option<String>,
    pub email: Option<String>,
    pub role: Option<PersonRole>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn person() -> Person {
        Person {
            id: 1,
            first_name: "Lucía".to_string(),
            last_name: "Ramos".to_string(),
            document: "44556677".to_string(),
            email: Some("lucia@example.com".to_string()),
            phone: None,
            address: None,
            role: PersonRole::Cliente,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut p = person();
        UpdatePersonRequest {
            phone: Some("987654321".to_string()),
            role: Some(PersonRole::Staff),
            ..Default::default()
        }
        .merge_into(&mut p);

        assert_eq!(p.phone.as_deref(), Some("987654321"));
        assert_eq!(p.role, PersonRole::Staff);
        assert_eq!(p.email.as_deref(), Some("lucia@example.com"));
        assert_eq!(p.first_name, "Lucía");
    }

    #[test]
    fn test_invalid_email_and_document() {
        let request = CreatePersonRequest {
            first_name: "Lucía".to_string(),
            last_name: "Ramos".to_string(),
            document: "12".to_string(),
            email: Some("no-es-email".to_string()),
            phone: None,
            address: None,
            role: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("document"));
        assert!(fields.contains_key("email"));
    }
}
