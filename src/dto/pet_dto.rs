use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::person::Person;
use crate::models::pet::{Pet, PetImage, PetSex};
use crate::models::species::Species;
use crate::utils::validation::{validate_not_blank, validate_past_date, validate_positive_decimal};

// Request para registrar una mascota
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePetRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub name: String,
    pub species_id: i32,
    #[validate(length(max = 100))]
    pub breed: Option<String>,
    pub sex: PetSex,
    #[validate(custom = "validate_past_date")]
    pub birth_date: Option<NaiveDate>,
    /// Edad en meses
    #[validate(range(min = 0, max = 600))]
    pub age: Option<i32>,
    #[validate(custom = "validate_positive_decimal")]
    pub weight: Option<Decimal>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[validate(length(max = 50))]
    pub microchip: Option<String>,
    pub owner_id: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePetRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub name: Option<String>,
    pub species_id: Option<i32>,
    #[validate(length(max = 100))]
    pub breed: Option<String>,
    pub sex: Option<PetSex>,
    #[validate(custom = "validate_past_date")]
    pub birth_date: Option<NaiveDate>,
    #[validate(range(min = 0, max = 600))]
    pub age: Option<i32>,
    #[validate(custom = "validate_positive_decimal")]
    pub weight: Option<Decimal>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[validate(length(max = 50))]
    pub microchip: Option<String>,
    pub owner_id: Option<i32>,
}

impl UpdatePetRequest {
    pub fn merge_into(self, pet: &mut Pet) {
        if let Some(name) = self.name {
            pet.name = name;
        }
        if let Some(species_id) = self.species_id {
            pet.species_id = species_id;
        }
        if self.breed.is_some() {
            pet.breed = self.breed;
        }
        if let Some(sex) = self.sex {
            pet.sex = sex;
        }
        if self.birth_date.is_some() {
            pet.birth_date = self.birth_date;
        }
        if self.age.is_some() {
            pet.age = self.age;
        }
        if self.weight.is_some() {
            pet.weight = self.weight;
        }
        if self.color.is_some() {
            pet.color = self.color;
        }
        if self.microchip.is_some() {
            pet.microchip = self.microchip;
        }
        if let Some(owner_id) = self.owner_id {
            pet.owner_id = owner_id;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PetFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub name: Option<String>,
    pub owner_id: Option<i32>,
    pub species_id: Option<i32>,
    pub sex: Option<PetSex>,
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
}

/// Ficha de la mascota con dueño, especie e imágenes
#[derive(Debug, Serialize)]
pub struct PetDetailResponse {
    #[serde(flatten)]
    pub pet: Pet,
    pub owner: Person,
    pub species: Species,
    pub main_image_url: Option<String>,
    pub images: Vec<PetImage>,
}

impl PetDetailResponse {
    pub fn new(pet: Pet, owner: Person, species: Species, images: Vec<PetImage>) -> Self {
        let main_image_url = images.iter().find(|i| i.is_main).map(|i| i.url.clone());
        Self {
            pet,
            owner,
            species,
            main_image_url,
            images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pet() -> Pet {
        Pet {
            id: 1,
            name: "Firulais".to_string(),
            species_id: 1,
            breed: None,
            sex: PetSex::Macho,
            birth_date: None,
            age: None,
            weight: None,
            color: Some("negro".to_string()),
            microchip: None,
            owner_id: 2,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_sets_age_and_keeps_color() {
        let mut p = pet();
        UpdatePetRequest {
            age: Some(14),
            weight: Some(Decimal::new(123, 1)),
            ..Default::default()
        }
        .merge_into(&mut p);

        assert_eq!(p.age_in_months(), 14);
        assert_eq!(p.weight, Some(Decimal::new(123, 1)));
        assert_eq!(p.color.as_deref(), Some("negro"));
    }

    #[test]
    fn test_negative_age_and_weight_are_invalid() {
        let request = UpdatePetRequest {
            age: Some(-1),
            weight: Some(Decimal::new(-5, 0)),
            ..Default::default()
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("age"));
        assert!(errors.field_errors().contains_key("weight"));
    }

    #[test]
    fn test_weight_accepts_json_number() {
        let request: CreatePetRequest = serde_json::from_str(
            r#"{"name":"Michi","species_id":2,"sex":"hembra","weight":4.25,"owner_id":1}"#,
        )
        .unwrap();
        assert_eq!(request.weight, Some(Decimal::new(425, 2)));
        assert!(request.validate().is_ok());
    }
}
