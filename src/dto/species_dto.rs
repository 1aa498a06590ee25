use serde::Deserialize;
use validator::Validate;

use crate::models::species::Species;
use crate::utils::validation::validate_not_blank;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSpeciesRequest {
    #[validate(length(min = 1, max = 80), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSpeciesRequest {
    #[validate(length(min = 1, max = 80), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl UpdateSpeciesRequest {
    pub fn merge_into(self, species: &mut Species) {
        if let Some(name) = self.name {
            species.name = name;
        }
        if self.description.is_some() {
            species.description = self.description;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SpeciesFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub name: Option<String>,
}
