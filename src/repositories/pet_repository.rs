use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::dto::pet_dto::{CreatePetRequest, PetFilters};
use crate::models::pet::{Pet, PetImage};
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

const PET_CONSTRAINT: &str = "La mascota tiene registros asociados";

pub struct PetRepository {
    pool: PgPool,
}

impl PetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreatePetRequest) -> Result<Pet, AppError> {
        let pet = sqlx::query_as::<_, Pet>(
            r#"
            INSERT INTO pets (name, species_id, breed, sex, birth_date, age, weight, color, microchip, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(request.name.trim())
        .bind(request.species_id)
        .bind(request.breed)
        .bind(request.sex.as_str())
        .bind(request.birth_date)
        .bind(request.age)
        .bind(request.weight)
        .bind(request.color)
        .bind(request.microchip)
        .bind(request.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(pet)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Pet>, AppError> {
        let pet = sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(pet)
    }

    /// Bloquea la fila de la mascota hasta el fin de la transacción.
    pub async fn lock(conn: &mut PgConnection, id: i32) -> Result<Option<Pet>, AppError> {
        let pet = sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(pet)
    }

    pub async fn list(&self, filters: &PetFilters, page: PageRequest) -> Result<(Vec<Pet>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM pets");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM pets");
        apply_filters(&mut select, filters);
        push_page(&mut select, "id DESC", page);
        let pets = select.build_query_as::<Pet>().fetch_all(&self.pool).await?;

        Ok((pets, total))
    }

    pub async fn update(&self, pet: &Pet) -> Result<Pet, AppError> {
        let pet = sqlx::query_as::<_, Pet>(
            r#"
            UPDATE pets
            SET name = $2, species_id = $3, breed = $4, sex = $5, birth_date = $6,
                age = $7, weight = $8, color = $9, microchip = $10, owner_id = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(pet.id)
        .bind(&pet.name)
        .bind(pet.species_id)
        .bind(&pet.breed)
        .bind(pet.sex.as_str())
        .bind(pet.birth_date)
        .bind(pet.age)
        .bind(pet.weight)
        .bind(&pet.color)
        .bind(&pet.microchip)
        .bind(pet.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(pet)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, PET_CONSTRAINT))?;

        Ok(result.rows_affected() > 0)
    }

    // Imágenes

    pub async fn images(&self, pet_id: i32) -> Result<Vec<PetImage>, AppError> {
        let images = sqlx::query_as::<_, PetImage>(
            "SELECT * FROM pet_images WHERE pet_id = $1 ORDER BY is_main DESC, created_at DESC, id DESC",
        )
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    pub async fn lock_image(conn: &mut PgConnection, id: i32) -> Result<Option<PetImage>, AppError> {
        let image = sqlx::query_as::<_, PetImage>("SELECT * FROM pet_images WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(image)
    }

    pub async fn has_main_image(conn: &mut PgConnection, pet_id: i32) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pet_images WHERE pet_id = $1 AND is_main)")
                .bind(pet_id)
                .fetch_one(conn)
                .await?;

        Ok(exists)
    }

    pub async fn insert_image(
        conn: &mut PgConnection,
        pet_id: i32,
        url: &str,
        is_main: bool,
    ) -> Result<PetImage, AppError> {
        let image = sqlx::query_as::<_, PetImage>(
            "INSERT INTO pet_images (pet_id, url, is_main) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(pet_id)
        .bind(url)
        .bind(is_main)
        .fetch_one(conn)
        .await?;

        Ok(image)
    }

    pub async fn clear_main_image(conn: &mut PgConnection, pet_id: i32) -> Result<(), AppError> {
        sqlx::query("UPDATE pet_images SET is_main = FALSE WHERE pet_id = $1 AND is_main")
            .bind(pet_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn mark_main_image(conn: &mut PgConnection, id: i32) -> Result<PetImage, AppError> {
        let image = sqlx::query_as::<_, PetImage>(
            "UPDATE pet_images SET is_main = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(conn)
        .await?;

        Ok(image)
    }

    pub async fn delete_image(conn: &mut PgConnection, id: i32) -> Result<(), AppError> {
        sqlx::query("DELETE FROM pet_images WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Promueve la imagen más reciente que quede como principal.
    pub async fn promote_latest_image(conn: &mut PgConnection, pet_id: i32) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE pet_images SET is_main = TRUE
            WHERE id = (
                SELECT id FROM pet_images WHERE pet_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            )
            "#,
        )
        .bind(pet_id)
        .execute(conn)
        .await?;

        Ok(())
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &PetFilters) {
    WhereClause::new(builder)
        .contains("name", filters.name.as_deref())
        .eq("owner_id", filters.owner_id)
        .eq("species_id", filters.species_id)
        .eq("sex", filters.sex.map(|s| s.as_str()))
        .between("age", filters.age_min, filters.age_max);
}
