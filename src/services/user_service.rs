use bcrypt::{hash, DEFAULT_COST};
use sqlx::PgPool;
use validator::Validate;

use crate::dto::user_dto::{CreateUserRequest, UpdateUserRequest, UserFilters, UserResponse};
use crate::models::user::UserRole;
use crate::repositories::user_repository::UserRepository;
use crate::services::person_service::PersonService;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};

const LIST_PATH: &str = "/api/users";

fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::Hash(e.to_string()))
}

pub struct UserService {
    repository: UserRepository,
    persons: PersonService,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool.clone()),
            persons: PersonService::new(pool),
        }
    }

    pub async fn create(&self, request: CreateUserRequest) -> AppResult<UserResponse> {
        request.validate()?;
        self.persons.get(request.person_id).await?;

        let password_hash = hash_password(&request.password)?;
        let user = self
            .repository
            .create(
                request.username.trim(),
                &password_hash,
                request.person_id,
                request.role.unwrap_or(UserRole::Staff),
                request.is_active.unwrap_or(true),
            )
            .await?;

        log::info!("✅ Usuario creado: {} ({})", user.username, user.role);
        self.get(user.id).await
    }

    pub async fn get(&self, id: i32) -> AppResult<UserResponse> {
        self.repository
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| not_found_error("Usuario", id))
    }

    pub async fn list(&self, filters: UserFilters) -> AppResult<Paginated<UserResponse>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (users, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(users, total, page, LIST_PATH).map(UserResponse::from))
    }

    pub async fn update(&self, id: i32, request: UpdateUserRequest) -> AppResult<UserResponse> {
        request.validate()?;
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Usuario", id))?
            .user;

        request.merge_into(&mut user);
        if let Some(password) = &request.password {
            user.password_hash = hash_password(password)?;
        }

        self.repository.update(&user).await?;
        self.get(id).await
    }

    pub async fn delete(&self, id: i32, current_user_id: i32) -> AppResult<()> {
        if id == current_user_id {
            return Err(AppError::BadRequest(
                "No puedes eliminar tu propio usuario".to_string(),
            ));
        }
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Usuario", id));
        }
        log::info!("🗑️ Usuario eliminado: {}", id);
        Ok(())
    }
}
