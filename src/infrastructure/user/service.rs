//! User service for registration and user management

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::storage::AttributeBag;
use crate::domain::user::{
    normalize_attributes, registration_instant, SaveOutcome, User, UserField, UserId,
    UserRepository, UserRow, UserStats, Validated, ValidationOptions,
};
use crate::domain::DomainError;
use crate::infrastructure::photo::{PhotoLoader, PhotoSource};

/// Result of a form submission
#[derive(Debug, Clone)]
pub enum Submission {
    /// Field errors were found; nothing was persisted
    Rejected(Validated<User>),
    /// The user was stored
    Saved { user: User, outcome: SaveOutcome },
}

impl Submission {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// User service wiring validation, photo ingestion and persistence
#[derive(Debug)]
pub struct UserService<R: UserRepository, P: PhotoLoader> {
    repository: Arc<R>,
    photos: Arc<P>,
    options: ValidationOptions,
}

impl<R: UserRepository, P: PhotoLoader> UserService<R, P> {
    /// Create a new user service
    pub fn new(repository: Arc<R>, photos: Arc<P>, options: ValidationOptions) -> Self {
        Self {
            repository,
            photos,
            options,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Validates a submitted form, ingests its photo and saves the user.
    ///
    /// Field errors are returned as [`Submission::Rejected`]; only storage
    /// and photo failures are errors.
    pub async fn submit(
        &self,
        attributes: &AttributeBag,
        photo: PhotoSource,
    ) -> Result<Submission, DomainError> {
        let mut attributes = normalize_attributes(attributes);

        if !has_identity(&attributes) {
            let id = self.free_id(&attributes)?;
            attributes.insert(UserField::Id.as_str().to_string(), id.to_value());
        }

        let validated = User::from_attributes_with(&attributes, &self.options);
        if validated.has_errors() {
            info!(
                user_id = %validated.value().id(),
                errors = %validated.errors(),
                "Rejected user submission"
            );
            return Ok(Submission::Rejected(validated));
        }

        let (user, errors) = validated.into_parts();
        let user = match self.photos.load(photo).await? {
            Some(reference) => user.with_photo(Some(reference)),
            None => user,
        };

        let validated = Validated::new(user, errors);
        let outcome = self.repository.save(&validated)?;
        let (user, _) = validated.into_parts();

        Ok(Submission::Saved { user, outcome })
    }

    /// First id at or after the registration instant that is not taken
    fn free_id(&self, attributes: &AttributeBag) -> Result<UserId, DomainError> {
        let instant = registration_instant(attributes.get(UserField::RegisteredAt.as_str()));
        let mut id = UserId::from_instant(&instant);

        while self.repository.contains(id)? {
            id = id.next();
        }

        debug!(user_id = %id, "Assigned id to new registration");
        Ok(id)
    }

    /// Deletes a user by id
    pub fn remove(&self, id: UserId) -> Result<(), DomainError> {
        self.repository.delete(id)
    }

    /// All stored users with their load-time field errors
    pub fn list(&self) -> Result<Vec<Validated<User>>, DomainError> {
        self.repository.list_all()
    }

    pub fn rows(&self) -> Result<Vec<UserRow>, DomainError> {
        Ok(self
            .list()?
            .iter()
            .map(|user| UserRow::from(user.value()))
            .collect())
    }

    pub fn stats(&self) -> Result<UserStats, DomainError> {
        let users = self.list()?;
        Ok(UserStats::from_users(users.iter().map(Validated::value)))
    }

    /// Removes every stored user
    pub fn clear(&self) -> Result<(), DomainError> {
        self.repository.clear()
    }
}

/// Whether the builder will see an id; falsy values count as absent
fn has_identity(attributes: &AttributeBag) -> bool {
    match attributes.get(UserField::Id.as_str()) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::photo::MockPhotoLoader;
    use crate::infrastructure::user::StorageUserRepository;
    use crate::infrastructure::storage::InMemoryBackend;
    use serde_json::json;

    fn bag(value: Value) -> AttributeBag {
        value.as_object().cloned().unwrap()
    }

    fn no_photo() -> MockPhotoLoader {
        let mut photos = MockPhotoLoader::new();
        photos.expect_load().returning(|_| Ok(None));
        photos
    }

    fn create_service(
        photos: MockPhotoLoader,
    ) -> UserService<MockUserRepository, MockPhotoLoader> {
        UserService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(photos),
            ValidationOptions::default(),
        )
    }

    fn ana() -> AttributeBag {
        bag(json!({
            "name": "Ana Silva",
            "email": "ana@x.com",
            "password": "p",
        }))
    }

    #[tokio::test]
    async fn test_submit_saves_valid_user() {
        let service = create_service(no_photo());

        let submission = service.submit(&ana(), PhotoSource::None).await.unwrap();

        match submission {
            Submission::Saved { user, outcome } => {
                assert_eq!(outcome, SaveOutcome::Inserted { position: 0 });
                assert_eq!(user.name(), Some("Ana Silva"));
                assert_eq!(user.id().as_i64(), user.registered_at().timestamp_millis());
            }
            other => panic!("expected saved, got {:?}", other),
        }
        assert_eq!(service.repository().count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_fields() {
        let mut photos = MockPhotoLoader::new();
        photos.expect_load().never();
        let service = create_service(photos);

        let submission = service
            .submit(&bag(json!({"name": "Ana1", "email": "bad"})), PhotoSource::None)
            .await
            .unwrap();

        match submission {
            Submission::Rejected(user) => {
                assert!(user.errors().contains(UserField::Name));
                assert!(user.errors().contains(UserField::Email));
                assert!(user.errors().contains(UserField::Password));
            }
            other => panic!("expected rejected, got {:?}", other),
        }
        assert_eq!(service.repository().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_submit_embeds_photo() {
        let mut photos = MockPhotoLoader::new();
        photos
            .expect_load()
            .withf(|source| matches!(source, PhotoSource::Upload(_)))
            .times(1)
            .returning(|_| Ok(Some("data:image/png;base64,AQID".to_string())));
        let service = create_service(photos);

        let submission = service
            .submit(&ana(), PhotoSource::Upload("avatar.png".into()))
            .await
            .unwrap();

        match submission {
            Submission::Saved { user, .. } => {
                assert_eq!(user.photo_ref(), Some("data:image/png;base64,AQID"));
            }
            other => panic!("expected saved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_keeps_submitted_photo_without_upload() {
        let service = create_service(no_photo());
        let mut attributes = ana();
        attributes.insert("photoRef".to_string(), json!("img/ana.png"));

        let submission = service.submit(&attributes, PhotoSource::None).await.unwrap();

        match submission {
            Submission::Saved { user, .. } => assert_eq!(user.photo_ref(), Some("img/ana.png")),
            other => panic!("expected saved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_photo_failure_saves_nothing() {
        let mut photos = MockPhotoLoader::new();
        photos
            .expect_load()
            .returning(|_| Err(DomainError::photo_ingestion("unreadable")));
        let service = create_service(photos);

        let result = service
            .submit(&ana(), PhotoSource::Upload("missing.png".into()))
            .await;

        assert!(matches!(result, Err(DomainError::PhotoIngestion { .. })));
        assert_eq!(service.repository().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_same_day_registrations_get_distinct_ids() {
        let repository = StorageUserRepository::open(
            Arc::new(InMemoryBackend::new()),
            "users",
            ValidationOptions::default(),
        )
        .unwrap();
        let service = UserService::new(
            Arc::new(repository),
            Arc::new(no_photo()),
            ValidationOptions::default(),
        );

        let first = service.submit(&ana(), PhotoSource::None).await.unwrap();
        let second = service
            .submit(
                &bag(json!({"name": "Bia", "email": "bia@x.com", "password": "p"})),
                PhotoSource::None,
            )
            .await
            .unwrap();

        assert!(first.is_saved());
        assert!(second.is_saved());

        let ids: Vec<UserId> = service
            .list()
            .unwrap()
            .iter()
            .map(|user| user.value().id())
            .collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1], ids[0].next());
    }

    #[tokio::test]
    async fn test_submit_with_id_updates() {
        let service = create_service(no_photo());
        let mut attributes = ana();
        attributes.insert("id".to_string(), json!(42));
        service.submit(&attributes, PhotoSource::None).await.unwrap();

        attributes.insert("isAdmin".to_string(), json!(true));
        let submission = service.submit(&attributes, PhotoSource::None).await.unwrap();

        match submission {
            Submission::Saved { outcome, .. } => {
                assert_eq!(outcome, SaveOutcome::Updated { position: 0 })
            }
            other => panic!("expected saved, got {:?}", other),
        }
        assert_eq!(
            service.stats().unwrap(),
            UserStats {
                users: 1,
                admins: 1
            }
        );
    }

    #[tokio::test]
    async fn test_rows_remove_and_clear() {
        let service = create_service(no_photo());
        let mut attributes = ana();
        attributes.insert("id".to_string(), json!(1));
        service.submit(&attributes, PhotoSource::None).await.unwrap();

        let rows = service.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Ana Silva");
        assert_eq!(rows[0].admin, "No");

        service.remove(UserId::new(1)).unwrap();
        assert!(service.rows().unwrap().is_empty());
        assert!(matches!(
            service.remove(UserId::new(1)),
            Err(DomainError::NotFound { .. })
        ));

        service.submit(&ana(), PhotoSource::None).await.unwrap();
        service.clear().unwrap();
        assert_eq!(service.stats().unwrap(), UserStats::default());
    }
}
