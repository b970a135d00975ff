use std::sync::Arc;

use chrono::{DateTime, Local};
use database::model::person::Person;
use serde::Deserialize;

use crate::{
    error::{PersonField, PhonebookError, ValidationError},
    store::{NewPerson, PersonFields, PersonStore, StoreError},
};

/// Body of `POST /api/persons`
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewPersonRequest {
    pub name: Option<String>,
    pub number: Option<String>,
}

/// Body of `PUT /api/persons/{id}`, absent fields are left unchanged
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdatePersonRequest {
    pub name: Option<String>,
    pub number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PhonebookInfo {
    pub count: usize,
    pub generated_at: DateTime<Local>,
}

impl PhonebookInfo {
    pub fn render_html(&self) -> String {
        format!(
            r#"<!doctype html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Info</title>
</head>
<body>
<p>Phonebook has info for {} people</p>
<p>{}</p>
</body>
</html>"#,
            self.count,
            self.generated_at.format("%a %b %d %Y %H:%M:%S GMT%z")
        )
    }
}

pub struct PhonebookService {
    store: Arc<dyn PersonStore>,
}

impl PhonebookService {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Person>, PhonebookError> {
        Ok(self.store.find_all().await?)
    }

    /// Every validation failure is reported at once, nothing is stored unless all pass
    pub async fn create(&self, request: NewPersonRequest) -> Result<Person, PhonebookError> {
        let mut errors = vec![];

        let name = required(request.name, PersonField::Name, &mut errors);
        let number = required(request.number, PersonField::Number, &mut errors);

        if let Some(name) = &name {
            if !self.store.find_by_name(name).await?.is_empty() {
                errors.push(ValidationError::DuplicateName);
            }
        }

        let (Some(name), Some(number), true) = (name, number, errors.is_empty()) else {
            return Err(PhonebookError::Validation(errors));
        };

        match self.store.create(NewPerson { name, number }).await {
            Ok(person) => Ok(person),
            // Another create claimed the name after our check
            Err(StoreError::DuplicateName(_)) => Err(PhonebookError::Validation(vec![
                ValidationError::DuplicateName,
            ])),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Person, PhonebookError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| PhonebookError::NotFound(id.to_string()))
    }

    pub async fn update(
        &self,
        id: &str,
        request: UpdatePersonRequest,
    ) -> Result<Person, PhonebookError> {
        let fields = PersonFields {
            name: request.name,
            number: request.number,
        };

        self.store
            .update_by_id(id, fields)
            .await?
            .ok_or_else(|| PhonebookError::NotFound(id.to_string()))
    }

    /// Deleting a person that does not exist succeeds
    pub async fn delete(&self, id: &str) -> Result<(), PhonebookError> {
        if self.store.delete_by_id(id).await?.is_none() {
            log::debug!("Delete of missing person: {}", id);
        }

        Ok(())
    }

    pub async fn info(&self) -> Result<PhonebookInfo, PhonebookError> {
        Ok(PhonebookInfo {
            count: self.store.count().await?,
            generated_at: Local::now(),
        })
    }
}

fn required(
    value: Option<String>,
    field: PersonField,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    match value {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            errors.push(ValidationError::MissingField(field));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use database::database::{database::Database, options::DatabaseOptions};
    use rstest::rstest;

    use super::*;
    use crate::store::StoreResult;

    fn service() -> PhonebookService {
        let request_manager = Database::new(DatabaseOptions::new_test())
            .expect("in memory database")
            .run()
            .expect("database thread");

        PhonebookService::new(Arc::new(request_manager))
    }

    fn new_person(name: &str, number: &str) -> NewPersonRequest {
        NewPersonRequest {
            name: Some(name.to_string()),
            number: Some(number.to_string()),
        }
    }

    fn validation_errors(result: Result<Person, PhonebookError>) -> Vec<ValidationError> {
        match result {
            Err(PhonebookError::Validation(errors)) => errors,
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[rstest]
    #[case(None, None, vec![ValidationError::MissingField(PersonField::Name), ValidationError::MissingField(PersonField::Number)])]
    #[case(Some(""), Some("040-123456"), vec![ValidationError::MissingField(PersonField::Name)])]
    #[case(Some("Arto Hellas"), None, vec![ValidationError::MissingField(PersonField::Number)])]
    #[case(Some("Ada Lovelace"), Some(""), vec![ValidationError::DuplicateName, ValidationError::MissingField(PersonField::Number)])]
    #[actix_web::test]
    async fn create_reports_every_validation_failure(
        #[case] name: Option<&str>,
        #[case] number: Option<&str>,
        #[case] expected: Vec<ValidationError>,
    ) {
        let service = service();
        service
            .create(new_person("Ada Lovelace", "39-44-5323523"))
            .await
            .unwrap();

        let request = NewPersonRequest {
            name: name.map(str::to_string),
            number: number.map(str::to_string),
        };

        let mut errors = validation_errors(service.create(request).await);

        let mut expected = expected;

        errors.sort_by_key(ToString::to_string);
        expected.sort_by_key(ToString::to_string);

        assert_eq!(errors, expected);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    /// Another create claims the name between the lookup and the insert
    struct NameTakenOnInsert;

    #[async_trait]
    impl PersonStore for NameTakenOnInsert {
        async fn find_all(&self) -> StoreResult<Vec<Person>> {
            Ok(vec![])
        }

        async fn find_by_name(&self, _name: &str) -> StoreResult<Vec<Person>> {
            Ok(vec![])
        }

        async fn find_by_id(&self, _id: &str) -> StoreResult<Option<Person>> {
            Ok(None)
        }

        async fn create(&self, person: NewPerson) -> StoreResult<Person> {
            Err(StoreError::DuplicateName(person.name))
        }

        async fn update_by_id(
            &self,
            _id: &str,
            _fields: PersonFields,
        ) -> StoreResult<Option<Person>> {
            Ok(None)
        }

        async fn delete_by_id(&self, _id: &str) -> StoreResult<Option<Person>> {
            Ok(None)
        }

        async fn count(&self) -> StoreResult<usize> {
            Ok(0)
        }
    }

    #[actix_web::test]
    async fn duplicate_found_on_insert_is_a_validation_failure() {
        let service = PhonebookService::new(Arc::new(NameTakenOnInsert));

        let errors = validation_errors(
            service
                .create(new_person("Ada Lovelace", "39-44-5323523"))
                .await,
        );

        assert_eq!(errors, vec![ValidationError::DuplicateName]);
    }

    #[actix_web::test]
    async fn create_then_get_round_trips() {
        let service = service();

        let created = service
            .create(new_person("Ada Lovelace", "39-44-5323523"))
            .await
            .unwrap();

        let fetched = service.get_by_id(created.id.as_str()).await.unwrap();

        assert!(!created.id.as_str().is_empty());
        assert_eq!(fetched.name, "Ada Lovelace");
        assert_eq!(fetched.number, "39-44-5323523");
        assert_eq!(service.list().await.unwrap(), vec![created]);
    }

    #[actix_web::test]
    async fn get_distinguishes_missing_from_malformed() {
        let service = service();

        let missing = service
            .get_by_id("6f9619ff-8b86-d011-b42d-00c04fc964ff")
            .await;
        let malformed = service.get_by_id("5c41c90e84d891c15dfa3431").await;

        assert!(matches!(missing, Err(PhonebookError::NotFound(_))));
        assert!(matches!(malformed, Err(PhonebookError::MalformedId(_))));
    }

    #[actix_web::test]
    async fn update_replaces_provided_fields_only() {
        let service = service();
        let person = service
            .create(new_person("Ada Lovelace", "39-44-5323523"))
            .await
            .unwrap();

        let updated = service
            .update(
                person.id.as_str(),
                UpdatePersonRequest {
                    name: None,
                    number: Some("12-43-234345".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, person.id);
        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.number, "12-43-234345");
    }

    #[actix_web::test]
    async fn update_of_missing_person_is_not_found() {
        let service = service();

        let result = service
            .update(
                "6f9619ff-8b86-d011-b42d-00c04fc964ff",
                UpdatePersonRequest::default(),
            )
            .await;

        assert!(matches!(result, Err(PhonebookError::NotFound(_))));
    }

    #[actix_web::test]
    async fn update_cannot_take_another_persons_name() {
        let service = service();
        service
            .create(new_person("Ada Lovelace", "39-44-5323523"))
            .await
            .unwrap();
        let arto = service
            .create(new_person("Arto Hellas", "040-123456"))
            .await
            .unwrap();

        let result = service
            .update(
                arto.id.as_str(),
                UpdatePersonRequest {
                    name: Some("Ada Lovelace".to_string()),
                    number: None,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(PhonebookError::StoreValidation(message)) if message == "name must be unique"
        ));
    }

    #[actix_web::test]
    async fn delete_is_idempotent() {
        let service = service();
        let person = service
            .create(new_person("Ada Lovelace", "39-44-5323523"))
            .await
            .unwrap();

        service.delete(person.id.as_str()).await.unwrap();
        service.delete(person.id.as_str()).await.unwrap();

        assert!(service.list().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn info_counts_people() {
        let service = service();

        for (name, number) in [("Arto Hellas", "040-123456"), ("Dan Abramov", "12-43-234345")] {
            service.create(new_person(name, number)).await.unwrap();
        }

        let info = service.info().await.unwrap();

        assert_eq!(info.count, 2);
        assert!(info.render_html().contains("Phonebook has info for 2 people"));
    }
}
