//! DynamoDB storage adapter.
//!
//! Each user is one item in a table whose partition key is the `id`
//! attribute, so the external identifier and the store's identity are the
//! same value and no internal identity can leak. Replace and delete match
//! on `id` through a condition expression; a failed condition is the
//! not-found outcome, never an error. Per-item atomicity is delegated
//! entirely to DynamoDB.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::AttributeValue;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserDraft, UserId};

const ID_ATTR: &str = "id";
const NAME_ATTR: &str = "name";
const EMAIL_ATTR: &str = "email";
const ID_EXISTS: &str = "attribute_exists(id)";

/// [`UserRepository`] backed by a DynamoDB table keyed on the user `id`.
pub struct DynamoDbUserRepository {
    client: Client,
    table: String,
}

impl DynamoDbUserRepository {
    /// Create an adapter over `table` using the supplied client.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Write `user` as one item. With a condition expression attached, a
    /// failed condition reports `false` instead of an error.
    async fn put_user(
        &self,
        user: &User,
        condition: Option<&'static str>,
    ) -> Result<bool, UserPersistenceError> {
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table)
            .item(ID_ATTR, AttributeValue::S(user.id().to_string()))
            .item(NAME_ATTR, AttributeValue::S(user.name().as_ref().to_owned()))
            .item(
                EMAIL_ATTR,
                AttributeValue::S(user.email().as_ref().to_owned()),
            );
        if let Some(expression) = condition {
            request = request.condition_expression(expression);
        }

        match request.send().await {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(context))
                if context.err().is_conditional_check_failed_exception() =>
            {
                Ok(false)
            }
            Err(err) => Err(request_error(err)),
        }
    }
}

fn request_error<E>(err: SdkError<E>) -> UserPersistenceError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            UserPersistenceError::connection(message)
        }
        _ => UserPersistenceError::query(message),
    }
}

fn string_attr<'a>(
    item: &'a HashMap<String, AttributeValue>,
    attr: &str,
) -> Result<&'a str, UserPersistenceError> {
    item.get(attr)
        .and_then(|value| value.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| {
            UserPersistenceError::query(format!(
                "stored item is missing string attribute `{attr}`"
            ))
        })
}

fn user_from_item(item: &HashMap<String, AttributeValue>) -> Result<User, UserPersistenceError> {
    let id = string_attr(item, ID_ATTR)?;
    let name = string_attr(item, NAME_ATTR)?;
    let email = string_attr(item, EMAIL_ATTR)?;
    User::try_from_strings(id, name, email).map_err(|err| {
        UserPersistenceError::query(format!("stored item violates user invariants: {err}"))
    })
}

#[async_trait]
impl UserRepository for DynamoDbUserRepository {
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut users = Vec::new();
        let mut start_key = None;
        loop {
            let response = self
                .client
                .scan()
                .table_name(&self.table)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(request_error)?;
            for item in response.items() {
                users.push(user_from_item(item)?);
            }
            start_key = response.last_evaluated_key().cloned();
            if start_key.is_none() {
                break;
            }
        }
        Ok(users)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(ID_ATTR, AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(request_error)?;
        response.item().map(user_from_item).transpose()
    }

    async fn insert(&self, draft: UserDraft) -> Result<User, UserPersistenceError> {
        let user = User::new(UserId::random(), draft);
        self.put_user(&user, None).await?;
        Ok(user)
    }

    async fn replace(
        &self,
        id: &UserId,
        draft: UserDraft,
    ) -> Result<Option<User>, UserPersistenceError> {
        let user = User::new(*id, draft);
        if self.put_user(&user, Some(ID_EXISTS)).await? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    async fn remove_by_id(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let request = self
            .client
            .delete_item()
            .table_name(&self.table)
            .key(ID_ATTR, AttributeValue::S(id.to_string()))
            .condition_expression(ID_EXISTS);

        match request.send().await {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(context))
                if context.err().is_conditional_check_failed_exception() =>
            {
                Ok(false)
            }
            Err(err) => Err(request_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, email: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (ID_ATTR.to_owned(), AttributeValue::S(id.to_owned())),
            (NAME_ATTR.to_owned(), AttributeValue::S(name.to_owned())),
            (EMAIL_ATTR.to_owned(), AttributeValue::S(email.to_owned())),
        ])
    }

    #[test]
    fn a_complete_item_maps_to_a_user() {
        let id = UserId::random().to_string();
        let user = user_from_item(&item(&id, "Ann", "ann@x.com")).expect("valid item");
        assert_eq!(user.id().to_string(), id);
        assert_eq!(user.name().as_ref(), "Ann");
        assert_eq!(user.email().as_ref(), "ann@x.com");
    }

    #[test]
    fn a_missing_attribute_is_a_query_error() {
        let id = UserId::random().to_string();
        let mut incomplete = item(&id, "Ann", "ann@x.com");
        incomplete.remove(EMAIL_ATTR);

        let err = user_from_item(&incomplete).expect_err("missing email");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[test]
    fn a_non_string_attribute_is_a_query_error() {
        let id = UserId::random().to_string();
        let mut wrong_type = item(&id, "Ann", "ann@x.com");
        wrong_type.insert(NAME_ATTR.to_owned(), AttributeValue::N("7".to_owned()));

        let err = user_from_item(&wrong_type).expect_err("numeric name");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[test]
    fn an_invariant_violating_item_is_rejected() {
        let id = UserId::random().to_string();
        let err = user_from_item(&item(&id, "", "ann@x.com")).expect_err("empty name");
        assert!(matches!(err, UserPersistenceError::Query { .. }));

        let err = user_from_item(&item("7", "Ann", "ann@x.com")).expect_err("bad id");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
