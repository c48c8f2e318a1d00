//! `contacts` table.

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use super::unit_of_work::{read_error, write_error, PgUnitOfWork};
use crate::domain::contact::Contact;
use crate::domain::foundation::{ContactId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::{ContactFilter, ContactRepository, Repository};

#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: String,
    user_id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ContactRow> for Contact {
    type Error = DomainError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let user_id = UserId::new(row.user_id).map_err(|e| {
            DomainError::new(ErrorCode::InternalError, format!("Invalid user id: {}", e))
        })?;
        Ok(Contact {
            id: ContactId::from_string(row.id),
            user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            created_at: Timestamp::from_millis(row.created_at),
            updated_at: Timestamp::from_millis(row.updated_at),
        })
    }
}

const CONTACT_COLUMNS: &str =
    "id, user_id, first_name, last_name, email, phone, created_at, updated_at";

/// `ILIKE` pattern matching `value` as a literal substring.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Appends the owner predicate and every active filter.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &ContactFilter) {
    query
        .push(" WHERE user_id = ")
        .push_bind(filter.user_id.as_str().to_string());

    if !filter.name.is_empty() {
        let pattern = contains_pattern(&filter.name);
        query
            .push(" AND (first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR last_name ILIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }
    if !filter.email.is_empty() {
        query
            .push(" AND email ILIKE ")
            .push_bind(contains_pattern(&filter.email))
            .push(r" ESCAPE '\'");
    }
    if !filter.phone.is_empty() {
        query
            .push(" AND phone ILIKE ")
            .push_bind(contains_pattern(&filter.phone))
            .push(r" ESCAPE '\'");
    }
}

#[async_trait]
impl Repository<Contact> for PgUnitOfWork {
    async fn create(&mut self, contact: &Contact) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO contacts (
                id, user_id, first_name, last_name, email, phone, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(contact.id.as_str())
        .bind(contact.user_id.as_str())
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.created_at.as_millis())
        .bind(contact.updated_at.as_millis())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| write_error("create contact", ErrorCode::DatabaseError, e))?;
        Ok(())
    }

    async fn update(&mut self, contact: &Contact) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE contacts
            SET first_name = $1, last_name = $2, email = $3, phone = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.updated_at.as_millis())
        .bind(contact.id.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| write_error("update contact", ErrorCode::DatabaseError, e))?;
        Ok(())
    }

    async fn delete(&mut self, contact: &Contact) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(contact.id.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| read_error("delete contact", e))?;
        Ok(())
    }

    async fn count_by_id(&mut self, id: &ContactId) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contacts WHERE id = $1")
            .bind(id.as_str())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| read_error("count contacts", e))
    }

    async fn find_by_id(&mut self, id: &ContactId) -> Result<Option<Contact>, DomainError> {
        let row: Option<ContactRow> = sqlx::query_as(&format!(
            "SELECT {} FROM contacts WHERE id = $1",
            CONTACT_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| read_error("find contact", e))?;
        row.map(Contact::try_from).transpose()
    }
}

#[async_trait]
impl ContactRepository for PgUnitOfWork {
    async fn find_by_id_and_user_id(
        &mut self,
        id: &ContactId,
        user_id: &UserId,
    ) -> Result<Option<Contact>, DomainError> {
        let row: Option<ContactRow> = sqlx::query_as(&format!(
            "SELECT {} FROM contacts WHERE id = $1 AND user_id = $2 FOR UPDATE",
            CONTACT_COLUMNS
        ))
        .bind(id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| read_error("find contact", e))?;
        row.map(Contact::try_from).transpose()
    }

    async fn search(&mut self, filter: &ContactFilter) -> Result<(Vec<Contact>, i64), DomainError> {
        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM contacts",
            CONTACT_COLUMNS
        ));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY created_at, id LIMIT ")
            .push_bind(filter.page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(filter.page.offset() as i64);

        let rows: Vec<ContactRow> = select
            .build_query_as()
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| read_error("search contacts", e))?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contacts");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| read_error("count contacts", e))?;

        let contacts = rows
            .into_iter()
            .map(Contact::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((contacts, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_value_matches_as_substring() {
        assert_eq!(contains_pattern("jane"), "%jane%");
    }

    #[test]
    fn wildcards_and_escape_are_escaped() {
        assert_eq!(contains_pattern("50%_a\\b"), r"%50\%\_a\\b%");
        assert_eq!(contains_pattern("_"), r"%\_%");
    }

    #[test]
    fn every_filter_uses_the_escape_clause() {
        let mut filter = ContactFilter::for_user(UserId::new("alice").unwrap());
        filter.name = "j".to_string();
        filter.email = "e".to_string();
        filter.phone = "1".to_string();
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contacts");

        push_filters(&mut query, &filter);

        assert_eq!(query.sql().matches(r"ILIKE").count(), 4);
        assert_eq!(query.sql().matches(r" ESCAPE '\'").count(), 4);
    }
}
