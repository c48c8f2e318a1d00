//! `addresses` table.

use async_trait::async_trait;

use super::unit_of_work::{read_error, write_error, PgUnitOfWork};
use crate::domain::address::Address;
use crate::domain::foundation::{AddressId, ContactId, DomainError, ErrorCode, Timestamp};
use crate::ports::{AddressRepository, Repository};

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: String,
    contact_id: String,
    street: String,
    city: String,
    province: String,
    postal_code: String,
    country: String,
    created_at: i64,
    updated_at: i64,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Address {
            id: AddressId::from_string(row.id),
            contact_id: ContactId::from_string(row.contact_id),
            street: row.street,
            city: row.city,
            province: row.province,
            postal_code: row.postal_code,
            country: row.country,
            created_at: Timestamp::from_millis(row.created_at),
            updated_at: Timestamp::from_millis(row.updated_at),
        }
    }
}

const ADDRESS_COLUMNS: &str =
    "id, contact_id, street, city, province, postal_code, country, created_at, updated_at";

#[async_trait]
impl Repository<Address> for PgUnitOfWork {
    async fn create(&mut self, address: &Address) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO addresses (
                id, contact_id, street, city, province, postal_code, country,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(address.id.as_str())
        .bind(address.contact_id.as_str())
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.province)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.created_at.as_millis())
        .bind(address.updated_at.as_millis())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| write_error("create address", ErrorCode::DatabaseError, e))?;
        Ok(())
    }

    async fn update(&mut self, address: &Address) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE addresses
            SET street = $1, city = $2, province = $3, postal_code = $4, country = $5,
                updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.province)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.updated_at.as_millis())
        .bind(address.id.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| write_error("update address", ErrorCode::DatabaseError, e))?;
        Ok(())
    }

    async fn delete(&mut self, address: &Address) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(address.id.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| read_error("delete address", e))?;
        Ok(())
    }

    async fn count_by_id(&mut self, id: &AddressId) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE id = $1")
            .bind(id.as_str())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| read_error("count addresses", e))
    }

    async fn find_by_id(&mut self, id: &AddressId) -> Result<Option<Address>, DomainError> {
        let row: Option<AddressRow> = sqlx::query_as(&format!(
            "SELECT {} FROM addresses WHERE id = $1",
            ADDRESS_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| read_error("find address", e))?;
        Ok(row.map(Address::from))
    }
}

#[async_trait]
impl AddressRepository for PgUnitOfWork {
    async fn find_by_id_and_contact_id(
        &mut self,
        id: &AddressId,
        contact_id: &ContactId,
    ) -> Result<Option<Address>, DomainError> {
        let row: Option<AddressRow> = sqlx::query_as(&format!(
            "SELECT {} FROM addresses WHERE id = $1 AND contact_id = $2 FOR UPDATE",
            ADDRESS_COLUMNS
        ))
        .bind(id.as_str())
        .bind(contact_id.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| read_error("find address", e))?;
        Ok(row.map(Address::from))
    }

    async fn find_all_by_contact_id(
        &mut self,
        contact_id: &ContactId,
    ) -> Result<Vec<Address>, DomainError> {
        let rows: Vec<AddressRow> = sqlx::query_as(&format!(
            "SELECT {} FROM addresses WHERE contact_id = $1 ORDER BY created_at, id",
            ADDRESS_COLUMNS
        ))
        .bind(contact_id.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| read_error("list addresses", e))?;
        Ok(rows.into_iter().map(Address::from).collect())
    }
}
