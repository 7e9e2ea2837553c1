//! Dynamic partial-update SQL
//!
//! Update endpoints accept any subset of an entity's fields. Absent fields
//! must not touch their columns, so the UPDATE statement is assembled from
//! only the fields that actually arrived.

use sqlx::{Postgres, QueryBuilder};

/// Builds `UPDATE <table> SET <col> = $n, ... WHERE <key> = $m RETURNING *`
/// from an arbitrary subset of columns. All values are bound, never
/// interpolated; column and table names come from call sites, not input.
pub struct UpdateSet {
    builder: QueryBuilder<'static, Postgres>,
    fields: usize,
}

impl UpdateSet {
    pub fn new(table: &str) -> Self {
        let mut builder = QueryBuilder::new("UPDATE ");
        builder.push(table).push(" SET ");
        Self { builder, fields: 0 }
    }

    pub fn set<T>(&mut self, column: &str, value: T) -> &mut Self
    where
        T: 'static + sqlx::Encode<'static, Postgres> + sqlx::Type<Postgres> + Send,
    {
        if self.fields > 0 {
            self.builder.push(", ");
        }
        self.builder.push(column).push(" = ").push_bind(value);
        self.fields += 1;
        self
    }

    /// Bind the column only when a value arrived.
    pub fn set_opt<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'static + sqlx::Encode<'static, Postgres> + sqlx::Type<Postgres> + Send,
    {
        if let Some(value) = value {
            self.set(column, value);
        }
        self
    }

    /// True when no field has been set; the caller should fall back to a
    /// plain SELECT instead of issuing an empty UPDATE.
    pub fn is_empty(&self) -> bool {
        self.fields == 0
    }

    pub fn finish<T>(mut self, key_column: &str, key: T) -> QueryBuilder<'static, Postgres>
    where
        T: 'static + sqlx::Encode<'static, Postgres> + sqlx::Type<Postgres> + Send,
    {
        self.builder
            .push(" WHERE ")
            .push(key_column)
            .push(" = ")
            .push_bind(key)
            .push(" RETURNING *");
        self.builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_update_from_present_fields_only() {
        let mut update = UpdateSet::new("doctors");
        update.set_opt("email", Some("a@b.mx".to_string()));
        update.set_opt::<String>("specialty", None);
        update.set("is_active", true);

        let builder = update.finish("doctor_id", 7i32);
        assert_eq!(
            builder.sql(),
            "UPDATE doctors SET email = $1, is_active = $2 WHERE doctor_id = $3 RETURNING *"
        );
    }

    #[test]
    fn empty_update_is_detectable() {
        let mut update = UpdateSet::new("roles");
        update.set_opt::<String>("role_name", None);
        assert!(update.is_empty());
    }
}
