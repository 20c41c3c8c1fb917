//! Property store
//!
//! Properties are namespaced, typed facts keyed by (media package,
//! namespace, name). The typed value maps onto four nullable columns here
//! and nowhere else; exactly one column is populated per row.

use crate::db::Database;
use crate::errors::{corrupt_row, from_rusqlite, Result};
use crate::snapshot::date_from_millis;
use rusqlite::{Connection, OptionalExtension};
use snapvault_core::errors::ExError;
use snapvault_core::model::{require_non_blank, Property, PropertyId, PropertyValue};

impl Database {
    /// Insert or update one property.
    ///
    /// ## Returns
    ///
    /// `true` when the media package exists and the value was written,
    /// `false` when no snapshot exists for the media package. Nothing is
    /// written in that case.
    ///
    /// ## Errors
    ///
    /// - `ExErrorKind::InvalidInput`: blank namespace or name
    /// - `ExErrorKind::Persistence`: the write failed
    pub fn save_property(&mut self, property: &Property) -> Result<bool> {
        let id = &property.id;
        require_non_blank("media_package_id", &id.media_package_id)?;
        require_non_blank("namespace", &id.namespace)?;
        require_non_blank("property_name", &id.name)?;

        let columns = PropertyColumns::from_value(&property.value);

        self.write("save_property", |tx, _| {
            // No row: media package unknown. Row with NULL id: new property.
            let lookup: Option<Option<i64>> = tx
                .query_row(
                    r#"
                    SELECT p.id
                    FROM (
                        SELECT ?1 AS media_package_id
                        WHERE EXISTS (SELECT 1 FROM snapshot WHERE media_package_id = ?1)
                    ) m
                    LEFT JOIN property p
                        ON p.media_package_id = m.media_package_id
                        AND p.namespace = ?2
                        AND p.property_name = ?3
                    "#,
                    rusqlite::params![id.media_package_id, id.namespace, id.name],
                    |row| row.get(0),
                )
                .optional()
                .map_err(from_rusqlite)?;

            match lookup {
                None => Ok(false),
                Some(None) => {
                    tx.execute(
                        r#"
                        INSERT INTO property (
                            media_package_id, namespace, property_name,
                            val_string, val_date, val_long, val_bool
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                        "#,
                        rusqlite::params![
                            id.media_package_id,
                            id.namespace,
                            id.name,
                            columns.string,
                            columns.date,
                            columns.long,
                            columns.boolean,
                        ],
                    )
                    .map_err(|e| property_error(e, id))?;
                    Ok(true)
                }
                Some(Some(row_id)) => {
                    tx.execute(
                        "UPDATE property
                         SET val_string = ?2, val_date = ?3, val_long = ?4, val_bool = ?5
                         WHERE id = ?1",
                        rusqlite::params![
                            row_id,
                            columns.string,
                            columns.date,
                            columns.long,
                            columns.boolean,
                        ],
                    )
                    .map_err(|e| property_error(e, id))?;
                    Ok(true)
                }
            }
        })
    }

    /// Delete the properties of a media package, optionally only one namespace
    ///
    /// Returns the number of properties removed.
    pub fn delete_properties(
        &mut self,
        media_package_id: &str,
        namespace: Option<&str>,
    ) -> Result<usize> {
        self.write("delete_properties", |tx, _| {
            tx.execute(
                "DELETE FROM property
                 WHERE media_package_id = ?1 AND (?2 IS NULL OR namespace = ?2)",
                rusqlite::params![media_package_id, namespace],
            )
            .map_err(from_rusqlite)
        })
    }

    /// All properties of a media package in one namespace, ordered by name
    pub fn select_properties(
        &mut self,
        media_package_id: &str,
        namespace: &str,
    ) -> Result<Vec<Property>> {
        self.read("select_properties", |tx, _| {
            select_in_namespace(tx, media_package_id, namespace)
        })
    }
}

fn select_in_namespace(
    conn: &Connection,
    media_package_id: &str,
    namespace: &str,
) -> Result<Vec<Property>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, property_name, val_string, val_date, val_long, val_bool
             FROM property
             WHERE media_package_id = ?1 AND namespace = ?2
             ORDER BY property_name",
        )
        .map_err(from_rusqlite)?;

    let rows = stmt
        .query_map(rusqlite::params![media_package_id, namespace], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                PropertyColumns {
                    string: row.get(2)?,
                    date: row.get(3)?,
                    long: row.get(4)?,
                    boolean: row.get(5)?,
                },
            ))
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    rows.into_iter()
        .map(|(row_id, name, columns)| {
            let value = columns
                .into_value()
                .map_err(|reason| corrupt_row("property", row_id, reason))?;
            Ok(Property::new(
                PropertyId::new(media_package_id, namespace, name),
                value,
            ))
        })
        .collect()
}

fn property_error(err: rusqlite::Error, id: &PropertyId) -> ExError {
    from_rusqlite(err)
        .with_media_package_id(&id.media_package_id)
        .with_message(format!("property {}/{}", id.namespace, id.name))
}

/// Physical layout of a property value
#[derive(Debug, Default, PartialEq, Eq)]
struct PropertyColumns {
    string: Option<String>,
    /// Milliseconds since the epoch
    date: Option<i64>,
    long: Option<i64>,
    boolean: Option<bool>,
}

impl PropertyColumns {
    fn from_value(value: &PropertyValue) -> Self {
        match value {
            PropertyValue::String(s) => Self {
                string: Some(s.clone()),
                ..Self::default()
            },
            PropertyValue::Date(d) => Self {
                date: Some(d.timestamp_millis()),
                ..Self::default()
            },
            PropertyValue::Long(v) => Self {
                long: Some(*v),
                ..Self::default()
            },
            PropertyValue::Boolean(b) => Self {
                boolean: Some(*b),
                ..Self::default()
            },
        }
    }

    /// First populated column wins: string, date, long, boolean
    fn into_value(self) -> std::result::Result<PropertyValue, &'static str> {
        if let Some(s) = self.string {
            return Ok(PropertyValue::String(s));
        }
        if let Some(ms) = self.date {
            return date_from_millis(ms)
                .map(PropertyValue::Date)
                .ok_or("val_date out of range");
        }
        if let Some(v) = self.long {
            return Ok(PropertyValue::Long(v));
        }
        if let Some(b) = self.boolean {
            return Ok(PropertyValue::Boolean(b));
        }
        Err("no value column populated")
    }
}
