use anyhow::{bail, Result};
use rusqlite::{params, Connection};

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

/// Offset added to every schema version before it is written to
/// `PRAGMA user_version`, so foreign databases are not mistaken for ours.
pub const BASE_DB_VERSION: usize = 300;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                default_value: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
        }
    }

    fn from_sql(s: &str) -> Option<&'static SqlType> {
        match s {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            _ => None,
        }
    }
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub default_value: Option<&'static str>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let columns_sql = self
            .columns
            .iter()
            .map(|column| {
                let mut sql = format!("{} {}", column.name, column.sql_type.as_sql());
                if column.is_primary_key {
                    sql.push_str(" PRIMARY KEY");
                }
                if column.non_null {
                    sql.push_str(" NOT NULL");
                }
                if let Some(default_value) = column.default_value {
                    sql.push_str(&format!(" DEFAULT {}", default_value));
                }
                sql
            })
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute(
            &format!("CREATE TABLE {} ({});", self.name, columns_sql),
            params![],
        )?;
        Ok(())
    }

    fn validate(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual: Vec<(String, String, bool, bool)> = stmt
            .query_map(params![], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i32>(3)? == 1,
                    row.get::<_, i32>(5)? == 1,
                ))
            })?
            .collect::<Result<_, _>>()?;

        if actual.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}.",
                self.name,
                actual.len(),
                self.columns.len()
            );
        }

        for ((name, sql_type, non_null, is_primary_key), expected) in
            actual.iter().zip(self.columns.iter())
        {
            if name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    name
                );
            }
            if SqlType::from_sql(sql_type) != Some(expected.sql_type) {
                bail!(
                    "Table {} column {} type mismatch: expected {:?}, got {}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    sql_type
                );
            }
            if *non_null != expected.non_null || *is_primary_key != expected.is_primary_key {
                bail!(
                    "Table {} column {} constraints differ from the expected schema",
                    self.name,
                    expected.name
                );
            }
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}

/// Brings `conn` up to the last schema in `schemas`, creating it from scratch
/// when the database is empty and running migrations otherwise.
pub fn open_versioned(conn: &Connection, schemas: &[VersionedSchema]) -> Result<()> {
    let latest = match schemas.last() {
        Some(schema) => schema,
        None => bail!("No schema versions defined"),
    };

    let db_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let db_version = db_version as usize;
    if db_version == 0 {
        latest.create(conn)?;
        return Ok(());
    }

    if db_version < BASE_DB_VERSION {
        bail!("Unknown database version {}", db_version);
    }
    let mut version = db_version - BASE_DB_VERSION;
    if version > latest.version {
        bail!(
            "Database version {} is newer than supported version {}",
            version,
            latest.version
        );
    }

    while version < latest.version {
        let next = &schemas[version + 1];
        match next.migration {
            Some(migration) => migration(conn)?,
            None => bail!("No migration to schema version {}", next.version),
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + next.version),
            [],
        )?;
        version = next.version;
    }

    latest.validate(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_column;

    const NOTE_TABLE_V_0: Table = Table {
        name: "note",
        columns: &[sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true
        )],
    };

    const NOTE_TABLE_V_1: Table = Table {
        name: "note",
        columns: &[
            sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
            sqlite_column!("body", &SqlType::Text, non_null = true, default_value = Some("''")),
        ],
    };

    fn add_note_body(conn: &Connection) -> Result<()> {
        conn.execute("ALTER TABLE note ADD COLUMN body TEXT NOT NULL DEFAULT ''", [])?;
        Ok(())
    }

    const SCHEMAS_V_0: &[VersionedSchema] = &[VersionedSchema {
        version: 0,
        tables: &[NOTE_TABLE_V_0],
        migration: None,
    }];

    const SCHEMAS_V_1: &[VersionedSchema] = &[
        VersionedSchema {
            version: 0,
            tables: &[NOTE_TABLE_V_0],
            migration: None,
        },
        VersionedSchema {
            version: 1,
            tables: &[NOTE_TABLE_V_1],
            migration: Some(add_note_body),
        },
    ];

    fn user_version(conn: &Connection) -> i64 {
        conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn creates_then_reopens() {
        let conn = Connection::open_in_memory().unwrap();
        open_versioned(&conn, SCHEMAS_V_0).unwrap();
        assert_eq!(user_version(&conn), BASE_DB_VERSION as i64);

        open_versioned(&conn, SCHEMAS_V_0).unwrap();
        assert_eq!(user_version(&conn), BASE_DB_VERSION as i64);
    }

    #[test]
    fn migrates_to_the_latest_schema() {
        let conn = Connection::open_in_memory().unwrap();
        open_versioned(&conn, SCHEMAS_V_0).unwrap();
        conn.execute("INSERT INTO note (id) VALUES (7)", []).unwrap();

        open_versioned(&conn, SCHEMAS_V_1).unwrap();
        assert_eq!(user_version(&conn), BASE_DB_VERSION as i64 + 1);
        let body: String = conn
            .query_row("SELECT body FROM note WHERE id = 7", [], |row| row.get(0))
            .unwrap();
        assert_eq!(body, "");
    }

    #[test]
    fn rejects_unknown_versions() {
        let conn = Connection::open_in_memory().unwrap();
        open_versioned(&conn, SCHEMAS_V_0).unwrap();
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + 5),
            [],
        )
        .unwrap();
        assert!(open_versioned(&conn, SCHEMAS_V_0).is_err());

        conn.execute("PRAGMA user_version = 12", []).unwrap();
        assert!(open_versioned(&conn, SCHEMAS_V_0).is_err());
    }

    #[test]
    fn rejects_a_drifted_table() {
        let conn = Connection::open_in_memory().unwrap();
        open_versioned(&conn, SCHEMAS_V_0).unwrap();
        add_note_body(&conn).unwrap();

        assert!(open_versioned(&conn, SCHEMAS_V_0).is_err());
    }

    #[test]
    fn missing_migration_is_an_error() {
        const NO_MIGRATION: &[VersionedSchema] = &[
            VersionedSchema {
                version: 0,
                tables: &[NOTE_TABLE_V_0],
                migration: None,
            },
            VersionedSchema {
                version: 1,
                tables: &[NOTE_TABLE_V_1],
                migration: None,
            },
        ];
        let conn = Connection::open_in_memory().unwrap();
        open_versioned(&conn, SCHEMAS_V_0).unwrap();

        assert!(open_versioned(&conn, NO_MIGRATION).is_err());
    }
}
