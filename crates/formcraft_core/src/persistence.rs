use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::model::{
    FieldDefinition, FieldValue, FormEntry, FormSchema, GeneratedTemplate, NewTemplate,
};
use crate::store::FormStore;

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

struct FormRow {
    id: String,
    name: String,
    description: Option<String>,
    fields_json: String,
    created_at: String,
    updated_at: String,
}

impl FormRow {
    fn into_schema(self) -> Result<FormSchema> {
        let fields: Vec<FieldDefinition> = serde_json::from_str(&self.fields_json)
            .with_context(|| format!("Corrupt field list for form {}", self.id))?;
        Ok(FormSchema {
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            name: self.name,
            description: self.description,
            fields,
        })
    }
}

struct EntryRow {
    id: String,
    form_id: String,
    data_json: String,
    created_at: String,
}

impl EntryRow {
    fn into_entry(self) -> Result<FormEntry> {
        let data: BTreeMap<String, FieldValue> = serde_json::from_str(&self.data_json)
            .with_context(|| format!("Corrupt data for entry {}", self.id))?;
        Ok(FormEntry {
            created_at: parse_timestamp(&self.created_at)?,
            id: self.id,
            form_id: self.form_id,
            data,
        })
    }
}

/// Fixed-width RFC 3339 so lexical order in SQLite matches chronological order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid timestamp in database: {raw}"))?;
    Ok(parsed.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// SqliteFormStore
// ---------------------------------------------------------------------------

/// SQLite-backed form storage. Field lists and entry answers are stored as JSON text.
pub struct SqliteFormStore {
    conn: Mutex<Connection>,
}

impl SqliteFormStore {
    /// Opens (or creates) the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Self::init_schema(&conn)?;
        info!("Form database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS forms (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                fields_json TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entries (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                form_id TEXT NOT NULL REFERENCES forms(id) ON DELETE CASCADE,
                data_json TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS templates (
                id TEXT PRIMARY KEY,
                form_id TEXT NOT NULL REFERENCES forms(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                content TEXT NOT NULL,
                format TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_form
                ON entries(form_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_templates_form
                ON templates(form_id);
            ",
        )
        .context("Failed to initialize form database schema")?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Forms
    // -----------------------------------------------------------------------

    /// Inserts or replaces a form definition.
    pub fn save_form(&self, form: &FormSchema) -> Result<()> {
        if !form.has_unique_field_ids() {
            bail!("Form {} has duplicate field ids", form.id);
        }
        let fields_json = serde_json::to_string(&form.fields)?;
        self.conn.lock().execute(
            "INSERT INTO forms (id, name, description, fields_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 description = excluded.description,
                 fields_json = excluded.fields_json,
                 updated_at = excluded.updated_at",
            params![
                form.id,
                form.name,
                form.description,
                fields_json,
                format_timestamp(&form.created_at),
                format_timestamp(&form.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Creates a new form with a fresh id and timestamps.
    pub fn create_form(
        &self,
        name: &str,
        description: Option<&str>,
        fields: Vec<FieldDefinition>,
    ) -> Result<FormSchema> {
        let now = Utc::now();
        let form = FormSchema {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(String::from),
            fields,
            created_at: now,
            updated_at: now,
        };
        self.save_form(&form)?;
        Ok(form)
    }

    pub fn list_forms(&self) -> Result<Vec<FormSchema>> {
        let rows = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(
                "SELECT id, name, description, fields_json, created_at, updated_at
                 FROM forms ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(FormRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        fields_json: row.get(3)?,
                        created_at: row.get(4)?,
                        updated_at: row.get(5)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        rows.into_iter().map(FormRow::into_schema).collect()
    }

    /// Deletes a form; its entries and templates go with it.
    pub fn delete_form(&self, form_id: &str) -> Result<bool> {
        let changed = self
            .conn
            .lock()
            .execute("DELETE FROM forms WHERE id = ?1", params![form_id])?;
        Ok(changed > 0)
    }

    // -----------------------------------------------------------------------
    // Entries
    // -----------------------------------------------------------------------

    /// Records a new submission, stamping id and creation time.
    pub fn create_entry(
        &self,
        form_id: &str,
        data: BTreeMap<String, FieldValue>,
    ) -> Result<FormEntry> {
        let entry = FormEntry {
            id: Uuid::new_v4().to_string(),
            form_id: form_id.to_string(),
            data,
            created_at: Utc::now(),
        };
        self.insert_entry(&entry)?;
        Ok(entry)
    }

    /// Appends an already-stamped entry (imports, fixtures).
    pub fn insert_entry(&self, entry: &FormEntry) -> Result<()> {
        let data_json = serde_json::to_string(&entry.data)?;
        self.conn
            .lock()
            .execute(
                "INSERT INTO entries (id, form_id, data_json, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    entry.id,
                    entry.form_id,
                    data_json,
                    format_timestamp(&entry.created_at)
                ],
            )
            .with_context(|| format!("Failed to insert entry {}", entry.id))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------------

    pub fn templates_for(&self, form_id: &str) -> Result<Vec<GeneratedTemplate>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, form_id, name, content, format, created_at
             FROM templates WHERE form_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt
            .query_map(params![form_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, form_id, name, content, format, created_at)| {
                Ok(GeneratedTemplate {
                    id,
                    form_id,
                    name,
                    content,
                    format,
                    created_at: parse_timestamp(&created_at)?,
                })
            })
            .collect()
    }
}

impl FormStore for SqliteFormStore {
    fn get_form(&self, form_id: &str) -> Result<Option<FormSchema>> {
        let row = self
            .conn
            .lock()
            .query_row(
                "SELECT id, name, description, fields_json, created_at, updated_at
                 FROM forms WHERE id = ?1",
                params![form_id],
                |row| {
                    Ok(FormRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        fields_json: row.get(3)?,
                        created_at: row.get(4)?,
                        updated_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        row.map(FormRow::into_schema).transpose()
    }

    fn get_entries(&self, form_id: &str) -> Result<Vec<FormEntry>> {
        let rows = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(
                "SELECT id, form_id, data_json, created_at
                 FROM entries WHERE form_id = ?1
                 ORDER BY created_at, seq",
            )?;
            let rows = stmt
                .query_map(params![form_id], |row| {
                    Ok(EntryRow {
                        id: row.get(0)?,
                        form_id: row.get(1)?,
                        data_json: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    fn create_template(&self, template: NewTemplate) -> Result<GeneratedTemplate> {
        let record = GeneratedTemplate {
            id: Uuid::new_v4().to_string(),
            form_id: template.form_id,
            name: template.name,
            content: template.content,
            format: template.format,
            created_at: Utc::now(),
        };
        self.conn
            .lock()
            .execute(
                "INSERT INTO templates (id, form_id, name, content, format, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.form_id,
                    record.name,
                    record.content,
                    record.format,
                    format_timestamp(&record.created_at),
                ],
            )
            .context("Failed to store generated template")?;
        Ok(record)
    }
}
