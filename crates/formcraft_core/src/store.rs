use anyhow::{Result, bail};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::model::{FieldValue, FormEntry, FormSchema, GeneratedTemplate, NewTemplate};

// ---------------------------------------------------------------------------
// FormStore trait
// ---------------------------------------------------------------------------

/// Read access to stored forms and entries, plus the template write used by
/// insight reports. Exports hold nothing returned from here beyond one call.
pub trait FormStore: Send + Sync {
    /// Look up a form by id. `Ok(None)` when it does not exist.
    fn get_form(&self, form_id: &str) -> Result<Option<FormSchema>>;

    /// All entries for a form, in creation order.
    fn get_entries(&self, form_id: &str) -> Result<Vec<FormEntry>>;

    /// Persist a generated report.
    fn create_template(&self, template: NewTemplate) -> Result<GeneratedTemplate>;
}

impl<T: FormStore + ?Sized> FormStore for std::sync::Arc<T> {
    fn get_form(&self, form_id: &str) -> Result<Option<FormSchema>> {
        (**self).get_form(form_id)
    }

    fn get_entries(&self, form_id: &str) -> Result<Vec<FormEntry>> {
        (**self).get_entries(form_id)
    }

    fn create_template(&self, template: NewTemplate) -> Result<GeneratedTemplate> {
        (**self).create_template(template)
    }
}

// ---------------------------------------------------------------------------
// MemoryFormStore
// ---------------------------------------------------------------------------

/// In-process store backed by vectors. Entry order is insertion order.
#[derive(Default)]
pub struct MemoryFormStore {
    forms: RwLock<Vec<FormSchema>>,
    entries: RwLock<Vec<FormEntry>>,
    templates: RwLock<Vec<GeneratedTemplate>>,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a form by id.
    pub fn save_form(&self, form: FormSchema) -> Result<()> {
        if !form.has_unique_field_ids() {
            bail!("Form {} has duplicate field ids", form.id);
        }
        let mut forms = self.forms.write();
        match forms.iter_mut().find(|f| f.id == form.id) {
            Some(existing) => *existing = form,
            None => forms.push(form),
        }
        Ok(())
    }

    pub fn list_forms(&self) -> Vec<FormSchema> {
        self.forms.read().clone()
    }

    /// Remove a form together with its entries and templates.
    pub fn delete_form(&self, form_id: &str) -> bool {
        let mut forms = self.forms.write();
        let before = forms.len();
        forms.retain(|f| f.id != form_id);
        if forms.len() == before {
            return false;
        }
        self.entries.write().retain(|e| e.form_id != form_id);
        self.templates.write().retain(|t| t.form_id != form_id);
        true
    }

    /// Record a new submission, stamping id and creation time.
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
        self.insert_entry(entry.clone())?;
        Ok(entry)
    }

    /// Append an already-stamped entry (imports, fixtures).
    pub fn insert_entry(&self, entry: FormEntry) -> Result<()> {
        if !self.forms.read().iter().any(|f| f.id == entry.form_id) {
            bail!("Cannot add entry to unknown form {}", entry.form_id);
        }
        self.entries.write().push(entry);
        Ok(())
    }

    pub fn templates_for(&self, form_id: &str) -> Vec<GeneratedTemplate> {
        self.templates
            .read()
            .iter()
            .filter(|t| t.form_id == form_id)
            .cloned()
            .collect()
    }
}

impl FormStore for MemoryFormStore {
    fn get_form(&self, form_id: &str) -> Result<Option<FormSchema>> {
        Ok(self.forms.read().iter().find(|f| f.id == form_id).cloned())
    }

    fn get_entries(&self, form_id: &str) -> Result<Vec<FormEntry>> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| e.form_id == form_id)
            .cloned()
            .collect())
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
        self.templates.write().push(record.clone());
        Ok(record)
    }
}
