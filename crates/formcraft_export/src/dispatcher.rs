use chrono::{DateTime, Utc};
use formcraft_core::{
    ExportError, ExportOptions, FormEntry, FormSchema, FormStore, GeneratedTemplate, NewTemplate,
};
use tracing::{debug, info, warn};

use crate::analytics::{FormAnalytics, aggregate};
use crate::context::ExportContext;
use crate::encoders;
use crate::format::{ExportFormat, ExportPayload, ExportResult};
use crate::insight::{InsightKind, generate_insight_report};

/// Entry point for exports: resolves the form through a [`FormStore`],
/// picks the encoder for the requested format, and wraps the output.
///
/// Holds no per-request state, so one `Exporter` can serve concurrent calls.
pub struct Exporter<S: FormStore> {
    store: S,
    options: ExportOptions,
}

impl<S: FormStore> Exporter<S> {
    pub fn new(store: S, options: ExportOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export a form's entries in the given format, stamped with the current
    /// time.
    pub fn produce_export(
        &self,
        form_id: &str,
        format_identifier: &str,
    ) -> Result<ExportResult, ExportError> {
        self.produce_export_at(form_id, format_identifier, Utc::now())
    }

    /// Same as [`produce_export`](Self::produce_export) with an explicit
    /// generation timestamp.
    ///
    /// The format is validated before storage is touched. A missing form is
    /// reported before any encoder runs.
    pub fn produce_export_at(
        &self,
        form_id: &str,
        format_identifier: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<ExportResult, ExportError> {
        let format = ExportFormat::parse(format_identifier).inspect_err(|_| {
            warn!(form_id, format = format_identifier, "Rejected unsupported export format");
        })?;
        debug!(form_id, %format, "Starting export");

        let (schema, entries) = self.load(form_id)?;
        let ctx = ExportContext::new(&schema, &entries, &self.options).at(generated_at);
        let payload = self.encode(format, &ctx)?;

        info!(
            form_id,
            %format,
            entries = entries.len(),
            bytes = payload.len(),
            "Export complete"
        );
        Ok(ExportResult {
            payload,
            mime_type: format.mime_type(),
            filename_hint: filename_hint(&schema, format),
        })
    }

    /// Run the encoder for `format` over an already-loaded context. Does not
    /// touch the store.
    pub fn encode(
        &self,
        format: ExportFormat,
        ctx: &ExportContext<'_>,
    ) -> Result<ExportPayload, ExportError> {
        let encoded = match format {
            ExportFormat::Csv => encoders::encode_csv(ctx).map(ExportPayload::Text),
            ExportFormat::Xlsx => encoders::encode_xlsx(ctx).map(ExportPayload::Binary),
            ExportFormat::Pdf => encoders::encode_pdf(ctx).map(ExportPayload::Binary),
            ExportFormat::Json => encoders::encode_json(ctx).map(ExportPayload::Text),
            ExportFormat::Xml => Ok(ExportPayload::Text(encoders::encode_xml(ctx))),
            ExportFormat::Yaml | ExportFormat::Yml => {
                Ok(ExportPayload::Text(encoders::encode_yaml(ctx)))
            }
            ExportFormat::Html => Ok(ExportPayload::Text(encoders::encode_html(ctx))),
            ExportFormat::Docx => encoders::encode_docx(ctx).map(ExportPayload::Binary),
            ExportFormat::Odt => encoders::encode_odt(ctx).map(ExportPayload::Binary),
            ExportFormat::Txt => Ok(ExportPayload::Text(encoders::encode_txt(ctx))),
            ExportFormat::Log => Ok(ExportPayload::Text(encoders::encode_log(ctx))),
            ExportFormat::Psi => Ok(ExportPayload::Text(encoders::encode_psi(ctx))),
        };

        encoded.map_err(|e| {
            warn!(form_id = %ctx.schema.id, %format, error = %format!("{e:#}"), "Export encoding failed");
            ExportError::EncodingFailure {
                format: format.identifier().to_string(),
                message: format!("{e:#}"),
            }
        })
    }

    /// Analytics aggregate for a stored form.
    pub fn analytics(&self, form_id: &str) -> Result<FormAnalytics, ExportError> {
        let (schema, entries) = self.load(form_id)?;
        Ok(aggregate(&schema, &entries, &self.options.list_separator))
    }

    /// Generate a templated insight report and persist it as a
    /// [`GeneratedTemplate`]. This is the only operation that writes to the
    /// store.
    pub fn produce_insight_report(
        &self,
        form_id: &str,
        kind: InsightKind,
        format: &str,
    ) -> Result<GeneratedTemplate, ExportError> {
        let (schema, entries) = self.load(form_id)?;
        let generated_at = Utc::now();
        let ctx = ExportContext::new(&schema, &entries, &self.options).at(generated_at);
        let content = generate_insight_report(&ctx, kind);

        let template = NewTemplate {
            form_id: schema.id.clone(),
            name: format!("AI {} - {}", kind, generated_at.format("%Y-%m-%d")),
            content,
            format: format.to_string(),
        };
        let stored = self.store.create_template(template).map_err(|e| {
            warn!(form_id, error = %format!("{e:#}"), "Failed to store insight report");
            ExportError::Storage(format!("{e:#}"))
        })?;

        info!(form_id, %kind, template_id = %stored.id, "Insight report stored");
        Ok(stored)
    }

    fn load(&self, form_id: &str) -> Result<(FormSchema, Vec<FormEntry>), ExportError> {
        let schema = self
            .store
            .get_form(form_id)
            .map_err(storage_error)?
            .ok_or_else(|| {
                warn!(form_id, "Form not found");
                ExportError::NotFound(form_id.to_string())
            })?;
        let entries = self.store.get_entries(form_id).map_err(storage_error)?;
        Ok((schema, entries))
    }
}

fn storage_error(e: anyhow::Error) -> ExportError {
    warn!(error = %format!("{e:#}"), "Storage lookup failed");
    ExportError::Storage(format!("{e:#}"))
}

/// `{form name}.{extension}` with path separators and control characters
/// replaced. Falls back to the form id when the name is blank.
fn filename_hint(schema: &FormSchema, format: ExportFormat) -> String {
    let base = if schema.name.trim().is_empty() {
        schema.id.as_str()
    } else {
        schema.name.trim()
    };
    let safe: String = base
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}.{}", safe, format.extension())
}
