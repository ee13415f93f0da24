use anyhow::{Context, Result};
use rhtmx_unobtrusive::rules::field_control;
use rhtmx_unobtrusive::{
    document_forms, Document, FieldError, FormReport, NodeId, Unobtrusive, UnobtrusiveConfig,
};
use rhtmx_unobtrusive_engine::Validator;
use std::fs;
use std::path::Path;
use tracing::debug;

/// An HTML document parsed with the unobtrusive adapters
pub struct LoadedPage {
    pub doc: Document,
    pub page: Unobtrusive<Validator>,
    pub forms: Vec<NodeId>,
}

/// `NAME=VALUE` argument parser; the value may be empty or contain `=`
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    if name.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

fn load_config(config: Option<&Path>) -> Result<UnobtrusiveConfig> {
    match config {
        Some(path) if !path.exists() => anyhow::bail!("Config file not found: {:?}", path),
        Some(path) => UnobtrusiveConfig::load(path),
        None => UnobtrusiveConfig::load_default(),
    }
}

impl LoadedPage {
    pub fn from_html(html: &str, config: UnobtrusiveConfig) -> Self {
        let doc = Document::parse_html(html);
        let mut page = Unobtrusive::with_config(Validator::new(), config);
        page.parse_document(&doc);
        let forms = document_forms(&doc);
        debug!(forms = forms.len(), "parsed document");
        Self { doc, page, forms }
    }

    pub fn load(file: &Path, config: Option<&Path>) -> Result<Self> {
        let config = load_config(config)?;
        let html = fs::read_to_string(file)
            .with_context(|| format!("Failed to read HTML file: {:?}", file))?;
        Ok(Self::from_html(&html, config))
    }

    pub fn report(&self) -> Vec<FormReport> {
        self.page.report(&self.doc)
    }

    /// Set `name` in every form that has such a control; returns how many were set
    pub fn fill(&mut self, name: &str, value: &str) -> usize {
        let mut filled = 0;
        for form in &self.forms {
            if let Some(control) = field_control(&self.doc, *form, name) {
                self.doc.set_value(control, value);
                filled += 1;
            }
        }
        filled
    }

    /// Validate every form and collect the outstanding failures
    pub fn validate(&mut self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for form in self.forms.clone() {
            if !self.page.validate(&mut self.doc, form) {
                errors.extend(self.page.engine().errors(form));
            }
        }
        errors
    }
}
