//! Message template personalization.

/// Placeholder substituted with the recipient's name.
const NAME_PLACEHOLDER: &str = "{{name}}";

/// Literal used when a recipient has no usable name.
pub const FALLBACK_RECIPIENT_NAME: &str = "Customer";

/// A campaign message template supporting a `{{name}}` placeholder.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    raw: String,
}

impl MessageTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Renders the template for one recipient. Every occurrence of the
    /// placeholder is replaced; an absent or empty name falls back to the
    /// fallback literal.
    pub fn render(&self, name: Option<&str>) -> String {
        let name = match name {
            Some(n) if !n.trim().is_empty() => n,
            _ => FALLBACK_RECIPIENT_NAME,
        };
        self.raw.replace(NAME_PLACEHOLDER, name)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}
