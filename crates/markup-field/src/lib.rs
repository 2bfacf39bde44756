//! Markup fields: raw text with always-current rendered output.
//!
//! A [`MarkupField`] is declared once per record type from a [`FieldConfig`]
//! and a shared [`RendererRegistry`](markup_registry::RendererRegistry).
//! Binding it to a record yields a [`MarkupValue`] whose writes to the raw
//! text or markup type re-render immediately, so the three attributes a field
//! stores stay coherent:
//!
//! ```text
//! { <field>: raw | null,
//!   <field>_markup_type: key | null,
//!   _<field>_rendered: rendered | null }
//! ```
//!
//! Records are accessed only through the [`Record`] trait.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use markup_field::{FieldConfig, MarkupField, MemoryRecord};
//! use markup_registry::RendererRegistry;
//!
//! let registry = Arc::new(RendererRegistry::with_defaults());
//! let field = MarkupField::new(
//!     FieldConfig::builder("body", registry)
//!         .with_default_markup_type("plain")
//!         .with_escape_html(true)
//!         .build()?,
//! );
//!
//! let mut record = MemoryRecord::new();
//! let mut body = field.bind(&mut record)?;
//! body.set_raw(Some("see http://example.com.".to_owned()))?;
//! assert_eq!(
//!     body.rendered(),
//!     Some(r#"<p>see <a href="http://example.com">http://example.com</a>.</p>"#)
//! );
//!
//! body.set_markup_type("html")?;
//! assert_eq!(body.rendered(), Some("see http://example.com."));
//! assert!(body.set("rendered", None).is_err());
//! # Ok::<(), markup_field::MarkupError>(())
//! ```

mod config;
mod error;
mod field;
mod record;
mod setup;
mod value;

pub use config::{FieldConfig, FieldConfigBuilder, RenderedStorage, TypeSource};
pub use error::MarkupError;
pub use field::{AsRawText, Assignment, BLANK_CHOICE_LABEL, MarkupField};
pub use record::{MemoryRecord, Record};
pub use setup::{build_fields, build_registry};
pub use value::{Attribute, Markup, MarkupValue};
