//! Ordered registry of markup renderers.
//!
//! A [`RendererRegistry`] maps markup type keys (`"markdown"`, `"plain"`, ...)
//! to [`Renderer`] implementations with a display label. Registration order
//! is preserved and drives the order of type selection choices.
//!
//! Registries are built once through [`RegistryBuilder`] and are immutable
//! afterwards, so a single registry can be shared across threads. A process
//! may hold any number of independent registries.
//!
//! # Default renderers
//!
//! [`RendererRegistry::with_defaults`] tries the built-in engines in priority
//! order (see [`defaults`]) and silently omits any that are unavailable.
//!
//! # Example
//!
//! ```
//! use markup_registry::{RenderError, RendererRegistry, defaults};
//!
//! let mut builder = defaults::default_builder();
//! builder
//!     .register_with_label("shout", "Shouting", |text: &str| {
//!         Ok::<_, RenderError>(text.to_uppercase())
//!     })
//!     .unwrap();
//! let registry = builder.build();
//!
//! let entry = registry.resolve("plain").unwrap();
//! assert_eq!(entry.render("a < b").unwrap(), "<p>a &lt; b</p>");
//! assert_eq!(registry.resolve("shout").unwrap().render("hi").unwrap(), "HI");
//! ```

pub mod defaults;
mod error;
#[cfg(feature = "markdown")]
mod markdown;
mod plain;
mod registry;
mod renderer;

pub use error::{RegistryError, RenderError};
#[cfg(feature = "markdown")]
pub use markdown::MarkdownRenderer;
pub use plain::{escape_html, linebreaks, render_plain, urlize};
pub use registry::{RegistryBuilder, RendererRegistry};
pub use renderer::{Renderer, RendererEntry};
