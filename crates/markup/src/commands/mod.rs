//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod render;
pub(crate) mod types;

pub(crate) use check::CheckArgs;
pub(crate) use render::RenderArgs;
pub(crate) use types::TypesArgs;
