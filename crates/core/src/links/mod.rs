//! HAL link navigation
//!
//! [`LinkResolver`] turns a relation name from a resource's link table into
//! a concrete absolute [`url::Url`], expanding URI templates through
//! [`UriTemplate`] when the link is templated.

pub mod resolver;
pub mod template;

pub use resolver::LinkResolver;
pub use template::{TemplateError, TemplateParams, UriTemplate};
