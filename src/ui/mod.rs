//! Presentation.
//!
//! [`view`] turns stored turns into screen-independent view models; the other
//! modules draw those models.
//!
//! - [`html`]: HTMX fragments for the conversation and sources panel
//! - [`shell`]: full pages
//! - [`text`]: terminal output
//! - [`sources`]: sources panel view model

pub mod html;
pub mod shell;
pub mod sources;
pub mod text;
pub mod view;
