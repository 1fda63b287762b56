//! Generic form builder driven by field descriptors.

mod field;
mod form;

pub use field::{Choice, FieldDescriptor, FieldKind};
pub use form::{ConfigForm, FieldView, SaveRequest};
