pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod store;

pub use config::{ExportOptions, FormcraftConfig};
pub use error::{ErrorKind, ExportError};
pub use model::{
    FieldDefinition, FieldType, FieldValidation, FieldValue, FormEntry, FormSchema,
    GeneratedTemplate, NewTemplate,
};
pub use persistence::SqliteFormStore;
pub use store::{FormStore, MemoryFormStore};
