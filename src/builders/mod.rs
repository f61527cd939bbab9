mod batch;
mod config;
mod delete;
mod insert;
mod merge;
mod update;

pub(crate) use batch::Batch;
pub use config::{ColumnMapping, StatementGeneratorConfig, StatementGeneratorConfigBuilder};
pub use delete::DeleteGenerator;
pub use insert::InsertGenerator;
pub use merge::MergeGenerator;
pub use update::UpdateGenerator;
