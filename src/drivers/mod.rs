mod mock;
mod tokio_postgres;

pub use self::mock::{MockDriver, MockResponseBuilder, RecordedQuery};
pub use self::tokio_postgres::TokioPostgresDriver;
