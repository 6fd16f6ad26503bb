// PostgreSQL transport
//
// - session: the Session/Connector seam and its tokio-postgres implementation
// - query: assembling simple-protocol messages into results

pub mod query;
pub mod session;

pub use query::{ResultAssembler, build_result_data, postgres_extract_value};
pub use session::{Connector, PgConnector, PgSession, Session};
