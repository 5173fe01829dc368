//! Embedded PostgreSQL helpers shared by database-backed integration tests.
//!
//! Suites can be skipped where a cluster cannot start by setting
//! `SKIP_TEST_CLUSTER`; otherwise setup failures panic so CI breakage is not
//! masked.

use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::{Connection, RunQueryDsl};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true", or "yes"
/// (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when allowed, panic otherwise.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Process-wide embedded cluster, retried while a sibling test binary still
/// holds the data directory.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= SHARED_CLUSTER_RETRIES => return Err(format!("{error:?}")),
            Err(_) => {
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Fresh, empty database dropped when the handle goes out of scope.
pub fn empty_database() -> Result<TemporaryDatabase, String> {
    shared_cluster()?
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4().simple()))
        .map_err(|error| format!("create temporary database: {error:?}"))
}

/// Run raw SQL on a short-lived synchronous connection.
pub fn execute_sql(url: &str, sql: &str) -> Result<usize, String> {
    let mut conn = PgConnection::establish(url).map_err(|error| error.to_string())?;
    diesel::sql_query(sql)
        .execute(&mut conn)
        .map_err(|error| error.to_string())
}
