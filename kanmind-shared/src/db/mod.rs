/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a start-up health check
/// - `migrations`: embedded schema migrations
///
/// Entity queries live next to their types in the `models` module.

pub mod migrations;
pub mod pool;
