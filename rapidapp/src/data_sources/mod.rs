pub mod postgres_database;

pub use postgres_database::PostgresDatabaseDataSource;
