mod db_pools;

pub use db_pools::{mongo_client, postgres_pool};
