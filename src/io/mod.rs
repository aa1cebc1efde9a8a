pub mod curated;
pub mod report;
pub mod split_cache;
pub mod spots;
pub mod summary;
pub mod table_writer;
