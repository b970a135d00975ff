pub mod query;
pub mod row;
pub mod table;
