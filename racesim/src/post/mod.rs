pub mod race_result;
pub mod result_store;
