pub mod cleanup;
pub mod prediction;
pub mod storage;
