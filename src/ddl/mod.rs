//! DDL generation: statement buffers, the five-channel write, the table level
//! generator and migration batches.

mod batch;
mod buffer;
mod generator;
mod history;
mod table_ddl;
mod write;

pub use batch::MigrationBatch;
pub use buffer::DdlBuffer;
pub use generator::DdlGenerator;
pub use history::{HistoryChange, HistoryTriggerTracker};
pub use table_ddl::TableDdl;
pub use write::DdlWrite;
