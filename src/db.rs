pub mod store;
pub use store::{AccountStore, RecordStore};
pub mod account_repo;
pub use account_repo::AccountRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod job_repo;
pub use job_repo::JobRepository;
pub mod memory;
pub use memory::{MemoryAccountStore, MemoryRecordStore};
