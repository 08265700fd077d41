pub mod thread_store;

pub use thread_store::ThreadStore;
