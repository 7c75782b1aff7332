pub mod gcs_store;
pub mod local_store;
