pub mod backup_record;
pub mod manifest;
pub mod secret_key;
