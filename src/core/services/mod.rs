pub mod backup_service;
pub mod crypto_vault;
pub mod hasher;
pub mod manifest_service;
pub mod restore_service;
