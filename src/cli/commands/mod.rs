pub mod backup;
pub mod history;
pub mod push;
pub mod restore;
pub mod restore_remote;
pub mod validate;
