pub mod archiver;
pub mod cipher;
pub mod history;
pub mod key_store;
pub mod object_store;
