pub mod archive;
pub mod cipher;
pub mod fs;
pub mod history;
pub mod key_stores;
pub mod storage;
