pub mod atomic;
pub mod lock;
pub mod selector;
