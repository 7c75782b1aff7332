pub mod xchacha_backend;
