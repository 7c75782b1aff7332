pub mod tar_zstd;
