pub mod skipbo;
