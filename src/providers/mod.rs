pub mod data912;
