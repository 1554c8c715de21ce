//! vehicle-annotator: 車両写真のマーキング・合成・保存

pub mod annotate;
pub mod cli;
pub mod compositor;
pub mod config;
pub mod error;
pub mod gallery;
pub mod logging;
pub mod marks;
pub mod platform;
pub mod replay;
pub mod scanner;
pub mod sync;
