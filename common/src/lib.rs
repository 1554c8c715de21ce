//! Vehicle Annotator Common Library
//!
//! CLIとデスクトップビューアで共有されるセッションモデル:
//! フレーム列・フレーム別マーカー・ジェスチャー分類・画像ストアAPI型

pub mod autoplay;
pub mod data_url;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod marker;
pub mod record;
pub mod session;
pub mod viewer;

pub use error::{Error, Result};
pub use geometry::{CanvasSize, Point};
pub use gesture::{GestureClassifier, GestureSettings, InputEvent, Intent};
pub use marker::{Marker, MarkerId, MarkerStore};
pub use record::{ImageRecord, ImagesResponse, UploadRequest, UploadResponse};
pub use session::{AnnotationSession, FrameSnapshot, ViewState};
pub use viewer::{Frame, FrameViewer, MAX_ZOOM, MIN_ZOOM};
