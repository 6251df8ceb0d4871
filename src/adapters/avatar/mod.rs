//! Avatar image adapters.

pub mod http_image;

pub use http_image::HttpAvatarImageGenerator;
