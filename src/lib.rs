pub mod animation;
pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod kernels;
pub mod pacer;
pub mod scene;
pub mod source;
pub mod textures;
pub mod render {
    pub mod viewer;
}

pub use error::Error;
