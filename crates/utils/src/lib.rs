pub mod assets;
pub mod date;
pub mod html;
pub mod response;
pub mod serde_ext;
