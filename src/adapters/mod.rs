pub mod http;
pub mod image;
pub mod onnx;
