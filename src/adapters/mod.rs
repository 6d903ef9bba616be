pub mod http;
pub mod images;
pub mod onnx;
