pub mod labels;
pub mod model_catalog;
pub mod worker;
pub mod yolo_engine;
