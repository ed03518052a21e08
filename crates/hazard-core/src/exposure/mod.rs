//! Exposure evaluation: association dispatch and transmission math

mod evaluator;
mod transmission;

pub use evaluator::ExposureEvaluator;
