pub mod bucket;
pub mod canonical;
pub mod credit;
pub mod curriculum;
pub mod etl;
pub mod grade;
pub mod matrix;
pub mod pipeline;
pub mod reconcile;
pub mod term;
pub mod transcript;

pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
