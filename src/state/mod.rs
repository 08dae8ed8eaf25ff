// 任务状态

mod context;

pub use context::{FileContext, TaskContext};
