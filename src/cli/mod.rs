pub mod orchestration;

pub use orchestration::{
    gather_context, run_analyze, run_prepare, run_release, AnalyzeResult, ReleaseContext,
    WorkflowArgs, WorkflowResult,
};
