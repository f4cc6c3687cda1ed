pub mod classify_frame_use_case;
pub mod live_classify_use_case;
pub mod pipeline_logger;
