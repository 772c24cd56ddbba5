pub mod accuracy_report;
pub mod dataset;
pub mod evaluate_dataset_use_case;
pub mod evaluation_logger;
