mod generate;

pub use generate::{
    generate_all, plan_artifacts, GenerateOptions, GenerationReport, TemplateSet,
};
