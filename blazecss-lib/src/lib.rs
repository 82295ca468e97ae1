pub mod blaze_merge;
pub mod config;
pub mod error;

pub mod parser {
    pub mod blaze_css;
    pub mod printer;
}

pub mod style {
    pub mod capabilities;
    pub mod cascade;
    pub mod declarations;
    pub mod merge_rules;
    pub mod owned_css;
    pub mod selector_compare;
    pub mod size;
}

pub use blaze_merge::blaze_css_merge::merge_css;
pub use config::{MergeOptions, TargetQuery};
pub use error::BlazeCssError;
