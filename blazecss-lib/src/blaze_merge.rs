use crate::config::MergeOptions;
use crate::error::BlazeCssError;
use crate::parser::{blaze_css, printer};
use crate::style::{merge_rules, size};

pub mod blaze_css_merge {
    use super::*;
    use log::info;

    /// Parse `css_content`, merge its rules for the configured targets and
    /// print the result.
    pub fn merge_css(css_content: &str, options: &MergeOptions) -> Result<String, BlazeCssError> {
        if options.validate {
            blaze_css::validate_with_lightningcss(css_content)?;
        }
        let capabilities = options.targets.resolve()?;
        let stylesheet = blaze_css::parse_stylesheet(css_content)?;

        let estimate_before = size::estimated_container_bytes(&stylesheet);
        let merged = merge_rules::merge_container(stylesheet, &capabilities);
        let estimate_after = size::estimated_container_bytes(&merged);

        let output = printer::print_container(&merged);
        info!(
            "merged stylesheet: {} -> {} bytes (rules {} -> {} minified)",
            css_content.len(),
            output.len(),
            estimate_before,
            estimate_after
        );
        Ok(output)
    }
}
