use crate::error::BlazeCssError;
use crate::style::capabilities::CapabilitySet;
use lightningcss::targets::Browsers;
use log::{debug, warn};

/// Which browsers the merged stylesheet has to keep working in.
#[derive(Debug, Clone)]
pub enum TargetQuery {
    /// Browserslist queries such as `"defaults"` or `"ie >= 9"`.
    Browserslist(Vec<String>),
    /// Versions already resolved by the caller.
    Browsers(Browsers),
    /// Assume nothing beyond CSS1 selectors.
    Legacy,
    /// Assume every selector feature is available.
    Modern,
}

impl Default for TargetQuery {
    fn default() -> Self {
        TargetQuery::Browserslist(vec!["defaults".to_string()])
    }
}

impl TargetQuery {
    /// Resolve the query into the capability set every comparison of a run
    /// shares. A browserslist query that matches no browsers falls back to
    /// the legacy set.
    pub fn resolve(&self) -> Result<CapabilitySet, BlazeCssError> {
        match self {
            TargetQuery::Legacy => Ok(CapabilitySet::legacy()),
            TargetQuery::Modern => Ok(CapabilitySet::modern()),
            TargetQuery::Browsers(browsers) => Ok(CapabilitySet::compile(browsers)),
            TargetQuery::Browserslist(queries) => {
                let resolved = Browsers::from_browserslist(queries.iter())
                    .map_err(|e| BlazeCssError::InvalidTargets(e.to_string()))?;
                match resolved {
                    Some(browsers) => {
                        debug!("targets {:?} resolved to {:?}", queries, browsers);
                        Ok(CapabilitySet::compile(&browsers))
                    }
                    None => {
                        warn!(
                            "browserslist query {:?} matched no browsers, assuming legacy targets",
                            queries
                        );
                        Ok(CapabilitySet::legacy())
                    }
                }
            }
        }
    }
}

/// Options for one `merge_css` run.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub targets: TargetQuery,
    /// Run the input through lightningcss before merging and fail on its
    /// first error.
    pub validate: bool,
}

impl MergeOptions {
    pub fn with_targets(targets: TargetQuery) -> Self {
        MergeOptions {
            targets,
            validate: false,
        }
    }
}
