pub mod curve;
pub mod init;
pub mod kinds;
pub mod stats;
pub mod validate;

use gradecurve_core::config::GradecurveConfig;
use gradecurve_core::tabular::{KeyLayout, Schema};

use crate::InputArgs;

/// Input schema from the config file, with command-line flags layered on top.
fn resolve_schema(args: InputArgs, config: &GradecurveConfig) -> Schema {
    let mut schema = config.schema();
    if args.header {
        schema.has_header = true;
    }
    if args.class_column {
        schema.key = KeyLayout::StudentClass;
    }
    tracing::debug!("input schema: {schema:?}");
    schema
}
