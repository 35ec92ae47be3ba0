//! The `gradecurve kinds` command.

use anyhow::Result;

use gradecurve_core::CurveKind;

pub fn execute() -> Result<()> {
    println!("Available curve kinds:\n");
    for kind in CurveKind::ALL {
        println!("  {:<8}: {}", kind.name(), kind.description());
        match kind.parameter_hint() {
            Some(hint) => println!("            --value: {hint}"),
            None => println!("            no value needed"),
        }
    }
    Ok(())
}
