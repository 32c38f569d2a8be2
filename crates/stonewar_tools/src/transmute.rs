//! Transmutation planning from the command line.

use std::fmt::Write as _;

use stonewar_core::composition::Composition;
use stonewar_core::error::GameError;
use stonewar_core::transmuter::Transmuter;

use crate::{Result, ToolError};

/// Parse `earth,fire,ice,wind`.
///
/// # Errors
///
/// Returns [`ToolError::BadComposition`] unless the text holds exactly four
/// values in `0..=255`.
pub fn parse_composition(text: &str) -> Result<Composition> {
    let bad = || ToolError::BadComposition(text.to_string());
    let values: Vec<u8> = text
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| bad())?;
    let values: [u8; 4] = values.try_into().map_err(|_| bad())?;
    Ok(Composition::from(values))
}

/// Describe how `silo` pays for `need`.
///
/// # Errors
///
/// Returns an error if the silo cannot cover the need.
pub fn describe_plan(silo: Composition, need: Composition) -> Result<String> {
    let mut transmuter = Transmuter::new(silo, need);
    let plan = transmuter.plan().map_err(GameError::from)?;

    let mut out = String::new();
    let _ = writeln!(out, "silo:   {silo}");
    let _ = writeln!(out, "need:   {need}");
    let _ = writeln!(out, "direct: {}", plan.direct);
    if plan.is_direct() {
        let _ = writeln!(out, "no conversion needed");
    } else {
        for conversion in &plan.conversions {
            let _ = writeln!(
                out,
                "  {} {} -> {} {}",
                conversion.spent, conversion.from, conversion.produced, conversion.to
            );
        }
        let _ = writeln!(out, "converted: {}", plan.converted);
    }
    let total = plan.total().map_err(GameError::from)?;
    let _ = write!(out, "total:  {total}");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_composition() {
        assert_eq!(parse_composition("1, 2,3,4").unwrap(), Composition::new(1, 2, 3, 4));
        assert!(parse_composition("1,2,3").is_err());
        assert!(parse_composition("1,2,3,256").is_err());
        assert!(parse_composition("a,b,c,d").is_err());
    }

    #[test]
    fn test_describe_conversion() {
        let text = describe_plan(Composition::new(1, 2, 2, 2), Composition::new(2, 1, 0, 0)).unwrap();
        assert!(text.contains("2 ice -> 1 earth"));
        assert!(text.contains("converted: E0 F0 I2 W0"));
    }

    #[test]
    fn test_describe_failure() {
        let err = describe_plan(Composition::new(1, 0, 0, 0), Composition::new(0, 5, 0, 0)).unwrap_err();
        assert!(matches!(err, ToolError::Game(GameError::Transmute(_))));
    }
}
