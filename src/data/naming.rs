use std::sync::OnceLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Subcase naming conventions
// ---------------------------------------------------------------------------

/// How a dataset encodes operating conditions in its subcase folder names.
///
/// Patterns are anchored at the start of the name only, so trailing text
/// after a valid prefix (`10hz_50%_1500rpm_run2`) still matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPattern {
    /// `{int}hz_{int}%_{int}rpm`
    Standard,
    /// `{int}mm_{int}mm_mn_{int}rpm`
    ToolWear,
    /// `Drifts_axis_{int}_{float}[_axis_{int}_{float}]` or `Healthy_robot`
    Drifts,
}

/// Result of matching a subcase folder name.
#[derive(Debug, Clone, PartialEq)]
pub enum SubcaseMatch {
    /// Three integer condition fields, in name order.
    Conditions([i64; 3]),
    /// A drift subcase; `axes` is empty for the healthy baseline.
    Drift { axes: Vec<AxisDrift> },
}

/// One `axis_{int}_{float}` component of a drift subcase name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisDrift {
    pub axis: u32,
    pub offset: f64,
}

pub const HEALTHY_ROBOT: &str = "Healthy_robot";

fn standard_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)hz_(\d+)%_(\d+)rpm").expect("valid regex"))
}

fn toolwear_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)mm_(\d+)mm_mn_(\d+)rpm").expect("valid regex"))
}

fn drifts_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:Drifts_axis_(\d+)_?([+-]?\d+(?:\.\d+)?)(?:_axis_(\d+)_?([+-]?\d+(?:\.\d+)?))?|Healthy_robot)",
        )
        .expect("valid regex")
    })
}

impl NamingPattern {
    /// Match `name` against this pattern. `None` means the folder does
    /// not follow the convention (or a number overflows).
    pub fn parse(self, name: &str) -> Option<SubcaseMatch> {
        match self {
            NamingPattern::Standard => parse_conditions(standard_re(), name),
            NamingPattern::ToolWear => parse_conditions(toolwear_re(), name),
            NamingPattern::Drifts => parse_drift(name),
        }
    }

    /// Human-readable form of the convention, used in warnings.
    pub fn describe(self) -> &'static str {
        match self {
            NamingPattern::Standard => {
                "Xhz_Y%_Zrpm where X, Y, Z are integer values"
            }
            NamingPattern::ToolWear => {
                "Xmm_Ymm_mn_Zrpm where X, Y, Z are integer values"
            }
            NamingPattern::Drifts => {
                "Drifts_axis_N_OFFSET[_axis_N_OFFSET] or Healthy_robot"
            }
        }
    }
}

fn parse_conditions(re: &Regex, name: &str) -> Option<SubcaseMatch> {
    let caps = re.captures(name)?;
    let mut fields = [0i64; 3];
    for (i, field) in fields.iter_mut().enumerate() {
        *field = caps.get(i + 1)?.as_str().parse().ok()?;
    }
    Some(SubcaseMatch::Conditions(fields))
}

fn parse_drift(name: &str) -> Option<SubcaseMatch> {
    let caps = drifts_re().captures(name)?;
    let mut axes = Vec::new();
    for (axis_idx, offset_idx) in [(1, 2), (3, 4)] {
        if let (Some(axis), Some(offset)) = (caps.get(axis_idx), caps.get(offset_idx)) {
            axes.push(AxisDrift {
                axis: axis.as_str().parse().ok()?,
                offset: offset.as_str().parse().ok()?,
            });
        }
    }
    Some(SubcaseMatch::Drift { axes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_extracts_three_integers() {
        assert_eq!(
            NamingPattern::Standard.parse("10hz_50%_1500rpm"),
            Some(SubcaseMatch::Conditions([10, 50, 1500]))
        );
        assert_eq!(
            NamingPattern::Standard.parse("40hz_100%_2400rpm_bis"),
            Some(SubcaseMatch::Conditions([40, 100, 2400]))
        );
    }

    #[test]
    fn standard_rejects_other_names() {
        assert_eq!(NamingPattern::Standard.parse("10hz-50%-1500rpm"), None);
        assert_eq!(NamingPattern::Standard.parse("run_10hz_50%_1500rpm"), None);
        assert_eq!(NamingPattern::Standard.parse("5mm_648mm_mn_9000rpm"), None);
        assert_eq!(
            NamingPattern::Standard.parse("99999999999999999999hz_1%_1rpm"),
            None
        );
    }

    #[test]
    fn toolwear_extracts_depth_feed_speed() {
        assert_eq!(
            NamingPattern::ToolWear.parse("5mm_648mm_mn_9000rpm"),
            Some(SubcaseMatch::Conditions([5, 648, 9000]))
        );
        assert_eq!(NamingPattern::ToolWear.parse("10hz_50%_1500rpm"), None);
    }

    #[test]
    fn drifts_single_and_double_axis() {
        assert_eq!(
            NamingPattern::Drifts.parse("Drifts_axis_2_-0.5"),
            Some(SubcaseMatch::Drift {
                axes: vec![AxisDrift { axis: 2, offset: -0.5 }]
            })
        );
        assert_eq!(
            NamingPattern::Drifts.parse("Drifts_axis_1_+1_axis_3_0.25"),
            Some(SubcaseMatch::Drift {
                axes: vec![
                    AxisDrift { axis: 1, offset: 1.0 },
                    AxisDrift { axis: 3, offset: 0.25 },
                ]
            })
        );
    }

    #[test]
    fn drifts_healthy_baseline() {
        assert_eq!(
            NamingPattern::Drifts.parse(HEALTHY_ROBOT),
            Some(SubcaseMatch::Drift { axes: Vec::new() })
        );
        assert_eq!(NamingPattern::Drifts.parse("Unhealthy_robot"), None);
    }
}
