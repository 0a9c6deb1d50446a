use crate::model::{Issue, IssueType};
use std::collections::BTreeMap;

/// A contrast record only counts when it actually failed, even if a passing
/// one slipped into the list.
fn counts(issue: &Issue) -> bool {
    match issue.issue_type() {
        IssueType::Contrast => issue
            .node_data()
            .contrast_score
            .is_some_and(|score| score.is_fail()),
        _ => true,
    }
}

/// Issues of one type, in their original order.
pub fn group_by_type(issues: &[Issue], issue_type: IssueType) -> Vec<&Issue> {
    issues
        .iter()
        .filter(|issue| issue.issue_type() == issue_type && counts(issue))
        .collect()
}

/// Issue count per type. Every type is present, zero when nothing matched.
pub fn count_by_type(issues: &[Issue]) -> BTreeMap<IssueType, usize> {
    let mut totals: BTreeMap<IssueType, usize> =
        IssueType::ALL.iter().map(|&t| (t, 0)).collect();

    for issue in issues.iter().filter(|issue| counts(issue)) {
        *totals.entry(issue.issue_type()).or_insert(0) += 1;
    }
    totals
}

/// Every reportable issue, dropping stray passing contrast records.
pub fn reportable(issues: &[Issue]) -> Vec<&Issue> {
    issues.iter().filter(|issue| counts(issue)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, Compliance, ContrastResult, NodeData};

    fn data(id: &str) -> NodeData {
        NodeData {
            id: id.to_string(),
            name: id.to_string(),
            ..Default::default()
        }
    }

    fn contrast(id: &str, compliance: Compliance) -> Issue {
        Issue::contrast(
            data(id),
            ContrastResult {
                ratio: 2.0,
                compliance,
            },
            Color::BLACK,
            Color::WHITE,
        )
    }

    fn sample() -> Vec<Issue> {
        vec![
            Issue::typography(data("t1")),
            contrast("c1", Compliance::Fail),
            Issue::touch_target_size(data("b1"), 44.0),
            contrast("c2", Compliance::Aa),
            Issue::typography(data("t2")),
        ]
    }

    #[test]
    fn test_group_preserves_order() {
        let issues = sample();
        let typography: Vec<_> = group_by_type(&issues, IssueType::Typography)
            .iter()
            .map(|i| i.node_id())
            .collect();
        assert_eq!(typography, vec!["t1", "t2"]);
    }

    #[test]
    fn test_passing_contrast_is_filtered() {
        let issues = sample();
        let contrast: Vec<_> = group_by_type(&issues, IssueType::Contrast)
            .iter()
            .map(|i| i.node_id())
            .collect();
        assert_eq!(contrast, vec!["c1"]);
        assert_eq!(reportable(&issues).len(), 4);
    }

    #[test]
    fn test_count_by_type_includes_zeroes() {
        let counts = count_by_type(&sample());
        assert_eq!(counts[&IssueType::Typography], 2);
        assert_eq!(counts[&IssueType::Contrast], 1);
        assert_eq!(counts[&IssueType::TouchTargetSize], 1);
        assert_eq!(counts[&IssueType::TouchTargetSpacing], 0);
    }
}
