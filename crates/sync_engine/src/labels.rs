//! Channel label sanitization.

/// Character substitutions applied to imported channel labels
const SUBSTITUTIONS: [(char, char); 3] = [('_', '-'), ('[', '('), (']', ')')];

/// Make a label safe for downstream channel naming.
///
/// Underscores become hyphens, square brackets become parentheses, and
/// whitespace is trimmed and collapsed to single spaces. Idempotent.
///
/// `"gaze_x [px]"` → `"gaze-x (px)"`
pub fn sanitize_label(label: &str) -> String {
    let substituted: String = label
        .chars()
        .map(|c| {
            SUBSTITUTIONS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect();
    substituted.split_whitespace().collect::<Vec<_>>().join(" ")
}
