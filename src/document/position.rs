use crate::conventions::Conventions;
use regex::Regex;
use std::collections::BTreeMap;

/// A contiguous run of body text belonging to one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub line: i64,
    pub text: String,
}

/// Body text cut at its line markers, ordered by ascending source line.
///
/// Concatenating the segments in order gives back the body, plus whatever
/// was added to the segments in between.
#[derive(Debug, Clone, Default)]
pub struct PositionIndex {
    segments: Vec<Segment>,
}

impl PositionIndex {
    pub fn build(body: &str, conv: &Conventions) -> Self {
        let marker = Regex::new(&format!(
            r"\b{}\s*\(\s*(\d+)\s*\)",
            regex::escape(&conv.line_marker)
        ))
        .expect("escaped marker pattern is valid");

        // First (lowest-offset) occurrence per line.
        let mut anchors: BTreeMap<i64, usize> = BTreeMap::new();
        for caps in marker.captures_iter(body) {
            let Ok(line) = caps[1].parse::<i64>() else {
                continue;
            };
            let offset = caps.get(0).map_or(0, |m| m.start());
            anchors.entry(line).or_insert(offset);
        }

        let Some(&lowest) = anchors.keys().next() else {
            return Self::default();
        };

        // Walk from the highest line down; each anchor owns the text up to
        // where the previous (higher) anchor began. An anchor lying past that
        // point owns nothing, so the segments always tile the body.
        let mut segments = Vec::with_capacity(anchors.len() + 1);
        let mut end = body.len();
        for (&line, &offset) in anchors.iter().rev() {
            let text = if offset < end {
                let slice = &body[offset..end];
                end = offset;
                slice
            } else {
                ""
            };
            segments.push(Segment {
                line,
                text: text.to_string(),
            });
        }
        segments.push(Segment {
            line: lowest - 1,
            text: body[..end].to_string(),
        });
        segments.reverse();

        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment of the greatest indexed line not after `line`.
    pub fn floor_mut(&mut self, line: i64) -> Option<&mut Segment> {
        self.segments.iter_mut().rev().find(|s| s.line <= line)
    }

    pub fn highest_mut(&mut self) -> Option<&mut Segment> {
        self.segments.last_mut()
    }

    pub fn render(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(index: &PositionIndex) -> Vec<i64> {
        index.segments().iter().map(|s| s.line).collect()
    }

    #[test]
    fn test_segments_tile_the_body() {
        let body = "\nentry();\nMARK(10);\na();\nMARK(20);\nb();\nMARK(10);\nc();\n";
        let index = PositionIndex::build(body, &Conventions::default());
        assert_eq!(lines(&index), vec![9, 10, 20]);
        assert_eq!(index.segments()[0].text, "\nentry();\n");
        assert_eq!(index.segments()[1].text, "MARK(10);\na();\n");
        assert_eq!(index.segments()[2].text, "MARK(20);\nb();\nMARK(10);\nc();\n");
        assert_eq!(index.render(), body);
    }

    #[test]
    fn test_out_of_order_markers_still_reassemble() {
        let body = "x();\nMARK(5);\nloop();\nMARK(3);\ny();\n";
        let index = PositionIndex::build(body, &Conventions::default());
        assert_eq!(lines(&index), vec![2, 3, 5]);
        assert_eq!(index.segments()[1].text, "");
        assert_eq!(index.render(), body);
    }

    #[test]
    fn test_no_markers_gives_empty_index() {
        let index = PositionIndex::build("\nfoo();\n", &Conventions::default());
        assert!(index.is_empty());
    }

    #[test]
    fn test_floor_lookup() {
        let body = "MARK(10);\na();\nMARK(20);\nb();\n";
        let mut index = PositionIndex::build(body, &Conventions::default());
        assert_eq!(index.floor_mut(15).map(|s| s.line), Some(10));
        assert_eq!(index.floor_mut(20).map(|s| s.line), Some(20));
        assert_eq!(index.floor_mut(9).map(|s| s.line), Some(9));
        assert!(index.floor_mut(8).is_none());
    }
}
