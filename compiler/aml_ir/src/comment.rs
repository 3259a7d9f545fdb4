//! Leading comments attached to nodes.

/// Comment lines immediately preceding a node, markers stripped.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Comments {
    pub lines: Vec<String>,
}

impl Comments {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Comments {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    /// The comment text as a single description, lines joined by newlines
    /// and surrounding whitespace trimmed.
    pub fn description(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}
