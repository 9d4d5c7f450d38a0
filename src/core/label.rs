use serde::{Serialize, Serializer};

/// One of the five sentiment classes, ordered from most negative to most positive.
///
/// The model's output position `i` corresponds to rank `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SentimentLabel {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl SentimentLabel {
    /// Every label, indexed by `rank - 1`.
    pub const ALL: [SentimentLabel; 5] = [
        SentimentLabel::VeryNegative,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
        SentimentLabel::VeryPositive,
    ];

    /// Maps a 1-based rank to its label. Ranks outside `1..=5` have no label.
    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1..=5 => Some(Self::ALL[usize::from(rank - 1)]),
            _ => None,
        }
    }

    /// Maps a zero-based model output position to its label.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn rank(&self) -> u8 {
        match self {
            SentimentLabel::VeryNegative => 1,
            SentimentLabel::Negative => 2,
            SentimentLabel::Neutral => 3,
            SentimentLabel::Positive => 4,
            SentimentLabel::VeryPositive => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::VeryNegative => "Very Negative",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positive",
            SentimentLabel::VeryPositive => "Very Positive",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for SentimentLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_map_to_labels_in_order() {
        let names: Vec<&str> = (1..=5)
            .map(|rank| SentimentLabel::from_rank(rank).unwrap().as_str())
            .collect();
        assert_eq!(
            names,
            ["Very Negative", "Negative", "Neutral", "Positive", "Very Positive"]
        );
    }

    #[test]
    fn out_of_range_ranks_have_no_label() {
        assert_eq!(SentimentLabel::from_rank(0), None);
        assert_eq!(SentimentLabel::from_rank(6), None);
        assert_eq!(SentimentLabel::from_index(5), None);
    }

    #[test]
    fn rank_round_trips_through_table() {
        for (i, label) in SentimentLabel::ALL.iter().enumerate() {
            assert_eq!(usize::from(label.rank()), i + 1);
            assert_eq!(SentimentLabel::from_index(i), Some(*label));
        }
    }

    #[test]
    fn serializes_as_display_string() {
        let json = serde_json::to_string(&SentimentLabel::VeryPositive).unwrap();
        assert_eq!(json, "\"Very Positive\"");
    }
}
