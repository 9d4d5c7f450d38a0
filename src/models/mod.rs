pub mod bert_sentiment;

pub use bert_sentiment::BertSentimentModel;
