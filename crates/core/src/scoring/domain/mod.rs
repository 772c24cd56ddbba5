pub mod accuracy_grade;
pub mod normalizer;
pub mod word_accuracy_scorer;
pub mod word_similarity;
