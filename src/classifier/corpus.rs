//! Training and held-out token storage

/// A held-out labeled document, used only for evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDoc {
    /// Index of the true category
    pub category: usize,
    /// Tokens, stored verbatim
    pub tokens: Vec<String>,
}

/// Per-category training tokens plus held-out test documents.
///
/// Training documents are concatenated per category; document boundaries are
/// not kept because sampling works on individual tokens.
#[derive(Debug, Clone, Default)]
pub struct TrainingCorpus {
    tokens: Vec<Vec<String>>,
    test_docs: Vec<TestDoc>,
}

impl TrainingCorpus {
    /// Empty corpus for `categories` categories
    pub fn new(categories: usize) -> Self {
        Self {
            tokens: vec![Vec::new(); categories],
            test_docs: Vec::new(),
        }
    }

    /// Append training tokens to a category
    pub fn add_training<S: AsRef<str>>(&mut self, category: usize, tokens: &[S]) {
        self.tokens[category].extend(tokens.iter().map(|t| t.as_ref().to_string()));
    }

    /// Store a held-out document
    pub fn add_test<S: AsRef<str>>(&mut self, category: usize, tokens: &[S]) {
        self.test_docs.push(TestDoc {
            category,
            tokens: tokens.iter().map(|t| t.as_ref().to_string()).collect(),
        });
    }

    /// All training tokens of a category, in insertion order
    pub fn tokens(&self, category: usize) -> &[String] {
        &self.tokens[category]
    }

    pub fn test_docs(&self) -> &[TestDoc] {
        &self.test_docs
    }

    pub fn category_count(&self) -> usize {
        self.tokens.len()
    }
}
