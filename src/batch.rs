use crate::extract::WorkItem;
use crate::framing::{encode_payload, DELIMITER};

const PIPE: char = '|';

/// Ordered work items for one language, sent as one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub language: String,
    pub items: Vec<WorkItem>,
}

impl Batch {
    fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn sources(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.source.as_str()).collect()
    }

    /// Sources joined by the delimiter
    pub fn encode(&self) -> String {
        encode_payload(&self.sources())
    }

    /// Byte length of [`Batch::encode`] without building it
    pub fn encoded_len(&self) -> usize {
        let sources: usize = self.items.iter().map(|item| item.source.len()).sum();
        sources + DELIMITER.len() * self.items.len().saturating_sub(1)
    }
}

/// Greedily pack one language's items into batches of at most `budget` bytes.
///
/// Order is preserved. An item larger than the budget, or one whose text
/// contains a `|` (any pipe can merge with an adjacent delimiter), travels
/// alone. A budget of 0 therefore sends one string per request.
pub fn plan_batches(language: &str, items: Vec<WorkItem>, budget: usize) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut current = Batch::new(language);
    let mut current_len = 0usize;

    for item in items {
        debug_assert_eq!(item.language, language);

        if item.source.contains(PIPE) {
            if !current.is_empty() {
                batches.push(std::mem::replace(&mut current, Batch::new(language)));
            }
            let mut alone = Batch::new(language);
            alone.items.push(item);
            batches.push(alone);
            current_len = 0;
            continue;
        }

        let item_len = item.source.len();
        if current.is_empty() {
            current_len = item_len;
        } else if current_len + DELIMITER.len() + item_len <= budget {
            current_len += DELIMITER.len() + item_len;
        } else {
            batches.push(std::mem::replace(&mut current, Batch::new(language)));
            current_len = item_len;
        }
        current.items.push(item);
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
