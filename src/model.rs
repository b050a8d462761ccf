use std::collections::{HashMap, HashSet};

/// 1-based line number of a document in the documents file.
pub type DocId = u32;

#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct DocumentCollection {
    documents: Vec<Document>,
}

impl DocumentCollection {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        let index = (id as usize).checked_sub(1)?;
        self.documents.get(index)
    }

    pub fn title(&self, id: DocId) -> &str {
        self.get(id).map_or("(unknown document)", |doc| doc.title.as_str())
    }
}

/// Documents judged relevant for one query, in input order.
#[derive(Debug, Clone, Default)]
pub struct RelevantSet {
    ids: Vec<DocId>,
    lookup: HashSet<DocId>,
}

impl RelevantSet {
    /// Builds a set from input ids; repeated ids are kept once.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = DocId>,
    {
        let mut set = Self::default();
        for id in ids {
            if set.lookup.insert(id) {
                set.ids.push(id);
            }
        }
        set
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.lookup.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[DocId] {
        &self.ids
    }
}

/// Benchmark queries with their relevance judgments.
///
/// `queries` fixes the key domain and its display order; every query in it
/// has an entry in `relevant`.
#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    queries: Vec<String>,
    relevant: HashMap<String, RelevantSet>,
}

impl GroundTruth {
    /// Adds a query. Returns false if it was already present.
    pub fn insert(&mut self, query: String, relevant: RelevantSet) -> bool {
        if self.relevant.contains_key(&query) {
            return false;
        }
        self.queries.push(query.clone());
        self.relevant.insert(query, relevant);
        true
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn relevant(&self, query: &str) -> Option<&RelevantSet> {
        self.relevant.get(query)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelevantSet)> {
        self.queries
            .iter()
            .filter_map(|query| self.relevant.get(query).map(|set| (query.as_str(), set)))
    }
}

/// One (k, b) parameterization and the rankings it produced.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub k: String,
    pub b: String,
    rankings: HashMap<String, Vec<DocId>>,
}

impl Configuration {
    pub fn new(k: String, b: String, rankings: HashMap<String, Vec<DocId>>) -> Self {
        Self { k, b, rankings }
    }

    /// Ranked results for `query`; a query the mode never answered has none.
    pub fn ranking(&self, query: &str) -> &[DocId] {
        self.rankings.get(query).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn label(&self) -> String {
        format!("k = {}, b = {}", self.k, self.b)
    }
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub ground_truth: GroundTruth,
    pub configurations: Vec<Configuration>,
}

impl Evaluation {
    /// Looks up a configuration by its 1-based mode number.
    pub fn mode(&self, mode: usize) -> Option<&Configuration> {
        self.configurations.get(mode.checked_sub(1)?)
    }
}
