use super::generate_id;

#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub id: String,
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Suggested for the highlight by the transcript generator
    pub suggested: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub sentences: Vec<Sentence>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub id: String,
    /// The video this transcript describes
    pub video_id: String,
    pub full_text: String,
    pub sections: Vec<Section>,
}

impl Transcript {
    pub fn new(
        video_id: impl Into<String>,
        full_text: impl Into<String>,
        sections: Vec<Section>,
    ) -> Self {
        Self {
            id: generate_id(),
            video_id: video_id.into(),
            full_text: full_text.into(),
            sections,
        }
    }

    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.sections.iter().flat_map(|section| section.sentences.iter())
    }

    pub fn sentence_ids(&self) -> impl Iterator<Item = &str> {
        self.sentences().map(|sentence| sentence.id.as_str())
    }

    pub fn contains_sentence(&self, sentence_id: &str) -> bool {
        self.sentence_ids().any(|id| id == sentence_id)
    }
}
