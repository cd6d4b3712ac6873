//! Library-level scoring with offline naming services

use codequal::classifier::{train_gbdt, GbdtModel, SmellClassifier, SMELL_FEATURE_COUNT};
use codequal::models::{FragmentKind, SmellLabel};
use codequal::naming::{
    Embedder, InMemoryIndex, NamingScorer, ServiceResult, VocabularyWriter,
};
use codequal::pipeline::ScoringPipeline;
use codequal::scoring::ScoreAggregator;

/// Embeds known words on their own axis; everything else on the last axis
struct AxisEmbedder {
    words: Vec<&'static str>,
}

impl Embedder for AxisEmbedder {
    fn embed(&self, words: &[String]) -> ServiceResult<Vec<Vec<f32>>> {
        Ok(words
            .iter()
            .map(|word| {
                let mut vector = vec![0.0; self.words.len() + 1];
                let axis = self
                    .words
                    .iter()
                    .position(|w| w == word)
                    .unwrap_or(self.words.len());
                vector[axis] = 1.0;
                vector
            })
            .collect())
    }
}

/// Flags fragments with at least `lines` total lines
fn line_count_model(lines: f64) -> GbdtModel {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for i in 0..30 {
        let mut row = vec![0.0; SMELL_FEATURE_COUNT];
        row[0] = i as f64;
        rows.push(row);
        labels.push(if (i as f64) < lines { -1.0 } else { 1.0 });
    }
    train_gbdt(&rows, &labels, 20, 2, 0.5).unwrap()
}

const SOURCE: &str = r#"class UserRepository:
    def find_user(self, user_id):
        return self.users.get(user_id)

    def qzx(self):
        pass


async def fetch_user(user_id):
    return user_id
"#;

#[test]
fn test_score_file_with_offline_services() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repo.py");
    std::fs::write(&path, SOURCE).unwrap();

    let embedder = AxisEmbedder {
        words: vec!["user", "repository", "find", "fetch"],
    };
    let index = InMemoryIndex::new();
    let words: Vec<String> = embedder.words.iter().map(|w| w.to_string()).collect();
    VocabularyWriter::new(&embedder, &index)
        .with_side_files(dir.path().join("ok.csv"), dir.path().join("failed.csv"))
        .upload(&words)
        .unwrap();
    assert_eq!(index.len(), 4);

    let smell = SmellClassifier::new(Box::new(line_count_model(25.0)), Box::new(line_count_model(25.0)));
    let pipeline = ScoringPipeline::new(smell, NamingScorer::new(&embedder, &index), ScoreAggregator::default());

    let report = pipeline.score_file(&path).unwrap();
    let results = &report.results;
    assert_eq!(results.len(), 4);

    assert_eq!(results[0].kind, FragmentKind::Class);
    assert_eq!(results[0].entity_name.as_deref(), Some("UserRepository"));
    assert_eq!(results[0].name_score, 10);

    assert_eq!(results[1].entity_name.as_deref(), Some("find_user"));
    assert_eq!(results[1].name_score, 10);

    // Unknown word: no match above the threshold
    assert_eq!(results[2].entity_name.as_deref(), Some("qzx"));
    assert_eq!(results[2].name_score, 0);

    assert_eq!(results[3].entity_name.as_deref(), Some("fetch_user"));
    assert_eq!(results[3].start_line, 9);

    for result in results {
        assert_eq!(result.smell, SmellLabel::No);
        assert!(result.maintainability > 0.0 && result.maintainability <= 100.0);
    }
}
