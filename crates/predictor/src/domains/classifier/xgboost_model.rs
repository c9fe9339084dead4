use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

use crate::{ClassifierError, DelayClassifier, FeatureSchema, FeatureVector, SchemaMismatch};

/*
Reads the JSON model format written by XGBoost's `Booster.save_model("model.json")`.
Only the pieces needed for inference are decoded:

learner.attributes.best_iteration            set by early stopping, optional
learner.feature_names                        column names, optional
learner.learner_model_param.base_score       probability, "5E-1" or "[5E-1]"
learner.learner_model_param.num_feature
learner.objective.name                       must be binary:logistic
learner.gradient_booster.name                must be gbtree
learner.gradient_booster.model.gbtree_model_param.num_parallel_tree
learner.gradient_booster.model.trees[]       parallel arrays per node
*/
#[derive(Debug, Deserialize)]
struct ModelFile {
    learner: Learner,
}

#[derive(Debug, Deserialize)]
struct Learner {
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: GradientBooster,
    learner_model_param: LearnerModelParam,
    objective: Objective,
}

#[derive(Debug, Default, Deserialize)]
struct Attributes {
    best_iteration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GradientBooster {
    name: String,
    model: Option<GbTreeModel>,
}

#[derive(Debug, Deserialize)]
struct GbTreeModel {
    #[serde(default)]
    gbtree_model_param: GbTreeModelParam,
    trees: Vec<RawTree>,
}

#[derive(Debug, Default, Deserialize)]
struct GbTreeModelParam {
    num_parallel_tree: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    num_feature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Objective {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawTree {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f64>,
    #[serde(deserialize_with = "flags")]
    default_left: Vec<bool>,
}

// older writers emit 0/1, newer ones true/false
fn flags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<bool>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    let raw = Vec::<Flag>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|flag| match flag {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        })
        .collect())
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf(f64),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_raw(raw: RawTree, num_feature: usize) -> Result<Self, ClassifierError> {
        let count = raw.left_children.len();
        if count == 0
            || raw.right_children.len() != count
            || raw.split_indices.len() != count
            || raw.split_conditions.len() != count
            || raw.default_left.len() != count
        {
            return Err(ClassifierError::Malformed(String::from(
                "tree node arrays differ in length",
            )));
        }

        let mut nodes = Vec::with_capacity(count);
        for id in 0..count {
            let left = raw.left_children[id];
            if left < 0 {
                nodes.push(Node::Leaf(raw.split_conditions[id]));
                continue;
            }
            let right = raw.right_children[id];
            let feature = raw.split_indices[id];
            // children always come after their parent, so walks terminate
            let child_ok = |child: i64| child > id as i64 && (child as usize) < count;
            if !child_ok(left) || !child_ok(right) {
                return Err(ClassifierError::Malformed(format!(
                    "node {} has out of order children {} and {}",
                    id, left, right
                )));
            }
            if feature < 0 || feature as usize >= num_feature {
                return Err(ClassifierError::Malformed(format!(
                    "node {} splits on feature {} of {}",
                    id, feature, num_feature
                )));
            }
            nodes.push(Node::Split {
                feature: feature as usize,
                threshold: raw.split_conditions[id] as f32,
                left: left as usize,
                right: right as usize,
                default_left: raw.default_left[id],
            });
        }
        Ok(Tree { nodes })
    }

    fn leaf_value(&self, features: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let value = features[feature];
                    id = if value.is_nan() {
                        if default_left {
                            left
                        } else {
                            right
                        }
                    } else if (value as f32) < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Gradient-boosted tree ensemble trained with the `binary:logistic` objective
#[derive(Debug, Clone)]
pub struct GradientBoostedTrees {
    feature_names: Vec<String>,
    num_feature: usize,
    base_margin: f64,
    trees: Vec<Tree>,
}

impl GradientBoostedTrees {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ClassifierError> {
        let model: ModelFile = serde_json::from_str(content)?;
        let learner = model.learner;

        if learner.objective.name != "binary:logistic" {
            return Err(ClassifierError::Unsupported(format!(
                "objective {}",
                learner.objective.name
            )));
        }
        if learner.gradient_booster.name != "gbtree" {
            return Err(ClassifierError::Unsupported(format!(
                "booster {}",
                learner.gradient_booster.name
            )));
        }

        let num_feature = match learner.learner_model_param.num_feature {
            Some(raw) => parse_count("num_feature", &raw)?,
            None => learner.feature_names.len(),
        };
        if !learner.feature_names.is_empty() && learner.feature_names.len() != num_feature {
            return Err(ClassifierError::Malformed(format!(
                "{} feature names for {} features",
                learner.feature_names.len(),
                num_feature
            )));
        }

        let base_score = parse_base_score(&learner.learner_model_param.base_score)?;

        let model = learner
            .gradient_booster
            .model
            .ok_or_else(|| ClassifierError::Malformed(String::from("gbtree without model")))?;
        let mut raw_trees = model.trees;
        // an early-stopped model only predicts with rounds 0..=best_iteration
        if let Some(raw) = learner.attributes.best_iteration {
            let best_iteration = parse_count("best_iteration", &raw)?;
            let parallel = match model.gbtree_model_param.num_parallel_tree {
                Some(raw) => parse_count("num_parallel_tree", &raw)?.max(1),
                None => 1,
            };
            raw_trees.truncate((best_iteration + 1) * parallel);
        }
        let trees = raw_trees
            .into_iter()
            .map(|raw| Tree::from_raw(raw, num_feature))
            .collect::<Result<Vec<Tree>, ClassifierError>>()?;

        Ok(GradientBoostedTrees {
            feature_names: learner.feature_names,
            num_feature,
            base_margin: probability_to_margin(base_score),
            trees,
        })
    }

    pub fn num_feature(&self) -> usize {
        self.num_feature
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Fail loudly at startup rather than score a misaligned vector later
    pub fn check_schema(&self, schema: &FeatureSchema) -> Result<(), SchemaMismatch> {
        if !self.feature_names.is_empty() {
            return schema.check_columns(&self.feature_names);
        }
        if self.num_feature != schema.len() {
            return Err(SchemaMismatch::ColumnCount {
                expected: self.num_feature,
                actual: schema.len(),
            });
        }
        Ok(())
    }

    /// `features` must hold `num_feature` values; `score` checks this
    fn predict_proba(&self, features: &[f64]) -> f64 {
        let margin = self.base_margin
            + self
                .trees
                .iter()
                .map(|tree| tree.leaf_value(features))
                .sum::<f64>();
        sigmoid(margin)
    }
}

impl DelayClassifier for GradientBoostedTrees {
    fn score(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        if features.len() != self.num_feature {
            return Err(SchemaMismatch::ColumnCount {
                expected: self.num_feature,
                actual: features.len(),
            }
            .into());
        }
        if !self.feature_names.is_empty() && features.columns() != self.feature_names.as_slice() {
            return Err(schema_drift(&self.feature_names, features.columns()).into());
        }
        Ok(self.predict_proba(features.values()))
    }
}

fn schema_drift(expected: &[String], actual: &[String]) -> SchemaMismatch {
    expected
        .iter()
        .zip(actual.iter())
        .enumerate()
        .find(|(_, (e, a))| e != a)
        .map(|(index, (e, a))| SchemaMismatch::ColumnName {
            index,
            expected: e.clone(),
            actual: a.clone(),
        })
        .unwrap_or(SchemaMismatch::ColumnCount {
            expected: expected.len(),
            actual: actual.len(),
        })
}

fn parse_count(name: &str, raw: &str) -> Result<usize, ClassifierError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| ClassifierError::Malformed(format!("{} {}: {}", name, raw, e)))
}

fn parse_base_score(raw: &str) -> Result<f64, ClassifierError> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let score = trimmed
        .parse::<f64>()
        .map_err(|e| ClassifierError::Malformed(format!("base_score {}: {}", raw, e)))?;
    if score <= 0.0 || score >= 1.0 {
        return Err(ClassifierError::Malformed(format!(
            "base_score {} is not a probability",
            raw
        )));
    }
    Ok(score)
}

fn probability_to_margin(p: f64) -> f64 {
    -(1.0 / p - 1.0).ln()
}

fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}
