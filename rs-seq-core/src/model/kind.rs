use std::fmt;

use serde::{Deserialize, Serialize};

use super::query::RecommendQuery;
use super::readable::ReadableModel;
use super::recommender::{recommend, Recommendation};
use crate::error::{Result, SeqError};

/// An association rule mined elsewhere (Apriori, FP-Growth, ...).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AssociationRule {
	pub antecedents: Vec<String>,
	pub consequents: Vec<String>,
}

/// Label and confidence returned by a sentiment classifier.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Sentiment {
	pub label: String,
	pub score: f32,
}

/// A text classifier trained and run outside this crate.
pub trait SentimentClassifier: Send + Sync {
	fn predict(&self, text: &str) -> Result<Sentiment>;
}

/// The kinds of trained model a caller can hold.
///
/// Each variant answers the queries it understands; the sequential pattern
/// variant is backed by this crate, the others by external collaborators.
pub enum ModelKind {
	SequentialPattern(ReadableModel),
	AssociationRules(Vec<AssociationRule>),
	Sentiment(Box<dyn SentimentClassifier>),
}

/// A request sent to a `ModelKind`.
pub enum Query<'a> {
	/// Next-item recommendation from items the user already has.
	NextItems { items: &'a [String], query: &'a RecommendQuery },
	/// Free text to classify.
	Text(&'a str),
}

impl Query<'_> {
	fn name(&self) -> &'static str {
		match self {
			Query::NextItems { .. } => "next items",
			Query::Text(_) => "text",
		}
	}
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Answer {
	Recommendation(Recommendation),
	Sentiment(Sentiment),
}

impl fmt::Debug for ModelKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ModelKind::SequentialPattern(model) => f.debug_tuple("SequentialPattern").field(&model.len()).finish(),
			ModelKind::AssociationRules(rules) => f.debug_tuple("AssociationRules").field(&rules.len()).finish(),
			ModelKind::Sentiment(_) => f.write_str("Sentiment"),
		}
	}
}

impl ModelKind {
	pub fn name(&self) -> &'static str {
		match self {
			ModelKind::SequentialPattern(_) => "sequential pattern",
			ModelKind::AssociationRules(_) => "association rules",
			ModelKind::Sentiment(_) => "sentiment",
		}
	}

	/// Answers a query with this model.
	///
	/// # Errors
	/// - `UnsupportedQuery` if the query does not fit the model kind
	/// - Errors of the external classifier
	pub fn query(&self, query: &Query) -> Result<Answer> {
		match (self, query) {
			(ModelKind::SequentialPattern(model), Query::NextItems { items, query }) => {
				Ok(Answer::Recommendation(recommend(*items, model, *query)))
			}
			(ModelKind::AssociationRules(rules), Query::NextItems { items, query }) => {
				Ok(Answer::Recommendation(recommend_from_rules(*items, rules, query.top_n())))
			}
			(ModelKind::Sentiment(classifier), Query::Text(text)) => Ok(Answer::Sentiment(classifier.predict(text)?)),
			(model, query) => Err(SeqError::UnsupportedQuery { model: model.name(), query: query.name() }),
		}
	}
}

/// Recommends from association rules.
///
/// A rule fires when every user item is among its antecedents. The result is
/// the union of the fired consequents, without the user's own items, in
/// first-seen order and truncated to `top_n`.
pub fn recommend_from_rules<S: AsRef<str>>(user_items: &[S], rules: &[AssociationRule], top_n: usize) -> Recommendation {
	if user_items.is_empty() {
		return Recommendation::EmptyInput;
	}
	let user: Vec<&str> = user_items.iter().map(AsRef::as_ref).collect();

	let mut items: Vec<String> = Vec::new();
	for rule in rules {
		if !user.iter().all(|u| rule.antecedents.iter().any(|a| a == u)) {
			continue;
		}
		for consequent in &rule.consequents {
			if !user.contains(&consequent.as_str()) && !items.contains(consequent) {
				items.push(consequent.clone());
			}
		}
	}

	if items.is_empty() {
		return Recommendation::NoMatch { prefix: user.into_iter().map(str::to_owned).collect() };
	}
	items.truncate(top_n);
	Recommendation::Items { items }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rule(antecedents: &[&str], consequents: &[&str]) -> AssociationRule {
		AssociationRule {
			antecedents: antecedents.iter().map(|s| s.to_string()).collect(),
			consequents: consequents.iter().map(|s| s.to_string()).collect(),
		}
	}

	struct Fixed;

	impl SentimentClassifier for Fixed {
		fn predict(&self, text: &str) -> Result<Sentiment> {
			let score = if text.contains("amazing") { 0.9 } else { 0.2 };
			let label = if score >= 0.5 { "Positive" } else { "Negative" };
			Ok(Sentiment { label: label.to_owned(), score })
		}
	}

	#[test]
	fn rules_fire_on_subset_of_antecedents() {
		let rules = vec![
			rule(&["Milk", "Bread"], &["Butter", "Milk"]),
			rule(&["Milk"], &["Eggs"]),
			rule(&["Tea"], &["Sugar"]),
			rule(&["Milk", "Jam"], &["Butter"]),
		];
		let result = recommend_from_rules(&["Milk"], &rules, 5);
		assert_eq!(result.items(), &["Butter", "Eggs"]);
		assert_eq!(recommend_from_rules(&["Milk"], &rules, 1).items(), &["Butter"]);
		assert!(matches!(recommend_from_rules(&["Coffee"], &rules, 5), Recommendation::NoMatch { .. }));
	}

	#[test]
	fn dispatches_by_kind() {
		let items = vec!["Milk".to_owned()];
		let query = RecommendQuery::new(1).unwrap();
		let next_items = Query::NextItems { items: &items, query: &query };

		let sequential =
			ModelKind::SequentialPattern(ReadableModel::from_patterns([(vec!["Milk"], vec![("Bread", 3), ("Eggs", 5)])]));
		match sequential.query(&next_items).unwrap() {
			Answer::Recommendation(r) => assert_eq!(r.items(), &["Eggs"]),
			other => panic!("unexpected answer: {other:?}"),
		}

		let sentiment = ModelKind::Sentiment(Box::new(Fixed));
		match sentiment.query(&Query::Text("This product is amazing!")).unwrap() {
			Answer::Sentiment(s) => assert_eq!(s.label, "Positive"),
			other => panic!("unexpected answer: {other:?}"),
		}
		assert!(matches!(sentiment.query(&next_items), Err(SeqError::UnsupportedQuery { .. })));
		assert!(matches!(sequential.query(&Query::Text("hi")), Err(SeqError::UnsupportedQuery { .. })));
	}
}
