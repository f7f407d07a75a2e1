/*!
This crate turns the training histories of the models trained during an architecture search into [`FlatRow`](struct.FlatRow.html)s, one for each model and iteration, which is the shape the training charts consume.

# Example

```
let json = r#"[{
	"modeltype": "InceptionTime",
	"network_depth": 3,
	"learning_rate": 0.01,
	"regularization_rate": 0.0,
	"val_metric": [0.5, 0.6, 0.65],
	"train_metric": [0.4, 0.5, 0.7],
	"val_loss": [0.9, 0.7, 0.6],
	"train_loss": [1.0, 0.8, 0.5]
}]"#;
let models = gridviz_history::from_json(json).unwrap();
let rows = gridviz_flatten::flatten(&models).unwrap();
assert_eq!(rows.len(), 3);
assert_eq!(rows[2].iteration, 2);
assert_eq!(rows[2].nr_layers, Some(6));
assert_eq!(rows[0].final_val_acc, 0.65);
```
*/

#![allow(clippy::tabs_in_doc_comments)]

mod error;
mod options;
mod row;

pub use self::error::Error;
pub use self::options::{Options, SequenceLengths};
pub use self::row::FlatRow;
use anyhow::Result;
use gridviz_history::ModelRecord;
use itertools::izip;
use tracing::{debug, trace, warn};

/// Flatten `models` into rows ordered by model index and then by iteration. This fails on the first model whose history is malformed and returns no rows in that case.
pub fn flatten(models: &[ModelRecord]) -> Result<Vec<FlatRow>, Error> {
	flatten_with_options(models, &Options::default())
}

pub fn flatten_with_options(
	models: &[ModelRecord],
	options: &Options,
) -> Result<Vec<FlatRow>, Error> {
	let sequence_lengths = options.sequence_lengths.unwrap_or_default();
	let mut rows = Vec::new();
	for (index, model) in models.iter().enumerate() {
		flatten_model(index, model, sequence_lengths, &mut rows)?;
	}
	Ok(rows)
}

fn flatten_model(
	index: usize,
	model: &ModelRecord,
	sequence_lengths: SequenceLengths,
	rows: &mut Vec<FlatRow>,
) -> Result<(), Error> {
	let history = &model.history;
	let val_metric = history
		.validation_metric()
		.ok_or(Error::MissingField {
			model: index,
			field: "val_metric",
			legacy: "val_acc",
		})?;
	let train_metric = history.training_metric().ok_or(Error::MissingField {
		model: index,
		field: "train_metric",
		legacy: "train_acc",
	})?;
	let final_val_acc = *val_metric
		.last()
		.ok_or(Error::EmptyMetricSequence { model: index })?;
	let nr_layers = model.nr_layers();
	if nr_layers.is_none() {
		debug!(
			model = index,
			modeltype = model.modeltype(),
			"no layer count for this model, leaving nr_layers unset"
		);
	}
	let lengths = [
		("train_metric", train_metric.len()),
		("val_loss", history.val_loss.len()),
		("train_loss", history.train_loss.len()),
	];
	let n_iterations = match sequence_lengths {
		SequenceLengths::Strict => {
			for &(field, actual) in lengths.iter() {
				if actual != val_metric.len() {
					return Err(Error::LengthMismatch {
						model: index,
						field,
						expected: val_metric.len(),
						actual,
					});
				}
			}
			val_metric.len()
		}
		SequenceLengths::Truncate => {
			let n_iterations = lengths
				.iter()
				.map(|(_, len)| *len)
				.fold(val_metric.len(), usize::min);
			if n_iterations < val_metric.len() {
				warn!(
					model = index,
					n_iterations,
					n_validation = val_metric.len(),
					"truncating model history to its shortest sequence"
				);
			}
			n_iterations
		}
	};
	rows.reserve(n_iterations);
	// izip stops at the shortest sequence, which is n_iterations long.
	let iterations = izip!(
		val_metric,
		train_metric,
		&history.val_loss,
		&history.train_loss
	);
	for (iteration, (&val_metric, &train_metric, &val_loss, &train_loss)) in
		iterations.enumerate()
	{
		rows.push(FlatRow {
			model: index,
			modeltype: model.modeltype().to_owned(),
			learning_rate: model.learning_rate,
			regularization_rate: model.regularization_rate,
			nr_layers,
			final_val_acc,
			iteration,
			val_metric,
			train_metric,
			val_loss,
			train_loss,
		});
	}
	trace!(model = index, n_iterations, "flattened model");
	Ok(())
}

/// Serialize `rows` to the JSON array handed to the charts. `nr_layers` is omitted from rows without a layer count.
pub fn to_json(rows: &[FlatRow]) -> Result<String> {
	let json = serde_json::to_string(rows)?;
	Ok(json)
}

/// Retrieve the index of the model with the highest final validation metric. Ties go to the model that appears first. Returns `None` if there are no rows or every final validation metric is `NaN`.
pub fn best_model(rows: &[FlatRow]) -> Option<usize> {
	let mut best: Option<(usize, f64)> = None;
	for row in rows {
		if row.final_val_acc.is_nan() {
			continue;
		}
		match best {
			Some((_, best_value)) if best_value >= row.final_val_acc => {}
			_ => best = Some((row.model, row.final_val_acc)),
		}
	}
	best.map(|(model, _)| model)
}

#[cfg(test)]
fn models(json: &str) -> Vec<ModelRecord> {
	gridviz_history::from_json(json).unwrap()
}

#[test]
fn test_flatten() {
	let models = models(
		r#"[{
			"modeltype": "CNN",
			"filters": [1, 1],
			"learning_rate": 0.01,
			"regularization_rate": 0.0,
			"val_metric": [0.5, 0.6],
			"train_metric": [0.4, 0.5],
			"val_loss": [0.9, 0.7],
			"train_loss": [1.0, 0.8]
		}]"#,
	);
	let rows = flatten(&models).unwrap();
	insta::assert_debug_snapshot!(rows, @r###"
 [
     FlatRow {
         model: 0,
         modeltype: "CNN",
         learning_rate: 0.01,
         regularization_rate: 0.0,
         nr_layers: Some(
             2,
         ),
         final_val_acc: 0.6,
         iteration: 0,
         val_metric: 0.5,
         train_metric: 0.4,
         val_loss: 0.9,
         train_loss: 1.0,
     },
     FlatRow {
         model: 0,
         modeltype: "CNN",
         learning_rate: 0.01,
         regularization_rate: 0.0,
         nr_layers: Some(
             2,
         ),
         final_val_acc: 0.6,
         iteration: 1,
         val_metric: 0.6,
         train_metric: 0.5,
         val_loss: 0.7,
         train_loss: 0.8,
     },
 ]
 "###);
}

#[test]
fn test_flatten_many_models() {
	let models = models(
		r#"[
			{
				"modeltype": "CNN",
				"filters": [8, 8, 16, 16],
				"learning_rate": 0.01,
				"regularization_rate": 0.001,
				"val_metric": [0.1, 0.2, 0.3],
				"train_metric": [0.1, 0.2, 0.3],
				"val_loss": [3, 2, 1],
				"train_loss": [3, 2, 1]
			},
			{
				"modeltype": "ResNet",
				"network_depth": 5,
				"learning_rate": 0.1,
				"regularization_rate": 0.01,
				"val_acc": [0.4, 0.8],
				"train_acc": [0.5, 0.9],
				"val_loss": [2, 1],
				"train_loss": [2, 1]
			},
			{
				"modeltype": "MLP",
				"learning_rate": 0.05,
				"regularization_rate": 0.0,
				"val_metric": [0.1, 0.2, 0.3, 0.4],
				"train_metric": [0.1, 0.2, 0.3, 0.4],
				"val_loss": [4, 3, 2, 1],
				"train_loss": [4, 3, 2, 1]
			}
		]"#,
	);
	let rows = flatten(&models).unwrap();
	let expected_len: usize = models
		.iter()
		.map(|model| model.history.validation_metric().unwrap().len())
		.sum();
	assert_eq!(rows.len(), expected_len);
	assert_eq!(rows.len(), 9);
	for (index, model) in models.iter().enumerate() {
		let model_rows: Vec<&FlatRow> = rows.iter().filter(|row| row.model == index).collect();
		let iterations: Vec<usize> = model_rows.iter().map(|row| row.iteration).collect();
		let expected_iterations: Vec<usize> =
			(0..model.history.validation_metric().unwrap().len()).collect();
		assert_eq!(iterations, expected_iterations);
		let first = model_rows[0];
		for row in model_rows.iter() {
			assert_eq!(row.modeltype, first.modeltype);
			assert_eq!(row.learning_rate, first.learning_rate);
			assert_eq!(row.regularization_rate, first.regularization_rate);
			assert_eq!(row.nr_layers, first.nr_layers);
			assert_eq!(row.final_val_acc, first.final_val_acc);
		}
	}
	let models_in_order: Vec<usize> = rows.iter().map(|row| row.model).collect();
	assert_eq!(models_in_order, vec![0, 0, 0, 1, 1, 2, 2, 2, 2]);
	assert_eq!(rows[0].nr_layers, Some(4));
	assert_eq!(rows[3].nr_layers, Some(15));
	assert_eq!(rows[3].final_val_acc, 0.8);
	assert_eq!(rows[4].train_metric, 0.9);
	assert_eq!(rows[5].modeltype, "MLP");
	assert_eq!(rows[5].nr_layers, None);
}

#[test]
fn test_flatten_nr_layers() {
	let models = models(
		r#"[
			{"modeltype": "CNN", "filters": [1, 1, 1, 1], "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.5], "train_metric": [0.5], "val_loss": [1], "train_loss": [1]},
			{"modeltype": "DeepConvLSTM", "filters": [1, 1, 1], "lstm_dims": [1, 1], "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.5], "train_metric": [0.5], "val_loss": [1], "train_loss": [1]},
			{"modeltype": "ResNet", "network_depth": 5, "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.5], "train_metric": [0.5], "val_loss": [1], "train_loss": [1]},
			{"modeltype": "InceptionTime", "network_depth": 6, "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.5], "train_metric": [0.5], "val_loss": [1], "train_loss": [1]},
			{"modeltype": "MLP", "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.5], "train_metric": [0.5], "val_loss": [1], "train_loss": [1]}
		]"#,
	);
	let nr_layers: Vec<Option<usize>> = flatten(&models)
		.unwrap()
		.iter()
		.map(|row| row.nr_layers)
		.collect();
	assert_eq!(nr_layers, vec![Some(4), Some(5), Some(15), Some(12), None]);
}

#[test]
fn test_flatten_legacy_names() {
	let current = models(
		r#"[{
			"modeltype": "DeepConvLSTM",
			"filters": [4, 4],
			"lstm_dims": [2],
			"learning_rate": 0.02,
			"regularization_rate": 0.2,
			"val_metric": [0.3, 0.35, 0.4],
			"train_metric": [0.2, 0.3, 0.45],
			"val_loss": [1.5, 1.4, 1.3],
			"train_loss": [1.6, 1.4, 1.2]
		}]"#,
	);
	let legacy = models(
		r#"[{
			"modeltype": "DeepConvLSTM",
			"filters": [4, 4],
			"lstm_dims": [2],
			"learning_rate": 0.02,
			"regularization_rate": 0.2,
			"val_acc": [0.3, 0.35, 0.4],
			"train_acc": [0.2, 0.3, 0.45],
			"val_loss": [1.5, 1.4, 1.3],
			"train_loss": [1.6, 1.4, 1.2]
		}]"#,
	);
	assert_eq!(flatten(&current).unwrap(), flatten(&legacy).unwrap());
}

#[test]
fn test_flatten_empty_validation_metric() {
	let models = models(
		r#"[
			{"modeltype": "CNN", "filters": [1], "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.5], "train_metric": [0.5], "val_loss": [1], "train_loss": [1]},
			{"modeltype": "CNN", "filters": [1], "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [], "train_metric": [], "val_loss": [], "train_loss": []}
		]"#,
	);
	assert_eq!(
		flatten(&models),
		Err(Error::EmptyMetricSequence { model: 1 })
	);
}

#[test]
fn test_flatten_missing_field() {
	let models = models(
		r#"[{"modeltype": "CNN", "filters": [1], "learning_rate": 0.1, "regularization_rate": 0.1, "val_acc": [0.5], "val_loss": [1], "train_loss": [1]}]"#,
	);
	let error = flatten(&models).unwrap_err();
	assert_eq!(
		error,
		Error::MissingField {
			model: 0,
			field: "train_metric",
			legacy: "train_acc",
		}
	);
	assert_eq!(
		error.to_string(),
		"model 0 has neither \"train_metric\" nor \"train_acc\""
	);
}

#[test]
fn test_flatten_missing_validation_metric() {
	let models = models(
		r#"[{"modeltype": "CNN", "filters": [1], "learning_rate": 0.1, "regularization_rate": 0.1, "train_metric": [0.5], "val_loss": [1], "train_loss": [1]}]"#,
	);
	assert_eq!(
		flatten(&models),
		Err(Error::MissingField {
			model: 0,
			field: "val_metric",
			legacy: "val_acc",
		})
	);
}

#[test]
fn test_flatten_huge_network_depth() {
	let models = models(
		r#"[{"modeltype": "ResNet", "network_depth": 9223372036854775807, "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.5, 0.6], "train_metric": [0.4, 0.5], "val_loss": [1, 0.9], "train_loss": [1, 0.9]}]"#,
	);
	let rows = flatten(&models).unwrap();
	assert_eq!(rows.len(), 2);
	assert_eq!(rows[0].modeltype, "ResNet");
	assert_eq!(rows[0].nr_layers, None);
	assert_eq!(rows[1].nr_layers, None);
}

#[test]
fn test_flatten_length_mismatch() {
	let models = models(
		r#"[{
			"modeltype": "ResNet",
			"network_depth": 2,
			"learning_rate": 0.1,
			"regularization_rate": 0.1,
			"val_metric": [0.5, 0.6, 0.7],
			"train_metric": [0.4, 0.5, 0.6],
			"val_loss": [1.0, 0.9],
			"train_loss": [1.1, 1.0, 0.9]
		}]"#,
	);
	assert_eq!(
		flatten(&models),
		Err(Error::LengthMismatch {
			model: 0,
			field: "val_loss",
			expected: 3,
			actual: 2,
		})
	);
	let options = Options {
		sequence_lengths: Some(SequenceLengths::Truncate),
	};
	let rows = flatten_with_options(&models, &options).unwrap();
	assert_eq!(rows.len(), 2);
	assert_eq!(rows[1].iteration, 1);
	assert_eq!(rows[1].val_loss, 0.9);
	assert_eq!(rows[1].final_val_acc, 0.7);
}

#[test]
fn test_flatten_no_models() {
	assert_eq!(flatten(&[]), Ok(Vec::new()));
}

#[test]
fn test_to_json() {
	let models = models(
		r#"[
			{"modeltype": "InceptionTime", "network_depth": 2, "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.5], "train_metric": [0.4], "val_loss": [1], "train_loss": [2]},
			{"modeltype": "MLP", "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.5], "train_metric": [0.4], "val_loss": [1], "train_loss": [2]}
		]"#,
	);
	let json = to_json(&flatten(&models).unwrap()).unwrap();
	let value: serde_json::Value = serde_json::from_str(&json).unwrap();
	assert_eq!(value[0]["nr_layers"], 4);
	assert_eq!(value[0]["modeltype"], "InceptionTime");
	assert_eq!(value[0]["train_loss"], 2.0);
	assert!(value[1].get("nr_layers").is_none());
	assert_eq!(value[1]["model"], 1);
}

#[test]
fn test_best_model() {
	let models = models(
		r#"[
			{"modeltype": "CNN", "filters": [1], "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.9, 0.5], "train_metric": [0.5, 0.5], "val_loss": [1, 1], "train_loss": [1, 1]},
			{"modeltype": "CNN", "filters": [1], "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.1, 0.8], "train_metric": [0.5, 0.5], "val_loss": [1, 1], "train_loss": [1, 1]},
			{"modeltype": "CNN", "filters": [1], "learning_rate": 0.1, "regularization_rate": 0.1, "val_metric": [0.8], "train_metric": [0.5], "val_loss": [1], "train_loss": [1]}
		]"#,
	);
	let rows = flatten(&models).unwrap();
	assert_eq!(best_model(&rows), Some(1));
	assert_eq!(best_model(&[]), None);
}
