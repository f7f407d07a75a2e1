/*!
This crate defines [`ModelRecord`](struct.ModelRecord.html), the record written for every model trained during an architecture search. A record holds the model's architecture, its hyperparameters, and its [`History`](struct.History.html) of per-iteration metrics and losses.

# Example

```
let json = r#"[{
	"modeltype": "CNN",
	"filters": [32, 64],
	"learning_rate": 0.01,
	"regularization_rate": 0.0,
	"val_acc": [0.5, 0.6],
	"train_acc": [0.4, 0.5],
	"val_loss": [0.9, 0.7],
	"train_loss": [1.0, 0.8]
}]"#;
let models = gridviz_history::from_json(json).unwrap();
assert_eq!(models[0].nr_layers(), Some(2));
assert_eq!(models[0].history.validation_metric(), Some(&[0.5, 0.6][..]));
```
*/

#![allow(clippy::tabs_in_doc_comments)]

mod architecture;
mod history;

pub use self::architecture::{Architecture, MissingArchitectureField};
pub use self::history::History;
use anyhow::Result;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelRecord {
	#[serde(flatten)]
	pub architecture: Architecture,
	pub learning_rate: f64,
	pub regularization_rate: f64,
	#[serde(flatten)]
	pub history: History,
}

impl ModelRecord {
	pub fn modeltype(&self) -> &str {
		self.architecture.modeltype()
	}

	/// The number of layers in the model, or `None` if its model type is unknown or the count overflows.
	pub fn nr_layers(&self) -> Option<usize> {
		self.architecture.nr_layers()
	}
}

/// Deserialize the model records from a JSON document whose top level is an array of model objects.
pub fn from_json(json: &str) -> Result<Vec<ModelRecord>> {
	let models = serde_json::from_str(json)?;
	Ok(models)
}

/// Deserialize the model records from a slice of JSON bytes.
pub fn from_slice(slice: &[u8]) -> Result<Vec<ModelRecord>> {
	let models = serde_json::from_slice(slice)?;
	Ok(models)
}

#[test]
fn test_from_json() {
	let json = r#"[{
		"modeltype": "ResNet",
		"network_depth": 5,
		"min_filters_number": 32,
		"learning_rate": 0.001,
		"regularization_rate": 0.01,
		"metric": "accuracy",
		"val_metric": [0.5],
		"train_metric": [0.4],
		"val_loss": [0.9],
		"train_loss": [1]
	}]"#;
	let models = from_json(json).unwrap();
	insta::assert_debug_snapshot!(models, @r###"
 [
     ModelRecord {
         architecture: ResNet {
             network_depth: 5,
         },
         learning_rate: 0.001,
         regularization_rate: 0.01,
         history: History {
             val_metric: Some(
                 [
                     0.5,
                 ],
             ),
             val_acc: None,
             train_metric: Some(
                 [
                     0.4,
                 ],
             ),
             train_acc: None,
             val_loss: [
                 0.9,
             ],
             train_loss: [
                 1.0,
             ],
         },
     },
 ]
 "###);
}

#[test]
fn test_from_json_legacy() {
	let json = br#"[{
		"modeltype": "DeepConvLSTM",
		"filters": [8, 8, 16],
		"lstm_dims": [4, 4],
		"fc_hidden_nodes": 1,
		"learning_rate": 0.1,
		"regularization_rate": 0,
		"val_acc": [0.2, 0.3],
		"train_acc": [0.1, 0.2],
		"val_loss": [1.2, 1.1],
		"train_loss": [1.3, 1.2]
	}]"#;
	let models = from_slice(json).unwrap();
	let model = &models[0];
	assert_eq!(model.modeltype(), "DeepConvLSTM");
	assert_eq!(model.nr_layers(), Some(5));
	assert_eq!(model.regularization_rate, 0.0);
	assert_eq!(model.history.val_metric, None);
	assert_eq!(model.history.validation_metric(), Some(&[0.2, 0.3][..]));
	assert_eq!(model.history.training_metric(), Some(&[0.1, 0.2][..]));
}

#[test]
fn test_from_json_missing_architecture_field() {
	let json = r#"[{
		"modeltype": "CNN",
		"learning_rate": 0.1,
		"regularization_rate": 0.0,
		"val_metric": [0.2],
		"train_metric": [0.1],
		"val_loss": [1.2],
		"train_loss": [1.3]
	}]"#;
	let error = from_json(json).unwrap_err();
	assert!(error.to_string().contains("\"filters\""));
}

#[test]
fn test_round_trip_keeps_flat_shape() {
	let model = ModelRecord {
		architecture: Architecture::InceptionTime { network_depth: 6 },
		learning_rate: 0.01,
		regularization_rate: 0.001,
		history: History {
			val_acc: Some(vec![0.5]),
			train_acc: Some(vec![0.4]),
			val_loss: vec![0.9],
			train_loss: vec![1.0],
			..Default::default()
		},
	};
	let json = serde_json::to_string(&[&model]).unwrap();
	assert!(json.contains("\"modeltype\":\"InceptionTime\""));
	assert!(json.contains("\"network_depth\":6"));
	assert!(!json.contains("val_metric"));
	assert_eq!(from_json(&json).unwrap(), vec![model]);
}
