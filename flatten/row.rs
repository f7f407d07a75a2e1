/// A `FlatRow` is one (model, iteration) observation. The model level fields are repeated on every row belonging to the same model.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FlatRow {
	/// The index of the model in the input.
	pub model: usize,
	pub modeltype: String,
	pub learning_rate: f64,
	pub regularization_rate: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub nr_layers: Option<usize>,
	/// The last value of the model's validation metric.
	pub final_val_acc: f64,
	pub iteration: usize,
	pub val_metric: f64,
	pub train_metric: f64,
	pub val_loss: f64,
	pub train_loss: f64,
}
