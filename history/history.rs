/// The per-iteration sequences recorded while training a single model.
///
/// Histories written before the metric was made configurable store the validation and training metrics under `val_acc` and `train_acc`. Both names are kept here, and [`validation_metric`](#method.validation_metric) and [`training_metric`](#method.training_metric) resolve them.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct History {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub val_metric: Option<Vec<f64>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub val_acc: Option<Vec<f64>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub train_metric: Option<Vec<f64>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub train_acc: Option<Vec<f64>>,
	pub val_loss: Vec<f64>,
	pub train_loss: Vec<f64>,
}

impl History {
	/// The validation metric, read from `val_metric` if it is non-empty and from `val_acc` otherwise.
	///
	/// Unlike the legacy JavaScript charts, which kept an empty `val_metric` array, an empty `val_metric` falls back to `val_acc` when that is present.
	pub fn validation_metric(&self) -> Option<&[f64]> {
		resolve(self.val_metric.as_deref(), self.val_acc.as_deref())
	}

	/// The training metric, read from `train_metric` if it is non-empty and from `train_acc` otherwise.
	pub fn training_metric(&self) -> Option<&[f64]> {
		resolve(self.train_metric.as_deref(), self.train_acc.as_deref())
	}
}

fn resolve<'a>(current: Option<&'a [f64]>, legacy: Option<&'a [f64]>) -> Option<&'a [f64]> {
	match (current, legacy) {
		(Some(current), _) if !current.is_empty() => Some(current),
		(_, Some(legacy)) => Some(legacy),
		// An empty sequence under the current name still counts as present.
		(current, None) => current,
	}
}

#[test]
fn test_resolve() {
	let history = History {
		val_metric: Some(vec![0.5, 0.6]),
		val_acc: Some(vec![0.1]),
		train_acc: Some(vec![0.4, 0.5]),
		..Default::default()
	};
	assert_eq!(history.validation_metric(), Some(&[0.5, 0.6][..]));
	assert_eq!(history.training_metric(), Some(&[0.4, 0.5][..]));
}

#[test]
fn test_resolve_empty_current() {
	let history = History {
		val_metric: Some(vec![]),
		val_acc: Some(vec![0.7]),
		train_metric: Some(vec![]),
		..Default::default()
	};
	assert_eq!(history.validation_metric(), Some(&[0.7][..]));
	assert_eq!(history.training_metric(), Some(&[] as &[f64]));
}

#[test]
fn test_resolve_missing() {
	let history = History::default();
	assert_eq!(history.validation_metric(), None);
	assert_eq!(history.training_metric(), None);
}
