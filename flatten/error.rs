use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
	#[error("model {model} has neither \"{field}\" nor \"{legacy}\"")]
	MissingField {
		model: usize,
		field: &'static str,
		legacy: &'static str,
	},
	#[error("model {model} has an empty validation metric")]
	EmptyMetricSequence { model: usize },
	#[error("model {model} has {actual} values in \"{field}\" but {expected} in the validation metric")]
	LengthMismatch {
		model: usize,
		field: &'static str,
		expected: usize,
		actual: usize,
	},
}
